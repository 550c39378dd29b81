pub mod engine;
pub mod engines;
pub mod evaluator;

pub use engine::SelectorEngine;
pub use evaluator::{EvaluatorError, SelectorEvaluator};
