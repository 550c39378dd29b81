pub mod dom;
pub mod selector;

pub use dom::{Dom, NodeId};
pub use selector::{ParsedSelector, SelectorPart};
