//! Built-in match engines.

pub mod attribute;
pub mod css;
pub mod text;
pub mod xpath;

pub use attribute::AttributeEngine;
pub use css::CssEngine;
pub use text::TextEngine;
pub use xpath::XPathEngine;
