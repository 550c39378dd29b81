//! Attribute match engine.
//!
//! One engine instance is bound to a single attribute name and matches
//! elements whose attribute equals the clause body exactly. The evaluator
//! registers four of these: `id`, `data-testid`, `data-test-id` and
//! `data-test`.

use crate::engine::SelectorEngine;
use selkie_common::{Dom, NodeId};

pub struct AttributeEngine {
    attribute: String,
}

impl AttributeEngine {
    pub fn new(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
        }
    }
}

impl SelectorEngine for AttributeEngine {
    fn query_all(&self, dom: &Dom, scope: NodeId, body: &str) -> Vec<NodeId> {
        dom.descendant_elements(scope)
            .into_iter()
            .filter(|&el| dom.attribute(el, &self.attribute) == Some(body))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_value_match() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let a = dom.append_element(doc, "div");
        dom.set_attribute(a, "data-testid", "submit");
        let b = dom.append_element(doc, "div");
        dom.set_attribute(b, "data-testid", "submit-later");

        let engine = AttributeEngine::new("data-testid");
        assert_eq!(engine.query_all(&dom, doc, "submit"), vec![a]);
        assert_eq!(engine.query(&dom, doc, "submit-later"), Some(b));
        assert!(engine.query_all(&dom, doc, "missing").is_empty());
    }

    #[test]
    fn test_bound_attribute_only() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let el = dom.append_element(doc, "div");
        dom.set_attribute(el, "id", "submit");

        let engine = AttributeEngine::new("data-test");
        assert!(engine.query_all(&dom, doc, "submit").is_empty());
    }
}
