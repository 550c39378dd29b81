//! Parsed selector types shared between the selector parser and the evaluator.
//!
//! A compound selector arrives here already parsed: an ordered list of
//! `(engine name, body)` clauses. The body is an opaque string that only the
//! named engine knows how to interpret; the evaluator never inspects it.

use serde::{Deserialize, Serialize};

/// One clause of a compound selector: an engine name plus an opaque body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorPart {
    pub name: String,
    pub body: String,
}

impl SelectorPart {
    pub fn new(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
        }
    }
}

/// An ordered chain of selector clauses.
///
/// Clause order is significant: clause `i` is always evaluated within the
/// scope produced by clause `i - 1`'s matches. The chain is expected to be
/// non-empty; producing one is the parser's job, not this crate's.
///
/// Serializes as a bare JSON array of parts, matching the wire format the
/// parsing layer emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedSelector {
    pub parts: Vec<SelectorPart>,
}

impl ParsedSelector {
    pub fn new(parts: Vec<SelectorPart>) -> Self {
        Self { parts }
    }

    /// Convenience constructor for a single-clause selector.
    pub fn single(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            parts: vec![SelectorPart::new(name, body)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let selector = ParsedSelector::new(vec![
            SelectorPart::new("css", "div.a"),
            SelectorPart::new("text", "Submit"),
        ]);

        let json = serde_json::to_string(&selector).unwrap();
        assert_eq!(
            json,
            r#"[{"name":"css","body":"div.a"},{"name":"text","body":"Submit"}]"#
        );

        let back: ParsedSelector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, selector);
    }
}
