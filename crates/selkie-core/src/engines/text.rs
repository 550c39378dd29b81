//! Text-content match engine.
//!
//! The body selects one of three matchers:
//! - `"Submit"` or `'Submit'` — exact match on whitespace-normalized text;
//! - `/Sub.+/` — regex match;
//! - anything else — case-insensitive substring match.
//!
//! An element's text is the concatenation of its direct text-node children,
//! whitespace-normalized. Matching the immediate text (rather than the full
//! subtree text) makes the engine report the deepest element that actually
//! carries the words, which is the element a caller wants to interact with.

use lazy_static::lazy_static;
use regex::Regex;

use crate::engine::SelectorEngine;
use selkie_common::{Dom, NodeId};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

enum Matcher {
    Exact(String),
    Substring(String),
    Pattern(Regex),
}

impl Matcher {
    fn parse(body: &str) -> Option<Matcher> {
        let body = body.trim();
        if body.len() >= 2
            && ((body.starts_with('"') && body.ends_with('"'))
                || (body.starts_with('\'') && body.ends_with('\'')))
        {
            return Some(Matcher::Exact(normalize(&body[1..body.len() - 1])));
        }
        if body.len() >= 2 && body.starts_with('/') && body.ends_with('/') {
            return Regex::new(&body[1..body.len() - 1]).ok().map(Matcher::Pattern);
        }
        Some(Matcher::Substring(normalize(body).to_lowercase()))
    }

    fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Exact(expected) => text == expected,
            Matcher::Substring(needle) => text.to_lowercase().contains(needle.as_str()),
            Matcher::Pattern(re) => re.is_match(text),
        }
    }
}

pub struct TextEngine;

impl SelectorEngine for TextEngine {
    fn query_all(&self, dom: &Dom, scope: NodeId, body: &str) -> Vec<NodeId> {
        let Some(matcher) = Matcher::parse(body) else {
            return Vec::new();
        };
        dom.descendant_elements(scope)
            .into_iter()
            .filter(|&el| matcher.matches(&normalize(&dom.immediate_text(el))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Dom, NodeId, NodeId) {
        let mut dom = Dom::new();
        let doc = dom.document();
        let button = dom.append_element(doc, "button");
        dom.append_text(button, "  Submit\n  order ");
        let label = dom.append_element(doc, "label");
        dom.append_text(label, "submit");
        (dom, button, label)
    }

    #[test]
    fn test_substring_is_case_insensitive() {
        let (dom, button, label) = sample();
        let found = TextEngine.query_all(&dom, dom.document(), "SUBMIT");
        assert_eq!(found, vec![button, label]);
    }

    #[test]
    fn test_quoted_is_exact_and_normalized() {
        let (dom, button, label) = sample();
        let found = TextEngine.query_all(&dom, dom.document(), "\"Submit order\"");
        assert_eq!(found, vec![button]);
        let found = TextEngine.query_all(&dom, dom.document(), "'submit'");
        assert_eq!(found, vec![label]);
    }

    #[test]
    fn test_regex_body() {
        let (dom, button, _) = sample();
        let found = TextEngine.query_all(&dom, dom.document(), "/Sub.+order/");
        assert_eq!(found, vec![button]);
        // Broken pattern yields no matches rather than an error.
        assert!(TextEngine.query_all(&dom, dom.document(), "/[/").is_empty());
    }

    #[test]
    fn test_matches_immediate_text_only() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let wrapper = dom.append_element(doc, "div");
        let inner = dom.append_element(wrapper, "span");
        dom.append_text(inner, "Submit");

        let found = TextEngine.query_all(&dom, doc, "Submit");
        assert_eq!(found, vec![inner]);
    }
}
