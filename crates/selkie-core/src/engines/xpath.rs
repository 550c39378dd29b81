//! Path-based (XPath-like) match engine.
//!
//! Supported subset: absolute (`/a/b`), anywhere (`//a`) and relative
//! (`a/b`) paths of `/` child and `//` descendant steps, with `*` or a tag
//! name as the node test and an optional `[n]` positional or
//! `[@attr='value']` attribute predicate per step. A body outside the
//! subset yields no matches.
//!
//! Positional predicates are evaluated per context node, as in XPath:
//! `//ul/li[2]` selects the second `li` of each `ul`.

use std::collections::HashSet;

use crate::engine::SelectorEngine;
use selkie_common::{Dom, NodeId};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, PartialEq)]
enum NodeTest {
    Any,
    Tag(String),
}

impl NodeTest {
    fn matches(&self, dom: &Dom, el: NodeId) -> bool {
        match self {
            NodeTest::Any => true,
            NodeTest::Tag(tag) => dom.tag_name(el) == Some(tag.as_str()),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Predicate {
    Position(usize),
    Attribute(String, String),
}

#[derive(Debug, PartialEq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicate: Option<Predicate>,
}

fn parse(body: &str) -> Option<Vec<Step>> {
    let mut rest = body.trim();
    if rest.is_empty() {
        return None;
    }
    let mut axis = Axis::Child;
    if let Some(r) = rest.strip_prefix("//") {
        axis = Axis::Descendant;
        rest = r;
    } else if let Some(r) = rest.strip_prefix('/') {
        rest = r;
    }
    let mut steps = Vec::new();
    loop {
        let mut end = rest.len();
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        for (i, ch) in rest.char_indices() {
            if let Some(q) = quote {
                if ch == q {
                    quote = None;
                }
                continue;
            }
            match ch {
                '"' | '\'' => quote = Some(ch),
                '[' => depth += 1,
                ']' => depth = depth.checked_sub(1)?,
                '/' if depth == 0 => {
                    end = i;
                    break;
                }
                _ => {}
            }
        }
        if depth != 0 || quote.is_some() {
            return None;
        }
        steps.push(parse_step(axis, &rest[..end])?);
        rest = &rest[end..];
        if rest.is_empty() {
            break;
        }
        if let Some(r) = rest.strip_prefix("//") {
            axis = Axis::Descendant;
            rest = r;
        } else {
            axis = Axis::Child;
            rest = &rest[1..];
        }
        if rest.is_empty() {
            // trailing slash
            return None;
        }
    }
    Some(steps)
}

fn parse_step(axis: Axis, token: &str) -> Option<Step> {
    let token = token.trim();
    let (name, predicate) = match token.find('[') {
        Some(pos) => {
            if !token.ends_with(']') {
                return None;
            }
            (
                token[..pos].trim(),
                Some(parse_predicate(&token[pos + 1..token.len() - 1])?),
            )
        }
        None => (token, None),
    };
    let test = match name {
        "" => return None,
        "*" => NodeTest::Any,
        name if name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_') =>
        {
            NodeTest::Tag(name.to_ascii_lowercase())
        }
        _ => return None,
    };
    Some(Step {
        axis,
        test,
        predicate,
    })
}

fn parse_predicate(inner: &str) -> Option<Predicate> {
    let inner = inner.trim();
    if let Ok(position) = inner.parse::<usize>() {
        if position == 0 {
            return None;
        }
        return Some(Predicate::Position(position));
    }
    let rest = inner.strip_prefix('@')?;
    let (name, value) = rest.split_once('=')?;
    let value = value.trim();
    if value.len() < 2 {
        return None;
    }
    let quoted = (value.starts_with('\'') && value.ends_with('\''))
        || (value.starts_with('"') && value.ends_with('"'));
    if !quoted {
        return None;
    }
    Some(Predicate::Attribute(
        name.trim().to_string(),
        value[1..value.len() - 1].to_string(),
    ))
}

pub struct XPathEngine;

impl SelectorEngine for XPathEngine {
    fn query_all(&self, dom: &Dom, scope: NodeId, body: &str) -> Vec<NodeId> {
        let Some(steps) = parse(body) else {
            return Vec::new();
        };
        let mut current = vec![scope];
        for step in &steps {
            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for &context in &current {
                let candidates: Vec<NodeId> = match step.axis {
                    Axis::Child => dom
                        .children(context)
                        .iter()
                        .copied()
                        .filter(|&c| dom.is_element(c))
                        .collect(),
                    Axis::Descendant => dom.descendant_elements(context),
                };
                let mut matched: Vec<NodeId> = candidates
                    .into_iter()
                    .filter(|&el| step.test.matches(dom, el))
                    .collect();
                match &step.predicate {
                    Some(Predicate::Position(n)) => {
                        matched = matched.into_iter().nth(n - 1).into_iter().collect();
                    }
                    Some(Predicate::Attribute(name, value)) => {
                        matched.retain(|&el| dom.attribute(el, name) == Some(value.as_str()));
                    }
                    None => {}
                }
                for el in matched {
                    if seen.insert(el) {
                        next.push(el);
                    }
                }
            }
            current = next;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (Dom, Vec<NodeId>) {
        // <ul><li/><li class="sel"/></ul><ul><li/></ul>
        let mut dom = Dom::new();
        let doc = dom.document();
        let ul1 = dom.append_element(doc, "ul");
        let li1 = dom.append_element(ul1, "li");
        let li2 = dom.append_element(ul1, "li");
        dom.set_attribute(li2, "class", "sel");
        let ul2 = dom.append_element(doc, "ul");
        let li3 = dom.append_element(ul2, "li");
        (dom, vec![ul1, li1, li2, ul2, li3])
    }

    #[test]
    fn test_descendant_and_child_steps() {
        let (dom, els) = page();
        let doc = dom.document();
        assert_eq!(
            XPathEngine.query_all(&dom, doc, "//li"),
            vec![els[1], els[2], els[4]]
        );
        assert_eq!(
            XPathEngine.query_all(&dom, doc, "/ul/li"),
            vec![els[1], els[2], els[4]]
        );
        assert_eq!(XPathEngine.query_all(&dom, doc, "//ul/*").len(), 3);
        assert!(XPathEngine.query_all(&dom, doc, "/li").is_empty());
    }

    #[test]
    fn test_positional_predicate_is_per_context() {
        let (dom, els) = page();
        let doc = dom.document();
        // Second li of each ul; only the first ul has one.
        assert_eq!(XPathEngine.query_all(&dom, doc, "//ul/li[2]"), vec![els[2]]);
        assert_eq!(
            XPathEngine.query_all(&dom, doc, "//ul/li[1]"),
            vec![els[1], els[4]]
        );
    }

    #[test]
    fn test_attribute_predicate() {
        let (dom, els) = page();
        let doc = dom.document();
        assert_eq!(
            XPathEngine.query_all(&dom, doc, "//li[@class='sel']"),
            vec![els[2]]
        );
        assert_eq!(
            XPathEngine.query_all(&dom, doc, "//li[@class=\"sel\"]"),
            vec![els[2]]
        );
        assert!(XPathEngine
            .query_all(&dom, doc, "//li[@class='other']")
            .is_empty());
    }

    #[test]
    fn test_unsupported_body_matches_nothing() {
        let (dom, _) = page();
        let doc = dom.document();
        assert!(XPathEngine.query_all(&dom, doc, "").is_empty());
        assert!(XPathEngine.query_all(&dom, doc, "//ul/").is_empty());
        assert!(XPathEngine.query_all(&dom, doc, "//li[last()]").is_empty());
        assert!(XPathEngine
            .query_all(&dom, doc, "//li[@class=sel]")
            .is_empty());
    }
}
