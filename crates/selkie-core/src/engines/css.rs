//! Structural (CSS-like) match engine.
//!
//! Supported subset: tag and `*` selectors, `#id`, `.class`, `[attr]` and
//! `[attr=value]` (value optionally quoted), compounds of those, descendant
//! (whitespace) and child (`>`) combinators, and comma-separated groups.
//! A body outside the subset yields no matches.
//!
//! Matching is right-to-left: the rightmost compound is tested against each
//! descendant element of the scope in document order, then the remaining
//! compounds are satisfied by walking ancestors. Ancestor walks stop at the
//! scope, so a match can never depend on structure outside it.

use crate::engine::SelectorEngine;
use selkie_common::{Dom, NodeId};

#[derive(Debug, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, PartialEq)]
struct Complex {
    compounds: Vec<Compound>,
    // combinators[i] sits between compounds[i] and compounds[i + 1]
    combinators: Vec<Combinator>,
}

fn parse_group(body: &str) -> Option<Vec<Complex>> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0usize;
    for (i, ch) in body.char_indices() {
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
            ',' if depth == 0 => {
                out.push(parse_complex(&body[start..i])?);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return None;
    }
    out.push(parse_complex(&body[start..])?);
    Some(out)
}

fn parse_complex(s: &str) -> Option<Complex> {
    let chars: Vec<char> = s.trim().chars().collect();
    let mut compounds = Vec::new();
    let mut combinators = Vec::new();
    let mut pending: Option<Combinator> = None;
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch.is_whitespace() {
            if pending.is_none() && !compounds.is_empty() {
                pending = Some(Combinator::Descendant);
            }
            i += 1;
        } else if ch == '>' {
            if compounds.is_empty() || pending == Some(Combinator::Child) {
                return None;
            }
            pending = Some(Combinator::Child);
            i += 1;
        } else {
            let start = i;
            let mut depth = 0usize;
            let mut quote: Option<char> = None;
            while i < chars.len() {
                let c = chars[i];
                if let Some(q) = quote {
                    if c == q {
                        quote = None;
                    }
                } else if c == '"' || c == '\'' {
                    quote = Some(c);
                } else if c == '[' {
                    depth += 1;
                } else if c == ']' {
                    depth = depth.checked_sub(1)?;
                } else if depth == 0 && (c.is_whitespace() || c == '>') {
                    break;
                }
                i += 1;
            }
            if depth != 0 || quote.is_some() {
                return None;
            }
            let token: String = chars[start..i].iter().collect();
            if !compounds.is_empty() {
                combinators.push(pending.take()?);
            }
            compounds.push(parse_compound(&token)?);
        }
    }
    if compounds.is_empty() || pending.is_some() {
        return None;
    }
    Some(Complex {
        compounds,
        combinators,
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(token: &str) -> Option<Compound> {
    let chars: Vec<char> = token.chars().collect();
    let mut compound = Compound::default();
    let mut parsed_any = false;
    let mut i = 0;
    if i < chars.len() && chars[i] == '*' {
        parsed_any = true;
        i += 1;
    } else if i < chars.len() && is_ident_char(chars[i]) {
        let start = i;
        while i < chars.len() && is_ident_char(chars[i]) {
            i += 1;
        }
        let tag: String = chars[start..i].iter().collect();
        compound.tag = Some(tag.to_ascii_lowercase());
        parsed_any = true;
    }
    while i < chars.len() {
        match chars[i] {
            '#' | '.' => {
                let marker = chars[i];
                i += 1;
                let start = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                if start == i {
                    return None;
                }
                let name: String = chars[start..i].iter().collect();
                if marker == '#' {
                    compound.id = Some(name);
                } else {
                    compound.classes.push(name);
                }
                parsed_any = true;
            }
            '[' => {
                i += 1;
                let start = i;
                let mut quote: Option<char> = None;
                while i < chars.len() {
                    let c = chars[i];
                    if let Some(q) = quote {
                        if c == q {
                            quote = None;
                        }
                    } else if c == '"' || c == '\'' {
                        quote = Some(c);
                    } else if c == ']' {
                        break;
                    }
                    i += 1;
                }
                if i == chars.len() || quote.is_some() {
                    return None;
                }
                let inner: String = chars[start..i].iter().collect();
                compound.attrs.push(parse_attribute(&inner)?);
                parsed_any = true;
                i += 1;
            }
            _ => return None,
        }
    }
    if !parsed_any {
        return None;
    }
    Some(compound)
}

fn parse_attribute(inner: &str) -> Option<(String, Option<String>)> {
    match inner.split_once('=') {
        None => {
            let name = inner.trim();
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return None;
            }
            Some((name.to_string(), None))
        }
        Some((name, value)) => {
            let name = name.trim();
            // ~= ^= $= *= |= are outside the supported subset
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return None;
            }
            let value = value.trim();
            let value = if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                &value[1..value.len() - 1]
            } else {
                value
            };
            Some((name.to_string(), Some(value.to_string())))
        }
    }
}

fn matches_compound(dom: &Dom, el: NodeId, compound: &Compound) -> bool {
    if let Some(tag) = &compound.tag {
        if dom.tag_name(el) != Some(tag.as_str()) {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if dom.attribute(el, "id") != Some(id.as_str()) {
            return false;
        }
    }
    for class in &compound.classes {
        let has = dom
            .attribute(el, "class")
            .is_some_and(|v| v.split_whitespace().any(|c| c == class));
        if !has {
            return false;
        }
    }
    for (name, value) in &compound.attrs {
        match value {
            None => {
                if dom.attribute(el, name).is_none() {
                    return false;
                }
            }
            Some(v) => {
                if dom.attribute(el, name) != Some(v.as_str()) {
                    return false;
                }
            }
        }
    }
    true
}

/// Parent of `el` provided it is an element strictly inside `scope`.
/// Returns `None` at the scope, the document, or a shadow boundary.
fn parent_within(dom: &Dom, scope: NodeId, el: NodeId) -> Option<NodeId> {
    let parent = dom.parent(el)?;
    if parent == scope || !dom.is_element(parent) {
        return None;
    }
    Some(parent)
}

fn matches_complex(dom: &Dom, scope: NodeId, el: NodeId, complex: &Complex) -> bool {
    let last = complex.compounds.len() - 1;
    matches_compound(dom, el, &complex.compounds[last])
        && matches_prefix(dom, scope, el, complex, last)
}

// `el` already matches compounds[idx]; check the compounds to its left
// against el's ancestry.
fn matches_prefix(dom: &Dom, scope: NodeId, el: NodeId, complex: &Complex, idx: usize) -> bool {
    if idx == 0 {
        return true;
    }
    let compound = &complex.compounds[idx - 1];
    match complex.combinators[idx - 1] {
        Combinator::Child => match parent_within(dom, scope, el) {
            Some(parent) => {
                matches_compound(dom, parent, compound)
                    && matches_prefix(dom, scope, parent, complex, idx - 1)
            }
            None => false,
        },
        Combinator::Descendant => {
            let mut current = parent_within(dom, scope, el);
            while let Some(ancestor) = current {
                if matches_compound(dom, ancestor, compound)
                    && matches_prefix(dom, scope, ancestor, complex, idx - 1)
                {
                    return true;
                }
                current = parent_within(dom, scope, ancestor);
            }
            false
        }
    }
}

pub struct CssEngine;

impl SelectorEngine for CssEngine {
    fn query_all(&self, dom: &Dom, scope: NodeId, body: &str) -> Vec<NodeId> {
        let Some(group) = parse_group(body) else {
            return Vec::new();
        };
        dom.descendant_elements(scope)
            .into_iter()
            .filter(|&el| group.iter().any(|c| matches_complex(dom, scope, el, c)))
            .collect()
    }
}
