//! In-memory DOM-like tree the evaluator and engines operate on.
//!
//! This is an arena: `Dom` owns every node, and a `NodeId` is a stable index
//! into it. Identity comparisons (deduplication in particular) are `NodeId`
//! equality. The model carries exactly what selector evaluation needs:
//! elements with attributes, text nodes, and shadow roots.
//!
//! A shadow root owns its own subtree and is reachable only through its host
//! element's shadow link, never through `children`. Traversal helpers here do
//! not cross that boundary; piercing shadow trees is the evaluator's job,
//! one clause at a time.

use std::collections::HashMap;

/// Handle to a node in a [`Dom`] arena.
///
/// Only meaningful for the arena that produced it; indexing with a foreign
/// or stale id panics, as with any arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        attributes: HashMap<String, String>,
        shadow_root: Option<NodeId>,
    },
    ShadowRoot,
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// A DOM-like tree with a single document root.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
}

impl Dom {
    /// Create a tree containing only the document node.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// The document node, scope of top-level queries.
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        id
    }

    /// Append a new element under `parent`. Tag names are stored lowercase.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.push(
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attributes: HashMap::new(),
                shadow_root: None,
            },
            Some(parent),
        );
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append a new text node under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.push(NodeKind::Text(text.to_string()), Some(parent));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Set an attribute on an element. Ignored for non-elements.
    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &mut self.nodes[element.0].kind {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Attach a shadow root to `host` and return it. A host has at most one
    /// shadow root; attaching again returns the existing one.
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        if let NodeKind::Element {
            shadow_root: Some(existing),
            ..
        } = self.nodes[host.0].kind
        {
            return existing;
        }
        let id = self.push(NodeKind::ShadowRoot, Some(host));
        if let NodeKind::Element { shadow_root, .. } = &mut self.nodes[host.0].kind {
            *shadow_root = Some(id);
        }
        id
    }

    /// Tag name of an element, `None` for other node kinds.
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    /// Attribute value of an element, `None` if absent or not an element.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            _ => None,
        }
    }

    /// Shadow root of an element, if one has been attached.
    pub fn shadow_root(&self, id: NodeId) -> Option<NodeId> {
        match self.nodes[id.0].kind {
            NodeKind::Element { shadow_root, .. } => shadow_root,
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element { .. })
    }

    /// Whether this node can act as the scope of an element query.
    /// Documents, elements and shadow roots qualify; text nodes do not.
    pub fn is_queryable(&self, id: NodeId) -> bool {
        !matches!(self.nodes[id.0].kind, NodeKind::Text(_))
    }

    /// Whether this node is a shadow root (the boundary scope-relative
    /// ancestor walks must not cross).
    pub fn is_shadow_root(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::ShadowRoot)
    }

    /// The node a clause is actually evaluated against: the shadow root if
    /// `id` is an element hosting one, otherwise `id` itself.
    ///
    /// Both resolution strategies go through this one helper so the
    /// substitution semantics cannot drift apart between them.
    pub fn effective_scope(&self, id: NodeId) -> NodeId {
        self.shadow_root(id).unwrap_or(id)
    }

    /// Concatenation of the direct text-node children of `id`.
    pub fn immediate_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            if let NodeKind::Text(text) = &self.nodes[child.0].kind {
                out.push_str(text);
            }
        }
        out
    }

    /// All element descendants of `scope` in document order, excluding
    /// `scope` itself. Shadow trees hanging off descendant elements are not
    /// entered.
    pub fn descendant_elements(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if self.is_element(id) {
                out.push(id);
            }
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let a = dom.append_element(doc, "div");
        let b = dom.append_element(a, "span");
        let c = dom.append_element(a, "span");
        let d = dom.append_element(doc, "p");

        assert_eq!(dom.descendant_elements(doc), vec![a, b, c, d]);
        assert_eq!(dom.descendant_elements(a), vec![b, c]);
    }

    #[test]
    fn test_shadow_tree_is_isolated() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let host = dom.append_element(doc, "div");
        let light = dom.append_element(host, "span");
        let shadow = dom.attach_shadow(host);
        let inner = dom.append_element(shadow, "button");

        // Shadow content is not reachable through ordinary traversal.
        assert_eq!(dom.descendant_elements(doc), vec![host, light]);
        assert_eq!(dom.descendant_elements(shadow), vec![inner]);
        assert_eq!(dom.effective_scope(host), shadow);
        assert_eq!(dom.effective_scope(light), light);

        // Attaching again returns the same root.
        assert_eq!(dom.attach_shadow(host), shadow);
    }

    #[test]
    fn test_immediate_text() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let div = dom.append_element(doc, "div");
        dom.append_text(div, "Hello ");
        let span = dom.append_element(div, "span");
        dom.append_text(span, "nested");
        dom.append_text(div, "world");

        assert_eq!(dom.immediate_text(div), "Hello world");
        assert_eq!(dom.immediate_text(span), "nested");
    }

    #[test]
    fn test_queryable_kinds() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let div = dom.append_element(doc, "div");
        let text = dom.append_text(div, "hi");
        let shadow = dom.attach_shadow(div);

        assert!(dom.is_queryable(doc));
        assert!(dom.is_queryable(div));
        assert!(dom.is_queryable(shadow));
        assert!(!dom.is_queryable(text));
    }

    #[test]
    fn test_attributes_and_tags() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let el = dom.append_element(doc, "INPUT");
        dom.set_attribute(el, "data-testid", "login");

        assert_eq!(dom.tag_name(el), Some("input"));
        assert_eq!(dom.attribute(el, "data-testid"), Some("login"));
        assert_eq!(dom.attribute(el, "id"), None);
    }
}
