//! Compound selector evaluation.
//!
//! The evaluator owns the engine registry and the two resolution
//! strategies. It dereferences each clause's engine by name, substitutes
//! shadow roots for their hosts before every clause, and combines per-clause
//! matches either depth-first with short-circuiting (`query_selector`) or
//! breadth-wise with deduplication (`query_selector_all`).
//!
//! The two strategies are not guaranteed to agree on which element is
//! "first" when several match: first-match trusts engine-reported order at
//! each level and exits early, all-matches expands every level fully. That
//! divergence is intentional.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::debug;

use crate::engine::SelectorEngine;
use crate::engines::{AttributeEngine, CssEngine, TextEngine, XPathEngine};
use selkie_common::{Dom, NodeId, ParsedSelector};

/// Errors raised during selector evaluation.
#[derive(Error, Debug, Clone)]
pub enum EvaluatorError {
    /// The supplied root cannot act as a query scope (e.g. a text node).
    /// Always caller misuse, raised before any engine runs.
    #[error("Node is not queryable")]
    NotQueryable,

    /// A clause named an engine that was never registered. A configuration
    /// defect; there is no fallback engine.
    #[error("Unknown selector engine: {0}")]
    UnknownEngine(String),
}

/// Registry of match engines plus the compound resolution algorithms.
///
/// The registry is populated once at construction and read-only afterwards:
/// seven built-in engines first, then the caller's custom engines in list
/// order. A name collision silently replaces the earlier entry — last write
/// wins, which is how callers override a built-in.
pub struct SelectorEvaluator {
    engines: HashMap<String, Box<dyn SelectorEngine>>,
}

impl SelectorEvaluator {
    // Note: keep predefined names in sync with the selector parser.
    pub fn new(custom_engines: Vec<(String, Box<dyn SelectorEngine>)>) -> Self {
        let mut engines: HashMap<String, Box<dyn SelectorEngine>> = HashMap::new();
        engines.insert("css".to_string(), Box::new(CssEngine));
        engines.insert("xpath".to_string(), Box::new(XPathEngine));
        engines.insert("text".to_string(), Box::new(TextEngine));
        engines.insert("id".to_string(), Box::new(AttributeEngine::new("id")));
        engines.insert(
            "data-testid".to_string(),
            Box::new(AttributeEngine::new("data-testid")),
        );
        engines.insert(
            "data-test-id".to_string(),
            Box::new(AttributeEngine::new("data-test-id")),
        );
        engines.insert(
            "data-test".to_string(),
            Box::new(AttributeEngine::new("data-test")),
        );
        for (name, engine) in custom_engines {
            engines.insert(name, engine);
        }
        Self { engines }
    }

    /// Registry lookup. Engine dispatch happens here and nowhere else.
    fn engine(&self, name: &str) -> Result<&dyn SelectorEngine, EvaluatorError> {
        self.engines
            .get(name)
            .map(|e| e.as_ref())
            .ok_or_else(|| EvaluatorError::UnknownEngine(name.to_string()))
    }

    /// Resolve the first element matching the full clause chain.
    ///
    /// Depth-first, short-circuiting: intermediate clauses expand via
    /// `query_all` and candidates are tried strictly in the engine's
    /// reported order; the first candidate whose subtree completes the
    /// remaining chain wins, and later siblings are never evaluated. Only
    /// the final clause uses the engine's own `query`.
    pub fn query_selector(
        &self,
        dom: &Dom,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Option<NodeId>, EvaluatorError> {
        if !dom.is_queryable(root) {
            return Err(EvaluatorError::NotQueryable);
        }
        debug!(parts = selector.parts.len(), "query_selector");
        if selector.parts.is_empty() {
            return Ok(None);
        }
        self.query_recursively(dom, selector, root, 0)
    }

    fn query_recursively(
        &self,
        dom: &Dom,
        selector: &ParsedSelector,
        root: NodeId,
        index: usize,
    ) -> Result<Option<NodeId>, EvaluatorError> {
        let part = &selector.parts[index];
        let engine = self.engine(&part.name)?;
        let scope = dom.effective_scope(root);
        if index == selector.parts.len() - 1 {
            return Ok(engine.query(dom, scope, &part.body));
        }
        for candidate in engine.query_all(dom, scope, &part.body) {
            if let Some(found) = self.query_recursively(dom, selector, candidate, index + 1)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Resolve every element matching the full clause chain.
    ///
    /// Breadth-wise: the working set starts as the root alone and is
    /// replaced clause by clause with the union of each member's matches,
    /// identity-deduplicated and kept in first-encounter order.
    pub fn query_selector_all(
        &self,
        dom: &Dom,
        selector: &ParsedSelector,
        root: NodeId,
    ) -> Result<Vec<NodeId>, EvaluatorError> {
        if !dom.is_queryable(root) {
            return Err(EvaluatorError::NotQueryable);
        }
        debug!(parts = selector.parts.len(), "query_selector_all");
        if selector.parts.is_empty() {
            return Ok(Vec::new());
        }
        let mut set = vec![root];
        for part in &selector.parts {
            let engine = self.engine(&part.name)?;
            let mut next = Vec::new();
            let mut seen = HashSet::new();
            for &prev in &set {
                for node in engine.query_all(dom, dom.effective_scope(prev), &part.body) {
                    if seen.insert(node) {
                        next.push(node);
                    }
                }
            }
            set = next;
        }
        Ok(set)
    }
}
