//! Match engine abstraction.
//!
//! An engine owns the matching semantics for one selector syntax (CSS-like,
//! path-based, text, attribute, or anything a caller supplies). The
//! evaluator only ever talks to engines through this trait and never looks
//! inside a clause body.

use selkie_common::{Dom, NodeId};

/// A pluggable match engine.
///
/// Both operations receive the effective scope (shadow-root substitution has
/// already happened) and the opaque clause body. Matches are element
/// descendants of the scope, reported in whatever order the engine defines;
/// the scope itself is never a match. Engines do not descend into shadow
/// trees hanging off descendant elements — crossing shadow boundaries is the
/// evaluator's clause-chaining concern.
///
/// Engines are infallible: a body the engine cannot interpret simply yields
/// no matches.
pub trait SelectorEngine {
    /// First match of `body` under `scope`, by this engine's own definition
    /// of "first". Defaults to the head of [`query_all`](Self::query_all).
    fn query(&self, dom: &Dom, scope: NodeId, body: &str) -> Option<NodeId> {
        self.query_all(dom, scope, body).into_iter().next()
    }

    /// All matches of `body` under `scope`, in this engine's order.
    fn query_all(&self, dom: &Dom, scope: NodeId, body: &str) -> Vec<NodeId>;
}
