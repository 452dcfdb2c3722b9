//! The costing-model capability consumed by the reach expansion.
//!
//! A costing model decides, per travel mode, whether an edge may be used,
//! what it costs, and whether a transition between two edges is allowed.

pub mod mode;

pub use mode::{ConditionalDecision, ModeCosting};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::graph::{DirectedEdge, NodeId};

/// Permission outcome for a single edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Usable unconditionally.
    Allowed,
    /// Never usable by this costing.
    Forbidden,
    /// Usable only when a run-time condition holds (time gates, seasonal
    /// closures, ...).
    Conditional,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Allowed => write!(f, "allowed"),
            Access::Forbidden => write!(f, "forbidden"),
            Access::Conditional => write!(f, "conditional"),
        }
    }
}

/// A pluggable travel-cost and restriction policy.
///
/// Shared read-only between concurrent reach computations.
pub trait Costing: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether `edge` may be traversed at all.
    fn access(&self, edge: &DirectedEdge) -> Result<Access>;

    /// Run-time decision for an edge whose access is [`Access::Conditional`].
    /// `true` means the condition currently holds and the edge is open.
    fn resolve_conditional(&self, edge: &DirectedEdge) -> Result<bool>;

    /// Cost of traversing `edge`, used to order the expansion.
    fn edge_cost(&self, edge: &DirectedEdge) -> f32;

    /// Cost of moving from `from` onto `to` at `node`, or `None` if the
    /// transition is prohibited.
    fn transition_cost(
        &self,
        from: &DirectedEdge,
        to: &DirectedEdge,
        node: NodeId,
    ) -> Result<Option<f32>>;
}
