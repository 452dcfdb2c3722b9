//! The graph-reader capability consumed by the reach expansion.

use super::types::{DirectedEdge, GraphId, NodeId};
use crate::error::{ReachError, Result};

/// Read access to a directed road graph.
///
/// Implementations may load data on demand (e.g. from tiles) and may fail;
/// any error aborts the reach call that triggered it. A reader is shared
/// between concurrent reach computations, so it must be `Send + Sync` and
/// must not change while a call borrows it.
pub trait GraphReader: Send + Sync {
    /// Resolve an edge id to its attributes.
    fn edge(&self, id: GraphId) -> Result<DirectedEdge>;

    /// Edges leaving `node`.
    fn outgoing(&self, node: NodeId) -> Result<Vec<GraphId>>;

    /// Edges arriving at `node`.
    fn incoming(&self, node: NodeId) -> Result<Vec<GraphId>>;

    /// Resolve the opposing edge of `edge`, if it has one.
    ///
    /// An opposing link that points at a missing edge, or at an edge that is
    /// not the reverse of `edge`, is corrupt data.
    fn opposing_edge(&self, edge: &DirectedEdge) -> Result<Option<DirectedEdge>> {
        let Some(opp_id) = edge.opposing else {
            return Ok(None);
        };
        let opp = match self.edge(opp_id) {
            Ok(opp) => opp,
            Err(ReachError::EdgeNotFound(_)) => {
                return Err(ReachError::GraphData(format!(
                    "edge {} links to missing opposing edge {}",
                    edge.id, opp_id
                )))
            }
            Err(e) => return Err(e),
        };
        if opp.start_node != edge.end_node || opp.end_node != edge.start_node {
            return Err(ReachError::GraphData(format!(
                "edge {} and its opposing edge {} do not share endpoints",
                edge.id, opp_id
            )));
        }
        Ok(Some(opp))
    }
}
