//! Error types for roadreach.
//!
//! Connectivity outcomes (dead ends, islands, gated segments) are never
//! errors: they surface as smaller reach counts. Everything here is a failure
//! of the graph data, the costing model, or the surrounding I/O.

use thiserror::Error;

use crate::graph::{GraphId, NodeId};

/// Errors that can occur while reading the graph or computing reach.
#[derive(Error, Debug)]
pub enum ReachError {
    /// The graph reader has no edge with this id.
    #[error("edge not found: {0}")]
    EdgeNotFound(GraphId),

    /// The graph reader has no node with this id.
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Graph data is present but inconsistent.
    #[error("graph data error: {0}")]
    GraphData(String),

    /// The costing model could not evaluate an edge or transition.
    #[error("costing error: {0}")]
    Costing(String),

    /// Invalid configuration file or value.
    #[error("config error in {path}: {message}")]
    Config { path: String, message: String },

    /// Snapshot encode/decode failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// JSON network description failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<bincode::Error> for ReachError {
    fn from(err: bincode::Error) -> Self {
        ReachError::Serialization(err.to_string())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ReachError>;
