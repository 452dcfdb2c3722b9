//! Road graph module.
//!
//! Provides the graph-reader capability the reach expansion consumes, the
//! directed-edge data model, and an in-memory petgraph-backed implementation
//! with JSON and snapshot loading.

pub mod engine;
pub mod persistence;
pub mod reader;
pub mod types;

pub use engine::{GraphStats, RoadGraph};
pub use persistence::{EdgeSpec, NetworkDescription};
pub use reader::GraphReader;
pub use types::{DirectedEdge, EdgeData, GraphId, NodeData, NodeId, TravelMode, ALL_MODES};
