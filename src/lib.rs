//! # roadreach
//!
//! Bounded edge reachability for road networks.
//!
//! Before a router snaps a location onto an edge it wants to know whether
//! that edge is usefully connected: an edge that can only reach, or only be
//! reached from, a handful of other edges is a poor candidate. roadreach
//! answers that question with a bounded, bidirectional expansion over a
//! pluggable graph reader and costing model.
//!
//! ## Key Features
//!
//! - **Bounded**: expansions stop as soon as the threshold is met
//! - **Bidirectional**: outbound and inbound reach in one call
//! - **Conditional-aware**: a cheap conservative pass, escalated to an exact
//!   pass only when conditional restrictions make its count uncertain
//! - **Parallel**: candidate batches fan out over rayon
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roadreach::{DirectionMask, GraphReader, ModeCosting, Reach, RoadGraph, TravelMode};
//! use std::path::Path;
//!
//! let graph = RoadGraph::open(Path::new("network.json")).unwrap();
//! let costing = ModeCosting::new(TravelMode::Auto);
//!
//! let id = roadreach::GraphId(0);
//! let edge = graph.edge(id).unwrap();
//! let mut reach = Reach::new();
//! let result = reach
//!     .reach(&edge, id, 50, &graph, &costing, DirectionMask::Both)
//!     .unwrap();
//! println!("{}", result);
//! ```

pub mod cli;
pub mod config;
pub mod costing;
pub mod error;
pub mod expansion;
pub mod graph;
pub mod reach;

// Re-exports for convenience
pub use error::{ReachError, Result};

pub use config::{CostingConfig, ExpansionConfig, ReachConfig, ReachSection};
pub use costing::{Access, ConditionalDecision, Costing, ModeCosting};
pub use graph::{
    DirectedEdge, EdgeData, GraphId, GraphReader, GraphStats, NetworkDescription, NodeId,
    RoadGraph, TravelMode,
};
pub use reach::{
    reach_candidates, CandidateFilter, CandidateReach, DirectedReach, DirectionMask, Reach,
    ReachStats, MAX_REACH_LIMIT,
};
