//! Loading and saving road graphs.
//!
//! Two formats: a JSON network description for hand-written or exported
//! networks, and a compact bincode snapshot for fast reloads.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use super::engine::{assemble, RoadGraph};
use super::reader::GraphReader;
use super::types::*;
use crate::error::{ReachError, Result};

/// Snapshot format version. Bump when the layout changes.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    nodes: Vec<NodeData>,
    edges: Vec<(NodeId, NodeId, EdgeData)>,
}

/// A road network as written in JSON.
///
/// Edge ids are assigned in list order. A `two_way` entry produces two edges:
/// the forward edge takes the next id and its opposing edge the one after.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkDescription {
    #[serde(default)]
    pub nodes: Vec<String>,
    pub edges: Vec<EdgeSpec>,
}

/// One road segment in a [`NetworkDescription`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    pub length: f32,
    #[serde(default = "default_speed")]
    pub speed: u8,
    /// Modes allowed on the segment; empty means all.
    #[serde(default)]
    pub modes: Vec<TravelMode>,
    #[serde(default)]
    pub two_way: bool,
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub conditional: Option<String>,
    /// Ids of edges the forward edge may not turn onto.
    #[serde(default)]
    pub no_turn_onto: Vec<GraphId>,
}

fn default_speed() -> u8 {
    50
}

impl NetworkDescription {
    /// Build a road graph from this description.
    pub fn build(&self) -> Result<RoadGraph> {
        let mut graph = RoadGraph::new();
        for name in &self.nodes {
            graph.add_named_node(name);
        }
        for spec in &self.edges {
            let from = graph.add_named_node(&spec.from);
            let to = graph.add_named_node(&spec.to);
            let access = if spec.modes.is_empty() {
                ALL_MODES
            } else {
                TravelMode::mask(&spec.modes)
            };
            let mut data = EdgeData::new(spec.length, spec.speed).with_access(access);
            data.closed = spec.closed;
            data.conditional = spec.conditional.clone();
            if spec.two_way {
                let (forward, _) = graph.add_two_way(from, to, data)?;
                graph.edge_data_mut(forward)?.no_turn_onto = spec.no_turn_onto.clone();
            } else {
                data.no_turn_onto = spec.no_turn_onto.clone();
                graph.add_edge(from, to, data)?;
            }
        }
        let edge_count = graph.stats().edge_count as u64;
        for id in graph.edge_ids() {
            let edge = graph.edge(id)?;
            if let Some(bad) = edge.no_turn_onto.iter().find(|t| t.0 >= edge_count) {
                return Err(ReachError::GraphData(format!(
                    "turn restriction on edge {} references unknown edge {}",
                    id, bad
                )));
            }
        }
        Ok(graph)
    }
}

impl RoadGraph {
    /// Save the graph as a bincode snapshot.
    pub fn save(&self, path: &Path) -> Result<()> {
        let inner = self.inner_graph();
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            nodes: inner.node_weights().cloned().collect(),
            edges: inner
                .raw_edges()
                .iter()
                .map(|e| {
                    (
                        NodeId(e.source().index() as u32),
                        NodeId(e.target().index() as u32),
                        e.weight.clone(),
                    )
                })
                .collect(),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let writer = BufWriter::new(fs::File::create(path)?);
        bincode::serialize_into(writer, &snapshot)?;
        info!(path = %path.display(), edges = snapshot.edges.len(), "graph snapshot saved");
        Ok(())
    }

    /// Load a graph from a bincode snapshot.
    ///
    /// The whole file is read first so that length prefixes are checked
    /// against the bytes actually present.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let snapshot: Snapshot = bincode::deserialize(&bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(ReachError::Serialization(format!(
                "unsupported snapshot version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }
        let graph = assemble(snapshot.nodes, snapshot.edges)?;
        info!(path = %path.display(), "graph snapshot loaded");
        Ok(graph)
    }

    /// Parse a JSON network description and build the graph.
    pub fn from_json(json: &str) -> Result<Self> {
        let description: NetworkDescription = serde_json::from_str(json)?;
        description.build()
    }

    /// Load a graph file, choosing the format from the extension:
    /// `.json` is a network description, anything else a snapshot.
    pub fn open(path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            let json = fs::read_to_string(path)?;
            let graph = Self::from_json(&json)?;
            info!(path = %path.display(), "network description loaded");
            Ok(graph)
        } else {
            Self::load(path)
        }
    }
}
