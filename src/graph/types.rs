//! Core types for the road graph.
//!
//! Defines identifiers, travel modes, and the directed-edge record that the
//! reach expansion reads through a [`GraphReader`](super::GraphReader).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphId(pub u64);

impl fmt::Display for GraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for GraphId {
    fn from(value: u64) -> Self {
        GraphId(value)
    }
}

/// Identifier of a graph node (intersection or dead end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Travel modes an edge may grant access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Auto,
    Bicycle,
    Pedestrian,
}

impl TravelMode {
    /// Bit of this mode inside an edge access mask.
    pub fn bit(self) -> u8 {
        match self {
            TravelMode::Auto => 1,
            TravelMode::Bicycle => 1 << 1,
            TravelMode::Pedestrian => 1 << 2,
        }
    }

    /// Access mask granting every listed mode.
    pub fn mask(modes: &[TravelMode]) -> u8 {
        modes.iter().fold(0, |acc, mode| acc | mode.bit())
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TravelMode::Auto => write!(f, "auto"),
            TravelMode::Bicycle => write!(f, "bicycle"),
            TravelMode::Pedestrian => write!(f, "pedestrian"),
        }
    }
}

/// Access mask granting all travel modes.
pub const ALL_MODES: u8 = 0b111;

/// Data stored in a graph node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Optional human-readable name (junction or street corner).
    #[serde(default)]
    pub name: String,
}

/// Attributes stored on a graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
    /// Length in meters.
    pub length: f32,
    /// Speed in kph.
    pub speed: u8,
    /// Travel mode access mask (see [`TravelMode::bit`]).
    pub access: u8,
    /// Permanently closed to all traffic.
    #[serde(default)]
    pub closed: bool,
    /// Condition under which the edge is open, e.g. `"Mo-Fr 07:00-19:00"`.
    /// Whether it holds is only known at run time.
    #[serde(default)]
    pub conditional: Option<String>,
    /// Successor edges this edge may not turn onto.
    #[serde(default)]
    pub no_turn_onto: Vec<GraphId>,
    /// The same road segment in the opposite direction, if any.
    #[serde(default)]
    pub opposing: Option<GraphId>,
}

impl EdgeData {
    pub fn new(length: f32, speed: u8) -> Self {
        Self {
            length,
            speed,
            access: ALL_MODES,
            closed: false,
            conditional: None,
            no_turn_onto: Vec::new(),
            opposing: None,
        }
    }

    pub fn with_access(mut self, access: u8) -> Self {
        self.access = access;
        self
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditional = Some(condition.into());
        self
    }
}

/// Read-only view of one directed edge as resolved by a graph reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectedEdge {
    pub id: GraphId,
    pub start_node: NodeId,
    pub end_node: NodeId,
    pub length: f32,
    pub speed: u8,
    pub access: u8,
    pub closed: bool,
    pub conditional: Option<String>,
    pub no_turn_onto: Vec<GraphId>,
    pub opposing: Option<GraphId>,
}

impl DirectedEdge {
    pub fn from_parts(id: GraphId, start_node: NodeId, end_node: NodeId, data: &EdgeData) -> Self {
        Self {
            id,
            start_node,
            end_node,
            length: data.length,
            speed: data.speed,
            access: data.access,
            closed: data.closed,
            conditional: data.conditional.clone(),
            no_turn_onto: data.no_turn_onto.clone(),
            opposing: data.opposing,
        }
    }

    /// True if `mode` is in this edge's access mask.
    pub fn allows_mode(&self, mode: TravelMode) -> bool {
        self.access & mode.bit() != 0
    }

    /// True if turning from this edge onto `next` is prohibited.
    pub fn forbids_turn_onto(&self, next: GraphId) -> bool {
        self.no_turn_onto.contains(&next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_mask() {
        let mask = TravelMode::mask(&[TravelMode::Auto, TravelMode::Pedestrian]);
        let edge = DirectedEdge::from_parts(
            GraphId(0),
            NodeId(0),
            NodeId(1),
            &EdgeData::new(10.0, 30).with_access(mask),
        );
        assert!(edge.allows_mode(TravelMode::Auto));
        assert!(!edge.allows_mode(TravelMode::Bicycle));
        assert!(edge.allows_mode(TravelMode::Pedestrian));
    }

    #[test]
    fn test_turn_restriction_lookup() {
        let mut data = EdgeData::new(10.0, 30);
        data.no_turn_onto.push(GraphId(7));
        let edge = DirectedEdge::from_parts(GraphId(0), NodeId(0), NodeId(1), &data);
        assert!(edge.forbids_turn_onto(GraphId(7)));
        assert!(!edge.forbids_turn_onto(GraphId(8)));
    }

    #[test]
    fn test_travel_mode_serde() {
        let json = serde_json::to_string(&TravelMode::Bicycle).unwrap();
        assert_eq!(json, "\"bicycle\"");
        let mode: TravelMode = serde_json::from_str("\"pedestrian\"").unwrap();
        assert_eq!(mode, TravelMode::Pedestrian);
    }
}
