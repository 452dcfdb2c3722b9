//! Reference costing for a single travel mode.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Access, Costing};
use crate::config::CostingConfig;
use crate::error::Result;
use crate::graph::{DirectedEdge, NodeId, TravelMode};

/// Seconds added for an allowed U-turn.
const UTURN_PENALTY: f32 = 20.0;

/// Walking speed in kph.
const PEDESTRIAN_SPEED: f32 = 5.0;

/// Cap on cycling speed in kph.
const BICYCLE_MAX_SPEED: f32 = 20.0;

/// How a conditional restriction resolves at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalDecision {
    Open,
    Closed,
}

impl ConditionalDecision {
    pub fn is_open(self) -> bool {
        self == ConditionalDecision::Open
    }
}

/// Time-based costing for one travel mode.
///
/// Closed edges and edges without access for the mode are forbidden; edges
/// carrying a condition are conditional and resolve through a table of
/// known conditions, falling back to a default decision.
#[derive(Debug, Clone)]
pub struct ModeCosting {
    mode: TravelMode,
    allow_uturns: bool,
    conditional_default: ConditionalDecision,
    conditional_overrides: HashMap<String, ConditionalDecision>,
}

impl ModeCosting {
    pub fn new(mode: TravelMode) -> Self {
        Self {
            mode,
            allow_uturns: false,
            conditional_default: ConditionalDecision::Open,
            conditional_overrides: HashMap::new(),
        }
    }

    pub fn from_config(config: &CostingConfig) -> Self {
        Self {
            mode: config.mode,
            allow_uturns: config.allow_uturns,
            conditional_default: config.conditional_default,
            conditional_overrides: config.conditional_overrides.clone(),
        }
    }

    pub fn with_uturns(mut self, allow: bool) -> Self {
        self.allow_uturns = allow;
        self
    }

    pub fn with_conditional_default(mut self, decision: ConditionalDecision) -> Self {
        self.conditional_default = decision;
        self
    }

    /// Fix the decision for one condition expression.
    pub fn with_condition(mut self, condition: &str, decision: ConditionalDecision) -> Self {
        self.conditional_overrides
            .insert(condition.to_string(), decision);
        self
    }

    fn speed_kph(&self, edge: &DirectedEdge) -> f32 {
        let speed = f32::from(edge.speed.max(1));
        match self.mode {
            TravelMode::Auto => speed,
            TravelMode::Bicycle => speed.min(BICYCLE_MAX_SPEED),
            TravelMode::Pedestrian => PEDESTRIAN_SPEED,
        }
    }
}

impl Costing for ModeCosting {
    fn name(&self) -> &str {
        match self.mode {
            TravelMode::Auto => "auto",
            TravelMode::Bicycle => "bicycle",
            TravelMode::Pedestrian => "pedestrian",
        }
    }

    fn access(&self, edge: &DirectedEdge) -> Result<Access> {
        if edge.closed || !edge.allows_mode(self.mode) {
            return Ok(Access::Forbidden);
        }
        if edge.conditional.is_some() {
            return Ok(Access::Conditional);
        }
        Ok(Access::Allowed)
    }

    fn resolve_conditional(&self, edge: &DirectedEdge) -> Result<bool> {
        let Some(condition) = edge.conditional.as_deref() else {
            return Ok(true);
        };
        let decision = self
            .conditional_overrides
            .get(condition)
            .copied()
            .unwrap_or(self.conditional_default);
        Ok(decision.is_open())
    }

    fn edge_cost(&self, edge: &DirectedEdge) -> f32 {
        // meters / (kph / 3.6) = seconds
        edge.length.max(0.0) * 3.6 / self.speed_kph(edge)
    }

    fn transition_cost(
        &self,
        from: &DirectedEdge,
        to: &DirectedEdge,
        _node: NodeId,
    ) -> Result<Option<f32>> {
        if from.forbids_turn_onto(to.id) {
            return Ok(None);
        }
        if from.opposing == Some(to.id) {
            return Ok(self.allow_uturns.then_some(UTURN_PENALTY));
        }
        Ok(Some(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeData, GraphId};

    fn edge(id: u64, data: EdgeData) -> DirectedEdge {
        DirectedEdge::from_parts(GraphId(id), NodeId(0), NodeId(1), &data)
    }

    #[test]
    fn test_access_rules() {
        let costing = ModeCosting::new(TravelMode::Auto);
        let open = edge(0, EdgeData::new(10.0, 50));
        let closed = edge(1, EdgeData::new(10.0, 50).closed());
        let footway = edge(2, EdgeData::new(10.0, 5).with_access(TravelMode::Pedestrian.bit()));
        let gated = edge(3, EdgeData::new(10.0, 50).with_condition("Sa-Su"));

        assert_eq!(costing.access(&open).unwrap(), Access::Allowed);
        assert_eq!(costing.access(&closed).unwrap(), Access::Forbidden);
        assert_eq!(costing.access(&footway).unwrap(), Access::Forbidden);
        assert_eq!(costing.access(&gated).unwrap(), Access::Conditional);

        let walking = ModeCosting::new(TravelMode::Pedestrian);
        assert_eq!(walking.access(&footway).unwrap(), Access::Allowed);
    }

    #[test]
    fn test_conditional_resolution() {
        let costing = ModeCosting::new(TravelMode::Auto)
            .with_conditional_default(ConditionalDecision::Closed)
            .with_condition("Mo-Fr 07:00-19:00", ConditionalDecision::Open);

        let weekday = edge(0, EdgeData::new(10.0, 50).with_condition("Mo-Fr 07:00-19:00"));
        let weekend = edge(1, EdgeData::new(10.0, 50).with_condition("Sa-Su"));
        assert!(costing.resolve_conditional(&weekday).unwrap());
        assert!(!costing.resolve_conditional(&weekend).unwrap());
    }

    #[test]
    fn test_edge_cost_is_travel_time() {
        let costing = ModeCosting::new(TravelMode::Auto);
        let e = edge(0, EdgeData::new(1000.0, 36));
        assert!((costing.edge_cost(&e) - 100.0).abs() < 1e-3);

        let walking = ModeCosting::new(TravelMode::Pedestrian);
        assert!((walking.edge_cost(&e) - 720.0).abs() < 1e-2);
    }

    #[test]
    fn test_transition_rules() {
        let mut data = EdgeData::new(10.0, 50);
        data.opposing = Some(GraphId(1));
        data.no_turn_onto.push(GraphId(2));
        let from = edge(0, data);
        let uturn = edge(1, EdgeData::new(10.0, 50));
        let banned = edge(2, EdgeData::new(10.0, 50));
        let straight = edge(3, EdgeData::new(10.0, 50));

        let costing = ModeCosting::new(TravelMode::Auto);
        assert_eq!(costing.transition_cost(&from, &uturn, NodeId(1)).unwrap(), None);
        assert_eq!(costing.transition_cost(&from, &banned, NodeId(1)).unwrap(), None);
        assert_eq!(costing.transition_cost(&from, &straight, NodeId(1)).unwrap(), Some(0.0));

        let lenient = ModeCosting::new(TravelMode::Auto).with_uturns(true);
        assert_eq!(
            lenient.transition_cost(&from, &uturn, NodeId(1)).unwrap(),
            Some(UTURN_PENALTY)
        );
    }
}
