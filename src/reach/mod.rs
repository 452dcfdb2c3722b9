//! Bounded, bidirectional edge reachability.
//!
//! [`Reach`] answers "how many distinct edges can this edge reach, and how
//! many can reach it, up to a threshold?" for a costing model. Each direction
//! first runs a conservative expansion that stops at conditionally restricted
//! edges. Only when that pass cannot vouch for its count (it stopped on a
//! condition and came up short, or reached the cap partly through
//! conditional edges) does an exact expansion resolve the conditions
//! through the costing model.
//!
//! Conventions:
//! - the seed edge counts toward its own reach, so an edge with nothing
//!   attached has a reach of 1 in each direction it is usable;
//! - inbound, the seed only counts when it has a usable opposing edge,
//!   because the reverse search enters it through that edge; its
//!   predecessors are expanded either way;
//! - `Both` yields the same per-direction counts as two single-direction
//!   calls.

pub mod batch;
pub mod tracker;

pub use batch::{reach_candidates, CandidateFilter, CandidateReach};
pub use tracker::TraversalState;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace, warn};

use crate::config::ExpansionConfig;
use crate::costing::{Access, Costing};
use crate::error::{ReachError, Result};
use crate::expansion::{
    EdgeLabel, Expansion, ExpansionEnd, ExpansionHints, ExpansionRecommendation,
    ExpansionStrategy, TravelDirection,
};
use crate::graph::{DirectedEdge, GraphId, GraphReader};

/// Largest threshold the counters carry. Larger requests are clamped.
pub const MAX_REACH_LIMIT: u32 = u16::MAX as u32;

/// Which directions a reach call computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionMask {
    #[serde(rename = "in")]
    Inbound,
    #[serde(rename = "out")]
    Outbound,
    #[serde(rename = "both")]
    Both,
}

impl DirectionMask {
    pub const INBOUND_BIT: u8 = 1;
    pub const OUTBOUND_BIT: u8 = 2;

    pub fn includes_inbound(self) -> bool {
        self.bits() & Self::INBOUND_BIT != 0
    }

    pub fn includes_outbound(self) -> bool {
        self.bits() & Self::OUTBOUND_BIT != 0
    }

    pub fn bits(self) -> u8 {
        match self {
            DirectionMask::Inbound => Self::INBOUND_BIT,
            DirectionMask::Outbound => Self::OUTBOUND_BIT,
            DirectionMask::Both => Self::INBOUND_BIT | Self::OUTBOUND_BIT,
        }
    }

}

impl fmt::Display for DirectionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirectionMask::Inbound => write!(f, "in"),
            DirectionMask::Outbound => write!(f, "out"),
            DirectionMask::Both => write!(f, "both"),
        }
    }
}

impl FromStr for DirectionMask {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "in" | "inbound" => Ok(DirectionMask::Inbound),
            "out" | "outbound" => Ok(DirectionMask::Outbound),
            "both" => Ok(DirectionMask::Both),
            other => Err(format!("unknown direction '{}' (expected in, out or both)", other)),
        }
    }
}

/// Outbound and inbound reach of an edge.
///
/// Each field saturates at the threshold the call was made with and is 0 for
/// a direction that was not requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectedReach {
    pub outbound: u32,
    pub inbound: u32,
}

impl DirectedReach {
    /// Saturate a raw edge count at `cap`.
    pub fn saturate(count: usize, cap: u32) -> u32 {
        u32::try_from(count).unwrap_or(u32::MAX).min(cap)
    }

    /// The limiting count for `direction`: the lower of the two for `Both`.
    pub fn min_directional(&self, direction: DirectionMask) -> u32 {
        match direction {
            DirectionMask::Inbound => self.inbound,
            DirectionMask::Outbound => self.outbound,
            DirectionMask::Both => self.inbound.min(self.outbound),
        }
    }
}

impl fmt::Display for DirectedReach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "out={} in={}", self.outbound, self.inbound)
    }
}

/// How conditional restrictions are treated during an expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachMode {
    /// Stop at conditional edges (count them, don't expand past them).
    Conservative,
    /// Ask the costing model whether each condition currently holds.
    Exact,
}

/// Terminal state of one pass over one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// The tally hit the threshold.
    Capped,
    /// The frontier emptied first.
    Exhausted,
    /// The count cannot be trusted; rerun in exact mode.
    Escalate,
}

/// Counters for monitoring a controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachStats {
    /// Reach calls handled.
    pub calls: u64,
    /// Directional expansions run, both modes.
    pub expansions: u64,
    /// Conservative passes that had to be rerun exactly.
    pub escalations: u64,
}

/// The decision hook driving each expansion for [`Reach`].
#[derive(Debug)]
pub struct ReachStrategy {
    sizing: ExpansionConfig,
    state: TraversalState,
    mode: ReachMode,
    max_reach: u32,
    seed_counts: bool,
    /// Branches stopped on a conditional restriction.
    conditional_stops: u32,
    /// Conditional edges counted without being resolved.
    conditional_counted: u32,
}

impl ReachStrategy {
    pub fn new(sizing: ExpansionConfig) -> Self {
        Self {
            sizing,
            state: TraversalState::new(),
            mode: ReachMode::Conservative,
            max_reach: 0,
            seed_counts: true,
            conditional_stops: 0,
            conditional_counted: 0,
        }
    }

    fn configure(&mut self, mode: ReachMode, max_reach: u32, seed_counts: bool) {
        self.mode = mode;
        self.max_reach = max_reach;
        self.seed_counts = seed_counts;
    }

    /// Edges counted so far, saturated at the threshold.
    pub fn count(&self) -> u32 {
        DirectedReach::saturate(self.state.settled_count(), self.max_reach)
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    fn outcome(&self, end: ExpansionEnd) -> PassOutcome {
        let capped = end == ExpansionEnd::Capped || self.count() >= self.max_reach;
        if self.mode == ReachMode::Conservative
            && self.conditional_stops > 0
            && (!capped || self.conditional_counted > 0)
        {
            return PassOutcome::Escalate;
        }
        if capped {
            PassOutcome::Capped
        } else {
            PassOutcome::Exhausted
        }
    }

    fn count_edge(&mut self, label: &EdgeLabel) -> bool {
        if label.origin && !self.seed_counts {
            self.state.dequeue(label.edge_id);
            return false;
        }
        self.state.settle(label.edge_id)
    }
}

impl ExpansionStrategy for ReachStrategy {
    fn reset(&mut self) {
        self.state.reset(self.hints().label_reservation as usize);
        self.conditional_stops = 0;
        self.conditional_counted = 0;
    }

    fn hints(&self) -> ExpansionHints {
        let sizing = &self.sizing;
        let bucket_count = self
            .max_reach
            .clamp(sizing.min_buckets, sizing.max_buckets.max(sizing.min_buckets));
        let label_reservation = self
            .max_reach
            .saturating_mul(sizing.labels_per_reach)
            .min(sizing.max_label_reservation);
        ExpansionHints {
            bucket_count,
            label_reservation,
        }
    }

    fn on_enqueue(&mut self, label: &EdgeLabel) {
        self.state.enqueue(label.edge_id);
    }

    fn decide<C: Costing + ?Sized>(
        &mut self,
        label: &EdgeLabel,
        edge: &DirectedEdge,
        costing: &C,
    ) -> Result<ExpansionRecommendation> {
        if self.state.settled_count() >= self.max_reach as usize {
            return Ok(ExpansionRecommendation::StopAll);
        }

        let open = match costing.access(edge)? {
            Access::Allowed => true,
            Access::Forbidden => false,
            Access::Conditional => match self.mode {
                ReachMode::Conservative => {
                    self.conditional_stops += 1;
                    if self.count_edge(label) {
                        self.conditional_counted += 1;
                    }
                    trace!(edge = %edge.id, "stopped at conditional restriction");
                    return Ok(ExpansionRecommendation::StopBranch);
                }
                ReachMode::Exact => costing.resolve_conditional(edge)?,
            },
        };

        if !open {
            self.state.dequeue(label.edge_id);
            return Ok(ExpansionRecommendation::StopBranch);
        }
        self.count_edge(label);
        Ok(ExpansionRecommendation::Continue)
    }
}

/// Reach controller.
///
/// Holds reusable expansion storage; one instance serves one call at a time.
/// Run concurrent computations on separate instances.
#[derive(Debug)]
pub struct Reach {
    expansion: Expansion,
    strategy: ReachStrategy,
    stats: ReachStats,
}

impl Reach {
    pub fn new() -> Self {
        Self::with_config(ExpansionConfig::default())
    }

    pub fn with_config(sizing: ExpansionConfig) -> Self {
        Self {
            expansion: Expansion::new(),
            strategy: ReachStrategy::new(sizing),
            stats: ReachStats::default(),
        }
    }

    pub fn stats(&self) -> ReachStats {
        self.stats
    }

    /// Outbound and inbound reach of `edge`, each capped at `max_reach`.
    ///
    /// `reader` and `costing` are only read. Reader and costing failures are
    /// returned as errors; a poorly connected edge is never an error.
    pub fn reach<R, C>(
        &mut self,
        edge: &DirectedEdge,
        edge_id: GraphId,
        max_reach: u32,
        reader: &R,
        costing: &C,
        direction: DirectionMask,
    ) -> Result<DirectedReach>
    where
        R: GraphReader + ?Sized,
        C: Costing + ?Sized,
    {
        if edge.id != edge_id {
            return Err(ReachError::GraphData(format!(
                "edge record {} does not match requested id {}",
                edge.id, edge_id
            )));
        }
        self.stats.calls += 1;

        let max_reach = if max_reach > MAX_REACH_LIMIT {
            warn!(max_reach, limit = MAX_REACH_LIMIT, "clamping reach threshold");
            MAX_REACH_LIMIT
        } else {
            max_reach
        };

        let mut result = DirectedReach::default();
        if max_reach == 0 {
            return Ok(result);
        }

        if direction.includes_outbound() {
            result.outbound =
                self.directional(edge, max_reach, reader, costing, TravelDirection::Forward, true)?;
        }
        if direction.includes_inbound() {
            let seed_counts = Self::opposing_usable(edge, reader, costing)?;
            result.inbound = self.directional(
                edge,
                max_reach,
                reader,
                costing,
                TravelDirection::Reverse,
                seed_counts,
            )?;
        }

        debug!(
            edge = %edge_id,
            costing = costing.name(),
            max_reach,
            direction = %direction,
            outbound = result.outbound,
            inbound = result.inbound,
            "reach computed"
        );
        Ok(result)
    }

    /// Whether the reverse search can enter the seed through its opposing
    /// edge. A conditional opposing edge is resolved through the costing
    /// model so the seed is never counted on an unverified condition.
    fn opposing_usable<R, C>(edge: &DirectedEdge, reader: &R, costing: &C) -> Result<bool>
    where
        R: GraphReader + ?Sized,
        C: Costing + ?Sized,
    {
        let Some(opposing) = reader.opposing_edge(edge)? else {
            return Ok(false);
        };
        match costing.access(&opposing)? {
            Access::Allowed => Ok(true),
            Access::Forbidden => Ok(false),
            Access::Conditional => costing.resolve_conditional(&opposing),
        }
    }

    fn directional<R, C>(
        &mut self,
        edge: &DirectedEdge,
        max_reach: u32,
        reader: &R,
        costing: &C,
        direction: TravelDirection,
        seed_counts: bool,
    ) -> Result<u32>
    where
        R: GraphReader + ?Sized,
        C: Costing + ?Sized,
    {
        let args = (edge, max_reach, direction, seed_counts);
        let (count, outcome) = self.pass(ReachMode::Conservative, args, reader, costing)?;
        if outcome != PassOutcome::Escalate {
            return Ok(count);
        }

        self.stats.escalations += 1;
        debug!(
            edge = %edge.id,
            ?direction,
            conservative = count,
            max_reach,
            "conditional restrictions reached, escalating to exact expansion"
        );
        let (count, _) = self.pass(ReachMode::Exact, args, reader, costing)?;
        Ok(count)
    }

    fn pass<R, C>(
        &mut self,
        mode: ReachMode,
        (edge, max_reach, direction, seed_counts): (&DirectedEdge, u32, TravelDirection, bool),
        reader: &R,
        costing: &C,
    ) -> Result<(u32, PassOutcome)>
    where
        R: GraphReader + ?Sized,
        C: Costing + ?Sized,
    {
        self.strategy.configure(mode, max_reach, seed_counts);
        let summary = self
            .expansion
            .run(&mut self.strategy, reader, costing, edge, direction)?;
        self.stats.expansions += 1;

        let count = self.strategy.count();
        let outcome = self.strategy.outcome(summary.end);
        trace!(
            edge = %edge.id,
            ?mode,
            ?direction,
            ?outcome,
            count,
            labels = summary.labels,
            decided = summary.decided,
            "expansion finished"
        );
        Ok((count, outcome))
    }
}

impl Default for Reach {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costing::{ConditionalDecision, ModeCosting};
    use crate::graph::{EdgeData, RoadGraph, TravelMode};

    fn chain(len: usize) -> (RoadGraph, Vec<GraphId>) {
        let mut graph = RoadGraph::new();
        let mut prev = graph.add_node();
        let mut ids = Vec::new();
        for _ in 0..len {
            let next = graph.add_node();
            ids.push(graph.add_edge(prev, next, EdgeData::new(100.0, 36)).unwrap());
            prev = next;
        }
        (graph, ids)
    }

    fn run(
        graph: &RoadGraph,
        costing: &ModeCosting,
        id: GraphId,
        max_reach: u32,
        direction: DirectionMask,
    ) -> (DirectedReach, ReachStats) {
        let mut reach = Reach::new();
        let edge = graph.edge(id).unwrap();
        let result = reach
            .reach(&edge, id, max_reach, graph, costing, direction)
            .unwrap();
        (result, reach.stats())
    }

    #[test]
    fn test_direction_mask_bits() {
        assert_eq!(DirectionMask::Both.bits(), 3);
        assert!(DirectionMask::Both.includes_inbound());
        assert!(!DirectionMask::Outbound.includes_inbound());
        assert_eq!("Inbound".parse::<DirectionMask>(), Ok(DirectionMask::Inbound));
        assert!("sideways".parse::<DirectionMask>().is_err());
    }

    #[test]
    fn test_saturate() {
        assert_eq!(DirectedReach::saturate(3, 10), 3);
        assert_eq!(DirectedReach::saturate(30, 10), 10);
        assert_eq!(DirectedReach::saturate(usize::MAX, MAX_REACH_LIMIT), MAX_REACH_LIMIT);
    }

    #[test]
    fn test_chain_outbound() {
        let (graph, ids) = chain(5);
        let costing = ModeCosting::new(TravelMode::Auto);
        let (capped, _) = run(&graph, &costing, ids[0], 3, DirectionMask::Outbound);
        assert_eq!(capped, DirectedReach { outbound: 3, inbound: 0 });
        let (full, _) = run(&graph, &costing, ids[0], 10, DirectionMask::Outbound);
        assert_eq!(full.outbound, 5);
    }

    #[test]
    fn test_chain_inbound_needs_opposing_for_seed() {
        let (graph, ids) = chain(5);
        let costing = ModeCosting::new(TravelMode::Auto);
        // one-way chain: the seed itself is not counted inbound, its four
        // predecessors are
        let (result, _) = run(&graph, &costing, ids[4], 10, DirectionMask::Inbound);
        assert_eq!(result, DirectedReach { outbound: 0, inbound: 4 });
    }

    #[test]
    fn test_zero_threshold_skips_expansion() {
        let (graph, ids) = chain(3);
        let costing = ModeCosting::new(TravelMode::Auto);
        let (result, stats) = run(&graph, &costing, ids[0], 0, DirectionMask::Both);
        assert_eq!(result, DirectedReach::default());
        assert_eq!(stats.expansions, 0);
        assert_eq!(stats.calls, 1);
    }

    #[test]
    fn test_forbidden_seed_has_no_reach() {
        let (mut graph, ids) = chain(3);
        graph.edge_data_mut(ids[0]).unwrap().closed = true;
        let costing = ModeCosting::new(TravelMode::Auto);
        let (result, _) = run(&graph, &costing, ids[0], 10, DirectionMask::Outbound);
        assert_eq!(result.outbound, 0);
    }

    #[test]
    fn test_mismatched_id_is_error() {
        let (graph, ids) = chain(2);
        let costing = ModeCosting::new(TravelMode::Auto);
        let edge = graph.edge(ids[0]).unwrap();
        let mut reach = Reach::new();
        let result = reach.reach(&edge, ids[1], 5, &graph, &costing, DirectionMask::Both);
        assert!(matches!(result, Err(ReachError::GraphData(_))));
    }

    #[test]
    fn test_conditional_escalates_only_when_short() {
        // seed -> gate(conditional) -> 3 more edges
        let (mut graph, ids) = chain(5);
        graph.edge_data_mut(ids[1]).unwrap().conditional = Some("Mo-Fr".to_string());

        let open = ModeCosting::new(TravelMode::Auto);
        let (result, stats) = run(&graph, &open, ids[0], 10, DirectionMask::Outbound);
        assert_eq!(result.outbound, 5);
        assert_eq!(stats.escalations, 1);
        assert_eq!(stats.expansions, 2);

        let closed = ModeCosting::new(TravelMode::Auto)
            .with_conditional_default(ConditionalDecision::Closed);
        let (result, _) = run(&graph, &closed, ids[0], 10, DirectionMask::Outbound);
        assert_eq!(result.outbound, 1);

        // the seed alone satisfies a threshold of 1: no escalation
        let (result, stats) = run(&graph, &closed, ids[0], 1, DirectionMask::Outbound);
        assert_eq!(result.outbound, 1);
        assert_eq!(stats.escalations, 0);
    }

    #[test]
    fn test_cap_reached_through_conditional_is_verified() {
        // seed -> gate: a threshold of 2 is met only by counting the gate
        let (mut graph, ids) = chain(2);
        graph.edge_data_mut(ids[1]).unwrap().conditional = Some("Sa-Su".to_string());
        let closed = ModeCosting::new(TravelMode::Auto)
            .with_conditional_default(ConditionalDecision::Closed);
        let (result, stats) = run(&graph, &closed, ids[0], 2, DirectionMask::Outbound);
        assert_eq!(result.outbound, 1);
        assert_eq!(stats.escalations, 1);
    }

    #[test]
    fn test_strategy_hints_scale_with_threshold() {
        let mut strategy = ReachStrategy::new(ExpansionConfig::default());
        strategy.configure(ReachMode::Conservative, 4, true);
        let small = strategy.hints();
        strategy.configure(ReachMode::Conservative, 1_000, true);
        let large = strategy.hints();
        strategy.configure(ReachMode::Conservative, MAX_REACH_LIMIT, true);
        let huge = strategy.hints();

        assert_eq!(small.bucket_count, 16);
        assert_eq!(small.label_reservation, 8);
        assert_eq!(large.bucket_count, 1_000);
        assert_eq!(large.label_reservation, 2_000);
        assert_eq!(huge.bucket_count, 20_000);
        assert_eq!(huge.label_reservation, 131_070);
    }

    #[test]
    fn test_threshold_above_limit_is_clamped() {
        let (graph, ids) = chain(3);
        let costing = ModeCosting::new(TravelMode::Auto);
        let (result, _) = run(&graph, &costing, ids[0], u32::MAX, DirectionMask::Outbound);
        assert_eq!(result.outbound, 3);
    }

    #[test]
    fn test_turn_restriction_limits_reach() {
        let mut graph = RoadGraph::new();
        let a = graph.add_node();
        let b = graph.add_node();
        let c = graph.add_node();
        let d = graph.add_node();
        let ab = graph.add_edge(a, b, EdgeData::new(10.0, 36)).unwrap();
        let bc = graph.add_edge(b, c, EdgeData::new(10.0, 36)).unwrap();
        graph.add_edge(b, d, EdgeData::new(10.0, 36)).unwrap();
        graph.restrict_turn(ab, bc).unwrap();

        let costing = ModeCosting::new(TravelMode::Auto);
        let (result, _) = run(&graph, &costing, ab, 10, DirectionMask::Outbound);
        assert_eq!(result.outbound, 2);
    }
}
