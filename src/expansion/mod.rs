//! Bounded, priority-queue driven edge expansion.
//!
//! [`Expansion`] walks the graph from a seed edge in order of increasing
//! cost. It does not decide what to count or when to stop: after dequeuing
//! each label it asks an injected [`ExpansionStrategy`], which also supplies
//! the sizing hints and owns whatever state it tallies.

pub mod label;
pub mod queue;

pub use label::EdgeLabel;
pub use queue::{BucketQueue, DEFAULT_BUCKET_SIZE};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

use crate::costing::Costing;
use crate::error::Result;
use crate::graph::{DirectedEdge, GraphId, GraphReader, NodeId};

/// What the expansion should do with a dequeued label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionRecommendation {
    /// Do not expand this edge's successors.
    StopBranch,
    /// Expand this edge's successors.
    Continue,
    /// Terminate the whole expansion.
    StopAll,
}

/// Sizing hints for the expansion's working storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionHints {
    pub bucket_count: u32,
    pub label_reservation: u32,
}

/// Which way the expansion walks edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelDirection {
    /// Follow edges from their end node: what can be reached.
    Forward,
    /// Follow edges back from their start node: what can reach.
    Reverse,
}

/// How an expansion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionEnd {
    /// The strategy asked to stop.
    Capped,
    /// The frontier ran dry.
    Exhausted,
}

/// Summary of one expansion run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionSummary {
    pub end: ExpansionEnd,
    /// Labels created, including the origin.
    pub labels: usize,
    /// Labels handed to the strategy.
    pub decided: usize,
}

/// Decision points of an expansion.
pub trait ExpansionStrategy {
    /// Clear per-expansion state. Called once before every run.
    fn reset(&mut self);

    /// Sizing for the coming run. Called after [`reset`](Self::reset).
    fn hints(&self) -> ExpansionHints;

    /// A new label entered the queue.
    fn on_enqueue(&mut self, _label: &EdgeLabel) {}

    /// Decide what to do with a dequeued label. Called at most once per edge
    /// per run.
    fn decide<C: Costing + ?Sized>(
        &mut self,
        label: &EdgeLabel,
        edge: &DirectedEdge,
        costing: &C,
    ) -> Result<ExpansionRecommendation>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeStatus {
    /// Waiting in the queue under this label index.
    Queued(u32),
    /// Handed to the strategy; never revisited.
    Done,
}

/// Reusable expansion engine. Storage is kept between runs and cleared at
/// the start of each one.
#[derive(Debug)]
pub struct Expansion {
    labels: Vec<EdgeLabel>,
    status: HashMap<GraphId, EdgeStatus>,
    queue: BucketQueue,
    bucket_size: f32,
}

impl Expansion {
    pub fn new() -> Self {
        Self::with_bucket_size(DEFAULT_BUCKET_SIZE)
    }

    pub fn with_bucket_size(bucket_size: f32) -> Self {
        Self {
            labels: Vec::new(),
            status: HashMap::new(),
            queue: BucketQueue::new(1, bucket_size),
            bucket_size,
        }
    }

    /// Labels from the last run.
    pub fn labels(&self) -> &[EdgeLabel] {
        &self.labels
    }

    /// Expand from `origin` until the strategy stops or the frontier empties.
    pub fn run<S, R, C>(
        &mut self,
        strategy: &mut S,
        reader: &R,
        costing: &C,
        origin: &DirectedEdge,
        direction: TravelDirection,
    ) -> Result<ExpansionSummary>
    where
        S: ExpansionStrategy,
        R: GraphReader + ?Sized,
        C: Costing + ?Sized,
    {
        strategy.reset();
        let hints = strategy.hints();
        self.prepare(hints);

        let seed = EdgeLabel::origin(
            origin.id,
            continue_node(origin, direction),
            costing.edge_cost(origin),
        );
        self.queue.reset(0.0);
        self.enqueue(strategy, seed);

        let mut decided = 0;
        while let Some(idx) = self.queue.pop() {
            let label = self.labels[idx as usize];
            match self.status.get(&label.edge_id) {
                Some(EdgeStatus::Queued(current)) if *current == idx => {}
                _ => continue,
            }
            self.status.insert(label.edge_id, EdgeStatus::Done);

            let edge = if label.origin {
                origin.clone()
            } else {
                reader.edge(label.edge_id)?
            };

            decided += 1;
            match strategy.decide(&label, &edge, costing)? {
                ExpansionRecommendation::StopAll => {
                    return Ok(self.summary(ExpansionEnd::Capped, decided));
                }
                ExpansionRecommendation::StopBranch => {
                    trace!(edge = %label.edge_id, "branch stopped");
                }
                ExpansionRecommendation::Continue => {
                    self.labels[idx as usize].settled = true;
                    self.expand(strategy, reader, costing, idx, &edge, direction)?;
                }
            }
        }
        Ok(self.summary(ExpansionEnd::Exhausted, decided))
    }

    fn prepare(&mut self, hints: ExpansionHints) {
        self.labels.clear();
        self.status.clear();
        let reserve = hints.label_reservation as usize;
        self.labels.reserve(reserve);
        self.status.reserve(reserve);
        if self.queue.bucket_count() != hints.bucket_count.max(1) as usize {
            self.queue = BucketQueue::new(hints.bucket_count, self.bucket_size);
        }
    }

    fn expand<S, R, C>(
        &mut self,
        strategy: &mut S,
        reader: &R,
        costing: &C,
        pred_idx: u32,
        pred: &DirectedEdge,
        direction: TravelDirection,
    ) -> Result<()>
    where
        S: ExpansionStrategy,
        R: GraphReader + ?Sized,
        C: Costing + ?Sized,
    {
        let EdgeLabel {
            cost: pred_cost,
            node,
            ..
        } = self.labels[pred_idx as usize];
        let neighbours = match direction {
            TravelDirection::Forward => reader.outgoing(node)?,
            TravelDirection::Reverse => reader.incoming(node)?,
        };

        for next_id in neighbours {
            if let Some(EdgeStatus::Done) = self.status.get(&next_id) {
                continue;
            }
            let next = reader.edge(next_id)?;
            let turn = match direction {
                TravelDirection::Forward => costing.transition_cost(pred, &next, node)?,
                TravelDirection::Reverse => costing.transition_cost(&next, pred, node)?,
            };
            let Some(turn) = turn else {
                continue;
            };
            let cost = pred_cost + turn + costing.edge_cost(&next);

            match self.status.get(&next_id) {
                Some(EdgeStatus::Queued(existing)) => {
                    let existing = *existing;
                    let label = &mut self.labels[existing as usize];
                    if cost < label.cost {
                        label.update(cost);
                        self.queue.push(existing, cost);
                    }
                }
                _ => {
                    let label =
                        EdgeLabel::successor(next_id, continue_node(&next, direction), cost);
                    self.enqueue(strategy, label);
                }
            }
        }
        Ok(())
    }

    fn enqueue<S: ExpansionStrategy>(&mut self, strategy: &mut S, label: EdgeLabel) {
        let idx = self.labels.len() as u32;
        self.status.insert(label.edge_id, EdgeStatus::Queued(idx));
        self.queue.push(idx, label.sort_cost);
        strategy.on_enqueue(&label);
        self.labels.push(label);
    }

    fn summary(&self, end: ExpansionEnd, decided: usize) -> ExpansionSummary {
        ExpansionSummary {
            end,
            labels: self.labels.len(),
            decided,
        }
    }
}

impl Default for Expansion {
    fn default() -> Self {
        Self::new()
    }
}

fn continue_node(edge: &DirectedEdge, direction: TravelDirection) -> NodeId {
    match direction {
        TravelDirection::Forward => edge.end_node,
        TravelDirection::Reverse => edge.start_node,
    }
}
