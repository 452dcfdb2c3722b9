//! Per-direction traversal state of a reach computation.

use std::collections::HashSet;

use crate::graph::GraphId;

/// Enqueued and settled edge sets for one directional expansion.
///
/// An edge is either waiting (enqueued) or counted (settled), never both, and
/// a counted edge is counted once.
#[derive(Debug, Default)]
pub struct TraversalState {
    enqueued: HashSet<GraphId>,
    settled: HashSet<GraphId>,
}

impl TraversalState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop both sets and start over with room for `reservation` edges.
    pub fn reset(&mut self, reservation: usize) {
        *self = Self {
            enqueued: HashSet::with_capacity(reservation),
            settled: HashSet::with_capacity(reservation),
        };
    }

    /// Record that `id` entered the queue. Ignored for counted edges.
    pub fn enqueue(&mut self, id: GraphId) {
        if !self.settled.contains(&id) {
            self.enqueued.insert(id);
        }
    }

    /// Record that `id` left the queue without being counted.
    pub fn dequeue(&mut self, id: GraphId) {
        self.enqueued.remove(&id);
    }

    /// Count `id` as reached. Returns false if it was already counted.
    pub fn settle(&mut self, id: GraphId) -> bool {
        self.enqueued.remove(&id);
        self.settled.insert(id)
    }

    pub fn is_settled(&self, id: GraphId) -> bool {
        self.settled.contains(&id)
    }

    pub fn is_enqueued(&self, id: GraphId) -> bool {
        self.enqueued.contains(&id)
    }

    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }

    pub fn enqueued_count(&self) -> usize {
        self.enqueued.len()
    }
}
