//! Reach over many candidate edges at once.
//!
//! A location search surfaces several candidate edges per location; their
//! reach is independent, so they are computed in parallel with one
//! controller per worker thread.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{DirectedReach, DirectionMask, Reach};
use crate::config::{ExpansionConfig, ReachSection};
use crate::costing::Costing;
use crate::error::Result;
use crate::graph::{GraphId, GraphReader};

/// Reach of one candidate edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateReach {
    pub edge_id: GraphId,
    pub reach: DirectedReach,
}

/// Compute reach for every candidate, in input order.
///
/// Fails on the first reader or costing error.
pub fn reach_candidates<R, C>(
    candidates: &[GraphId],
    max_reach: u32,
    reader: &R,
    costing: &C,
    direction: DirectionMask,
    sizing: &ExpansionConfig,
) -> Result<Vec<CandidateReach>>
where
    R: GraphReader + ?Sized,
    C: Costing + ?Sized,
{
    candidates
        .par_iter()
        .map_init(
            || Reach::with_config(sizing.clone()),
            |reach, &edge_id| {
                let edge = reader.edge(edge_id)?;
                let result = reach.reach(&edge, edge_id, max_reach, reader, costing, direction)?;
                Ok(CandidateReach {
                    edge_id,
                    reach: result,
                })
            },
        )
        .collect()
}

/// Rejects candidates that cannot reach, or be reached from, enough of the
/// network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFilter {
    /// Edges needed in each requested direction.
    pub min_reach: u32,
    pub direction: DirectionMask,
}

impl CandidateFilter {
    pub fn new(min_reach: u32, direction: DirectionMask) -> Self {
        Self {
            min_reach,
            direction,
        }
    }

    pub fn from_config(section: &ReachSection) -> Self {
        Self::new(section.min_reach, section.direction)
    }

    /// True if `reach` meets the minimum in every requested direction.
    pub fn passes(&self, reach: &DirectedReach) -> bool {
        reach.min_directional(self.direction) >= self.min_reach
    }

    /// Split candidates into `(kept, rejected)`.
    ///
    /// Reach is computed with the minimum as its threshold: knowing that a
    /// candidate clears the bar is enough.
    pub fn apply<R, C>(
        &self,
        candidates: &[GraphId],
        reader: &R,
        costing: &C,
        sizing: &ExpansionConfig,
    ) -> Result<(Vec<CandidateReach>, Vec<CandidateReach>)>
    where
        R: GraphReader + ?Sized,
        C: Costing + ?Sized,
    {
        let results = reach_candidates(
            candidates,
            self.min_reach,
            reader,
            costing,
            self.direction,
            sizing,
        )?;
        let (kept, rejected): (Vec<_>, Vec<_>) =
            results.into_iter().partition(|c| self.passes(&c.reach));
        debug!(
            kept = kept.len(),
            rejected = rejected.len(),
            min_reach = self.min_reach,
            "candidates filtered by reach"
        );
        Ok((kept, rejected))
    }
}
