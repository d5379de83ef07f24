use stackbot_engine::{Placement, Snapshot};
use stackbot_evaluator::Weights;

use crate::{Planner, PlannerConfig, leaf_score, root_turns};

/// One-ply planner: the placement with the best leaf score wins.
///
/// Ties keep the first candidate in enumeration order, which makes the
/// choice deterministic for a given snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyPlanner;

impl Planner for GreedyPlanner {
    fn plan(
        &self,
        snapshot: &Snapshot,
        weights: &Weights,
        _config: &PlannerConfig,
    ) -> Option<Placement> {
        let mut best: Option<(f32, Placement)> = None;
        for turn in root_turns(snapshot) {
            let score = leaf_score(&turn.outcome, weights);
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, turn.placement));
            }
        }
        best.map(|(_, placement)| placement)
    }
}
