//! Decision planners on top of the placement enumerator and evaluator.
//!
//! Three [`Planner`] implementations share one contract: given a
//! [`Snapshot`], pick the placement to apply this turn.
//!
//! - [`GreedyPlanner`] - best single placement by leaf score
//! - [`ExpectimaxPlanner`] - depth-limited search with chance nodes over
//!   the unknown next pieces, optionally risk-averse via CVaR
//! - [`BeamPlanner`] - beam search through the known preview, with hold
//!   branching at every level
//!
//! Multi-ply values are accumulated per-ply placement scores, so every
//! planner degenerates to [`GreedyPlanner`] at depth 1 and ties between
//! planners are comparable.

pub use self::{beam::*, expectimax::*, greedy::*};

mod beam;
mod expectimax;
mod greedy;

use stackbot_engine::{
    Placement, PlacementOutcome, RotationSystem, Snapshot, generate_placements, simulate,
};
use stackbot_evaluator::{FeatureVector, Weights, evaluate};

/// How a chance node folds the seven per-kind values into one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChanceAggregation {
    /// Uniform expectation over all kinds.
    Mean,
    /// Mean of the worst `alpha` fraction of outcomes. `alpha = 1.0` is
    /// [`ChanceAggregation::Mean`]; smaller values are more risk-averse.
    Cvar(f32),
}

#[derive(Debug, Clone, Copy)]
pub struct PlannerConfig {
    /// Plies to look ahead, counting the placement being chosen.
    pub depth: usize,
    /// Frontier size for beam search.
    pub beam_width: usize,
    pub aggregation: ChanceAggregation,
    /// Drop root placements that another root placement beats on score,
    /// holes, and stack height simultaneously.
    pub dominance_pruning: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            depth: 1,
            beam_width: 16,
            aggregation: ChanceAggregation::Mean,
            dominance_pruning: false,
        }
    }
}

impl PlannerConfig {
    /// Clamps degenerate settings to their nearest meaningful values.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.depth = self.depth.max(1);
        self.beam_width = self.beam_width.max(1);
        if let ChanceAggregation::Cvar(alpha) = self.aggregation {
            if alpha <= 0.0 {
                self.aggregation = ChanceAggregation::Cvar(1.0 / 7.0);
            } else if alpha > 1.0 {
                self.aggregation = ChanceAggregation::Cvar(1.0);
            }
        }
        self
    }
}

pub trait Planner: std::fmt::Debug {
    /// Picks the placement to apply, or `None` when no placement exists
    /// on any branch.
    fn plan(
        &self,
        snapshot: &Snapshot,
        weights: &Weights,
        config: &PlannerConfig,
    ) -> Option<Placement>;
}

/// One candidate root move: a placement on either the current branch or
/// the hold branch, with its simulated afterstate.
#[derive(Debug, Clone)]
pub(crate) struct Turn {
    pub(crate) placement: Placement,
    pub(crate) outcome: PlacementOutcome,
    /// Preview entries the branch consumed before this placement. Zero
    /// for the current piece, one when the hold promoted from preview.
    pub(crate) preview_consumed: usize,
}

/// Value of a branch with no legal placement. Any survivable line of play
/// beats it.
pub(crate) const LOSS_SCORE: f32 = -1.0e9;

pub(crate) fn leaf_score(outcome: &PlacementOutcome, weights: &Weights) -> f32 {
    evaluate(&FeatureVector::from_outcome(outcome), weights)
}

/// Enumerates every root move: all placements of the current piece plus,
/// when the hold slot is usable, all placements of the piece a hold would
/// activate.
pub(crate) fn root_turns(snapshot: &Snapshot) -> Vec<Turn> {
    let rules = snapshot.rules.system();
    let mut turns = branch_turns(snapshot, rules, snapshot.current, false, 0);
    if let Some((kind, consumed)) = snapshot.hold_target() {
        turns.extend(branch_turns(snapshot, rules, kind, true, consumed));
    }
    turns
}

fn branch_turns(
    snapshot: &Snapshot,
    rules: &dyn RotationSystem,
    kind: stackbot_engine::PieceKind,
    held: bool,
    preview_consumed: usize,
) -> Vec<Turn> {
    let spawn = rules.spawn_state(kind, snapshot.board.width(), snapshot.visible_height);
    generate_placements(&snapshot.board, spawn, rules)
        .into_iter()
        .filter_map(|mut placement| {
            placement.held = held;
            let Some(outcome) =
                simulate(&snapshot.board, placement.kind, placement.rotation, placement.x, placement.y)
            else {
                debug_assert!(false, "enumerated placement must not collide");
                return None;
            };
            Some(Turn {
                placement,
                outcome,
                preview_consumed,
            })
        })
        .collect()
}
