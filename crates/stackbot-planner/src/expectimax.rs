use std::collections::HashMap;

use stackbot_engine::{
    Board, PieceKind, Placement, RuleSet, Snapshot, generate_placements, simulate,
};
use stackbot_evaluator::Weights;

use crate::{
    ChanceAggregation, LOSS_SCORE, Planner, PlannerConfig, Turn, leaf_score, root_turns,
};

/// Depth-limited expectimax over the unknown piece stream.
///
/// Max nodes pick the best placement of a known piece; chance nodes
/// average (or CVaR-aggregate) the max-node values over all seven kinds
/// drawn uniformly. Values accumulate per-ply placement scores, so depth 1
/// is exactly greedy search.
///
/// The transposition memo is keyed by `(board hash, piece kind, remaining
/// depth)` and lives for a single [`Planner::plan`] call: afterstates
/// reached through different placement orders collapse to one evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpectimaxPlanner;

impl Planner for ExpectimaxPlanner {
    fn plan(
        &self,
        snapshot: &Snapshot,
        weights: &Weights,
        config: &PlannerConfig,
    ) -> Option<Placement> {
        let config = config.normalized();
        let mut search = Search {
            rules: snapshot.rules,
            visible_height: snapshot.visible_height,
            weights,
            aggregation: config.aggregation,
            memo: HashMap::new(),
        };

        let mut turns = root_turns(snapshot);
        if config.depth > 1 && config.dominance_pruning {
            turns = prune_dominated(turns, weights);
        }

        let mut best: Option<(f32, Placement)> = None;
        for turn in turns {
            let mut value = leaf_score(&turn.outcome, weights);
            if config.depth > 1 {
                value += search.chance_value(&turn.outcome.board, config.depth - 1);
            }
            if best.is_none_or(|(best_value, _)| value > best_value) {
                best = Some((value, turn.placement));
            }
        }
        best.map(|(_, placement)| placement)
    }
}

struct Search<'a> {
    rules: RuleSet,
    visible_height: usize,
    weights: &'a Weights,
    aggregation: ChanceAggregation,
    memo: HashMap<(u64, PieceKind, usize), f32>,
}

impl Search<'_> {
    /// Value of a board when the next piece is unknown. `depth` is the
    /// number of plies still allowed to place.
    #[expect(clippy::cast_precision_loss, reason = "seven kinds")]
    fn chance_value(&mut self, board: &Board, depth: usize) -> f32 {
        if depth == 0 {
            return 0.0;
        }
        let mut values = [0.0_f32; PieceKind::LEN];
        for (slot, kind) in values.iter_mut().zip(PieceKind::ALL) {
            *slot = self.max_value(board, kind, depth);
        }
        match self.aggregation {
            ChanceAggregation::Mean => {
                values.iter().sum::<f32>() / PieceKind::LEN as f32
            }
            ChanceAggregation::Cvar(alpha) => cvar(values, alpha),
        }
    }

    /// Best accumulated value when `kind` is the piece to place.
    fn max_value(&mut self, board: &Board, kind: PieceKind, depth: usize) -> f32 {
        let key = (board.hash(), kind, depth);
        if let Some(&cached) = self.memo.get(&key) {
            return cached;
        }

        let rules = self.rules.system();
        let spawn = rules.spawn_state(kind, board.width(), self.visible_height);
        let placements = generate_placements(board, spawn, rules);
        let mut best = LOSS_SCORE;
        for placement in placements {
            let Some(outcome) =
                simulate(board, placement.kind, placement.rotation, placement.x, placement.y)
            else {
                debug_assert!(false, "enumerated placement must not collide");
                continue;
            };
            let mut value = leaf_score(&outcome, self.weights);
            value += self.chance_value(&outcome.board, depth - 1);
            if value > best {
                best = value;
            }
        }

        self.memo.insert(key, best);
        best
    }
}

/// Conditional value at risk over the seven equally likely kind values:
/// the mean of the worst `alpha` fraction of the distribution, with the
/// boundary outcome weighted fractionally.
#[expect(clippy::cast_precision_loss, reason = "seven kinds")]
fn cvar(mut values: [f32; PieceKind::LEN], alpha: f32) -> f32 {
    values.sort_unstable_by(f32::total_cmp);
    let mass = alpha * PieceKind::LEN as f32;
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "mass is in (0, 7]"
    )]
    let full = (mass.floor() as usize).min(PieceKind::LEN);
    let mut sum: f32 = values[..full].iter().sum();
    let frac = mass - mass.floor();
    if frac > 0.0 && full < PieceKind::LEN {
        sum += frac * values[full];
    }
    sum / mass
}

/// Drops root moves that some other root move beats or equals on all three
/// of: leaf score, holes, and stack height. When two moves tie on all
/// metrics the earlier one survives.
fn prune_dominated(turns: Vec<Turn>, weights: &Weights) -> Vec<Turn> {
    struct Metrics {
        score: f32,
        holes: f32,
        max_height: usize,
    }
    let metrics: Vec<Metrics> = turns
        .iter()
        .map(|turn| {
            let features = stackbot_evaluator::FeatureVector::from_outcome(&turn.outcome);
            Metrics {
                score: stackbot_evaluator::evaluate(&features, weights),
                holes: features.holes,
                max_height: turn.outcome.board.max_height(),
            }
        })
        .collect();
    let dominates = |a: &Metrics, b: &Metrics| {
        a.score >= b.score && a.holes <= b.holes && a.max_height <= b.max_height
    };

    turns
        .into_iter()
        .enumerate()
        .filter(|&(i, _)| {
            !metrics.iter().enumerate().any(|(j, other)| {
                if i == j || !dominates(other, &metrics[i]) {
                    return false;
                }
                // Mutual domination means a tie on every metric; keep the
                // earlier candidate only.
                !dominates(&metrics[i], other) || j < i
            })
        })
        .map(|(_, turn)| turn)
        .collect()
}
