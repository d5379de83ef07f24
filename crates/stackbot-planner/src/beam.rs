use stackbot_engine::{
    Board, PieceKind, Placement, RotationSystem, Snapshot, generate_placements, simulate,
};
use stackbot_evaluator::Weights;

use crate::{LOSS_SCORE, Planner, PlannerConfig, leaf_score, root_turns};

/// Beam search through the known preview.
///
/// Each level places one piece on every surviving line of play and keeps
/// the `beam_width` best by accumulated score. Unlike expectimax the
/// future pieces are not chance nodes: the preview is known, so the search
/// is deterministic all the way down. The hold slot is branched at every
/// level, not just the root.
///
/// Lookahead is capped at `preview.len() + 1` plies; a line of play that
/// runs out of preview is carried to the final frontier unchanged. A line
/// whose next known piece has no legal placement is dead, not exhausted,
/// and is carried with a loss penalty instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeamPlanner;

/// One surviving line of play. Only the first placement is ever reported;
/// the rest of the line exists to rank it.
#[derive(Debug, Clone)]
struct BeamNode {
    first: Placement,
    board: Board,
    score: f32,
    hold: Option<PieceKind>,
    /// Preview entries consumed so far.
    offset: usize,
}

impl Planner for BeamPlanner {
    fn plan(
        &self,
        snapshot: &Snapshot,
        weights: &Weights,
        config: &PlannerConfig,
    ) -> Option<Placement> {
        let config = config.normalized();
        let rules = snapshot.rules.system();

        let mut frontier: Vec<BeamNode> = root_turns(snapshot)
            .into_iter()
            .map(|turn| BeamNode {
                first: turn.placement,
                score: leaf_score(&turn.outcome, weights),
                board: turn.outcome.board,
                hold: if turn.placement.held {
                    Some(snapshot.current)
                } else {
                    snapshot.hold
                },
                offset: turn.preview_consumed,
            })
            .collect();
        prune(&mut frontier, config.beam_width);

        let effective_depth = config.depth.min(snapshot.preview.len() + 1);
        for _ in 1..effective_depth {
            let mut next = Vec::new();
            for node in &frontier {
                let before = next.len();
                if let Some(&active) = snapshot.preview.get(node.offset) {
                    let mut expand = |kind, hold, consumed| {
                        expand_node(
                            &mut next,
                            node,
                            kind,
                            hold,
                            consumed,
                            rules,
                            snapshot.visible_height,
                            weights,
                        );
                    };
                    expand(active, node.hold, 1);
                    if snapshot.allow_hold {
                        match node.hold {
                            // Holding the active piece releases the stored
                            // one.
                            Some(stored) => expand(stored, Some(active), 1),
                            None => {
                                if let Some(&promoted) = snapshot.preview.get(node.offset + 1) {
                                    expand(promoted, Some(active), 2);
                                }
                            }
                        }
                    }
                }
                if next.len() == before {
                    let mut carried = node.clone();
                    if snapshot.preview.get(node.offset).is_some() {
                        // A known piece had no legal placement: the line
                        // dies within the preview. It must keep sinking,
                        // never outrank lines that pay per-ply penalties
                        // for surviving.
                        carried.score += LOSS_SCORE;
                    }
                    // Genuine preview exhaustion carries unchanged so a
                    // survivable prefix is never discarded.
                    next.push(carried);
                }
            }
            frontier = next;
            prune(&mut frontier, config.beam_width);
        }

        let mut best: Option<&BeamNode> = None;
        for node in &frontier {
            if best.is_none_or(|b| node.score > b.score) {
                best = Some(node);
            }
        }
        best.map(|node| node.first)
    }
}

/// Places `kind` everywhere on the node's board and pushes the resulting
/// lines of play.
#[expect(clippy::too_many_arguments, reason = "internal expansion step")]
fn expand_node(
    next: &mut Vec<BeamNode>,
    node: &BeamNode,
    kind: PieceKind,
    hold: Option<PieceKind>,
    consumed: usize,
    rules: &dyn RotationSystem,
    visible_height: usize,
    weights: &Weights,
) {
    let spawn = rules.spawn_state(kind, node.board.width(), visible_height);
    for placement in generate_placements(&node.board, spawn, rules) {
        let Some(outcome) = simulate(
            &node.board,
            placement.kind,
            placement.rotation,
            placement.x,
            placement.y,
        ) else {
            debug_assert!(false, "enumerated placement must not collide");
            continue;
        };
        next.push(BeamNode {
            first: node.first,
            score: node.score + leaf_score(&outcome, weights),
            board: outcome.board,
            hold,
            offset: node.offset + consumed,
        });
    }
}

/// Stable sort by accumulated score, best first, then truncate. Stability
/// keeps enumeration order among ties.
fn prune(frontier: &mut Vec<BeamNode>, beam_width: usize) {
    frontier.sort_by(|a, b| b.score.total_cmp(&a.score));
    frontier.truncate(beam_width);
}

#[cfg(test)]
mod tests {
    use stackbot_engine::{Board, RuleSet};

    use crate::{GreedyPlanner, test_util::*};

    use super::*;

    #[test]
    fn test_depth_one_matches_greedy() {
        let weights = Weights::default();
        let config = PlannerConfig {
            depth: 1,
            beam_width: 64,
            ..PlannerConfig::default()
        };
        for seed in 0..6 {
            let snapshot = snapshot_on(rough_board(seed), PieceKind::T);
            assert_eq!(
                BeamPlanner.plan(&snapshot, &weights, &config),
                GreedyPlanner.plan(&snapshot, &weights, &config),
            );
        }
    }

    #[test]
    fn test_lookahead_capped_by_preview() {
        // No preview at all: depth collapses to 1 and the search still
        // answers.
        let mut snapshot = snapshot_on(rough_board(2), PieceKind::L);
        snapshot.preview = Vec::new();
        snapshot.allow_hold = false;
        let config = PlannerConfig {
            depth: 4,
            beam_width: 8,
            ..PlannerConfig::default()
        };
        let weights = Weights::default();
        assert_eq!(
            BeamPlanner.plan(&snapshot, &weights, &config),
            GreedyPlanner.plan(&snapshot, &weights, &config),
        );
    }

    #[test]
    fn test_beam_is_deterministic() {
        let weights = Weights::default();
        let config = PlannerConfig {
            depth: 3,
            beam_width: 8,
            ..PlannerConfig::default()
        };
        let snapshot = snapshot_on(rough_board(7), PieceKind::S);
        let first = BeamPlanner.plan(&snapshot, &weights, &config);
        let second = BeamPlanner.plan(&snapshot, &weights, &config);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn test_hold_branch_wins_when_it_clears() {
        // The bottom row needs a vertical I; the current piece and the
        // whole preview prefix cannot clear it, so the best line holds.
        let board = Board::from_ascii(
            24,
            r"
            #########.
            #########.
            #########.
            #########.
            ",
        );
        let mut snapshot = snapshot_on(board, PieceKind::O);
        snapshot.hold = Some(PieceKind::I);
        snapshot.preview = vec![PieceKind::O];
        let config = PlannerConfig {
            depth: 1,
            beam_width: 32,
            ..PlannerConfig::default()
        };
        let chosen = BeamPlanner
            .plan(&snapshot, &Weights::default(), &config)
            .unwrap();
        assert!(chosen.held);
        assert_eq!(chosen.kind, PieceKind::I);
    }

    #[test]
    fn test_dead_line_never_outranks_survivors() {
        // Towers flanking the spawn columns up to the skyline: locking on
        // top of them fills the spawn cells, so the next known piece has
        // no legal placement. That line stops paying per-ply penalties,
        // and must not beat the lines that keep playing.
        let mut board = Board::new(10, 24);
        for y in 0..20 {
            board.set(4, y, true);
            board.set(5, y, true);
        }
        let mut snapshot = snapshot_on(board, PieceKind::O);
        snapshot.preview = vec![PieceKind::O, PieceKind::O];
        let config = PlannerConfig {
            depth: 3,
            beam_width: 64,
            ..PlannerConfig::default()
        };
        let weights = Weights::default();
        let chosen = BeamPlanner.plan(&snapshot, &weights, &config).unwrap();
        assert_ne!(chosen.x, 3, "chose to cap the spawn columns");

        // The surviving choice leaves the next piece a legal spawn.
        let outcome = simulate(
            &snapshot.board,
            chosen.kind,
            chosen.rotation,
            chosen.x,
            chosen.y,
        )
        .unwrap();
        let rules = snapshot.rules.system();
        let spawn = rules.spawn_state(PieceKind::O, 10, 20);
        assert!(!generate_placements(&outcome.board, spawn, rules).is_empty());
    }

    #[test]
    fn test_width_one_beam_survives_deep_search() {
        // A width-1 frontier is greedy ply by ply; it must still produce
        // a legal placement at full depth.
        let weights = Weights::default();
        let snapshot = snapshot_on(rough_board(13), PieceKind::J);
        let config = PlannerConfig {
            depth: 3,
            beam_width: 1,
            ..PlannerConfig::default()
        };
        let chosen = BeamPlanner.plan(&snapshot, &weights, &config).unwrap();
        assert!(!snapshot
            .board
            .collides(chosen.kind, chosen.rotation, chosen.x, chosen.y));
    }

    #[test]
    fn test_boxed_in_returns_none() {
        let mut board = Board::new(10, 24);
        for y in 0..24 {
            for x in 0..10 {
                board.set(x, y, true);
            }
        }
        let snapshot = Snapshot {
            board,
            current: PieceKind::T,
            hold: None,
            hold_used: false,
            allow_hold: false,
            preview: vec![PieceKind::I],
            visible_height: 20,
            rules: RuleSet::Guideline,
        };
        let config = PlannerConfig {
            depth: 2,
            beam_width: 4,
            ..PlannerConfig::default()
        };
        assert_eq!(
            BeamPlanner.plan(&snapshot, &Weights::default(), &config),
            None
        );
    }
}
