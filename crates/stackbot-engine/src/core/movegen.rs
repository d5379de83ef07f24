use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    piece::{PieceKind, PieceState, Rotation, Spin},
    rotation::RotationSystem,
};

/// A chosen final placement for one turn.
///
/// `held` records whether the decision used the hold slot; the enumerator
/// itself always reports `false` and planners flip it on hold branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Placement {
    pub kind: PieceKind,
    pub rotation: Rotation,
    pub x: i16,
    pub y: i16,
    pub held: bool,
}

/// Coordinate padding around the board for the visited set. Kicks can push
/// a piece origin a few cells past the nominal bounds before a later move
/// brings it back.
const COORD_PAD: i16 = 4;

/// Enumerates every distinct grounded placement reachable from the spawn
/// state.
///
/// BFS over the `(x, y, rotation)` move graph with the five legal
/// single-step edges: left, right, soft-drop one row, rotate clockwise,
/// rotate counter-clockwise. Rotation edges go through the injected
/// [`RotationSystem`], so a no-kick system simply yields a sparser graph
/// through the identical search. A node is grounded, and reported, exactly
/// when soft-dropping from it would collide; grounded nodes are
/// deduplicated by `(rotation, x, y)`.
///
/// Returns an empty list when the spawn state itself collides, which the
/// caller treats as imminent loss.
#[must_use]
pub fn generate_placements(
    board: &Board,
    spawn: PieceState,
    rules: &dyn RotationSystem,
) -> Vec<Placement> {
    if board.collides(spawn.kind, spawn.rotation, spawn.x, spawn.y) {
        return Vec::new();
    }

    let width = i16::try_from(board.width()).unwrap();
    let height = i16::try_from(board.total_height()).unwrap();
    let x_span = usize::try_from(width + 2 * COORD_PAD).unwrap();
    let y_span = usize::try_from(height + 2 * COORD_PAD).unwrap();
    let node_index = |state: &PieceState| -> Option<usize> {
        if state.x < -COORD_PAD
            || state.x >= width + COORD_PAD
            || state.y < -COORD_PAD
            || state.y >= height + COORD_PAD
        {
            return None;
        }
        let xi = usize::try_from(state.x + COORD_PAD).unwrap();
        let yi = usize::try_from(state.y + COORD_PAD).unwrap();
        Some((xi * y_span + yi) * 4 + state.rotation.as_usize())
    };

    let mut visited = vec![false; x_span * y_span * 4];
    let mut grounded = vec![false; x_span * y_span * 4];
    let mut placements = Vec::new();
    let mut queue = VecDeque::new();

    visited[node_index(&spawn).expect("spawn within padded range")] = true;
    queue.push_back(spawn);

    while let Some(state) = queue.pop_front() {
        let below = state.down();
        let below_collides = board.collides(below.kind, below.rotation, below.x, below.y);
        if below_collides {
            let index = node_index(&state).expect("visited nodes are in range");
            if !grounded[index] {
                grounded[index] = true;
                placements.push(Placement {
                    kind: state.kind,
                    rotation: state.rotation,
                    x: state.x,
                    y: state.y,
                    held: false,
                });
            }
        }

        let mut visit = |next: PieceState, queue: &mut VecDeque<PieceState>| {
            if let Some(index) = node_index(&next) {
                if !visited[index] {
                    visited[index] = true;
                    queue.push_back(next);
                }
            }
        };

        for moved in [state.left(), state.right()] {
            if !board.collides(moved.kind, moved.rotation, moved.x, moved.y) {
                visit(moved, &mut queue);
            }
        }
        if !below_collides {
            visit(below, &mut queue);
        }
        for spin in [Spin::Cw, Spin::Ccw] {
            if let Some(rotated) = rules.try_rotate(board, state, spin) {
                visit(rotated, &mut queue);
            }
        }
    }

    placements
}
