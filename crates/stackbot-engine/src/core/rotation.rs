use std::fmt;

use serde::{Deserialize, Serialize};

use super::{
    board::Board,
    piece::{PieceKind, PieceState, Rotation, Spin},
};

/// Rotation rule capability injected into the enumerator and the planners.
///
/// Implementations must be fully substitutable: callers consume only these
/// three operations and never branch on which variant is active.
pub trait RotationSystem: fmt::Debug + Sync {
    /// Rotation state a fresh piece spawns in.
    fn spawn_rotation(&self, kind: PieceKind) -> Rotation;

    /// Spawn state of a fresh piece on a board of the given width, relative
    /// to the visible skyline.
    fn spawn_state(&self, kind: PieceKind, width: usize, visible_height: usize) -> PieceState;

    /// Attempts a single rotation step. Returns the resulting state (which
    /// may be repositioned by a kick), or `None` with no state change.
    fn try_rotate(&self, board: &Board, state: PieceState, spin: Spin) -> Option<PieceState>;
}

/// Tag selecting one of the two built-in rule sets.
///
/// Carried by snapshots so planners can resolve the active rotation system
/// without owning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum RuleSet {
    /// Kick-based modern guideline rules.
    Guideline,
    /// No-kick toggle-based legacy rules.
    Classic,
}

impl RuleSet {
    #[must_use]
    pub fn system(self) -> &'static dyn RotationSystem {
        match self {
            RuleSet::Guideline => &GuidelineRules,
            RuleSet::Classic => &ClassicRules,
        }
    }

    /// Lock truncation height for this rule set, if any: classic rules
    /// silently drop piece cells above the visible area.
    #[must_use]
    pub fn lock_truncation(self, visible_height: usize) -> Option<usize> {
        match self {
            RuleSet::Guideline => None,
            RuleSet::Classic => Some(visible_height),
        }
    }
}

/// Kick-based rotation in the style of the modern guideline (SRS).
///
/// The target state is `(from + dir) mod 4`. The O-piece rotates freely in
/// place; every other piece walks an ordered kick-offset list (one table
/// for the I-piece, one for the rest) and the first non-colliding offset
/// wins. Exhausting the list fails the rotation with no state change.
#[derive(Debug, Clone, Copy)]
pub struct GuidelineRules;

impl RotationSystem for GuidelineRules {
    fn spawn_rotation(&self, _kind: PieceKind) -> Rotation {
        Rotation::ZERO
    }

    /// Centered horizontally, lowest piece cell at the skyline row; the
    /// spawn box itself sits in the buffer rows above the visible area.
    fn spawn_state(&self, kind: PieceKind, width: usize, visible_height: usize) -> PieceState {
        let rotation = self.spawn_rotation(kind);
        let x = (i16::try_from(width).unwrap() - kind.bounding_box()) / 2;
        let min_dy = kind
            .cells(rotation)
            .iter()
            .map(|&(_, dy)| i16::from(dy))
            .min()
            .unwrap_or(0);
        let y = i16::try_from(visible_height).unwrap() - min_dy;
        PieceState::new(kind, rotation, x, y)
    }

    fn try_rotate(&self, board: &Board, state: PieceState, spin: Spin) -> Option<PieceState> {
        let target = match spin {
            Spin::Cw => state.rotation.cw(),
            Spin::Ccw => state.rotation.ccw(),
        };
        if state.kind == PieceKind::O {
            return Some(state.with_rotation(target));
        }
        let table = match state.kind {
            PieceKind::I => &I_KICKS,
            _ => &JLSTZ_KICKS,
        };
        let trials = &table[state.rotation.as_usize()][spin_index(spin)];
        for &(dx, dy) in trials {
            let candidate = state.with_rotation(target).offset(i16::from(dx), i16::from(dy));
            if !board.collides(candidate.kind, candidate.rotation, candidate.x, candidate.y) {
                return Some(candidate);
            }
        }
        None
    }
}

/// No-kick toggle-based rotation of legacy rule sets.
///
/// The O-piece never rotates; S and Z toggle between exactly two states
/// regardless of spin direction; I, J, L, T cycle through all four states.
/// A rotation succeeds only if the target state fits at the unchanged
/// position. Any collision fails outright, with no offset search.
#[derive(Debug, Clone, Copy)]
pub struct ClassicRules;

impl RotationSystem for ClassicRules {
    fn spawn_rotation(&self, _kind: PieceKind) -> Rotation {
        Rotation::ZERO
    }

    /// Centered horizontally, topmost piece cell on the top visible row.
    /// Classic rules have no buffer zone above the skyline.
    fn spawn_state(&self, kind: PieceKind, width: usize, visible_height: usize) -> PieceState {
        let rotation = self.spawn_rotation(kind);
        let x = (i16::try_from(width).unwrap() - kind.bounding_box()) / 2;
        let max_dy = kind
            .cells(rotation)
            .iter()
            .map(|&(_, dy)| i16::from(dy))
            .max()
            .unwrap_or(0);
        let y = i16::try_from(visible_height).unwrap() - 1 - max_dy;
        PieceState::new(kind, rotation, x, y)
    }

    fn try_rotate(&self, board: &Board, state: PieceState, spin: Spin) -> Option<PieceState> {
        let target = match state.kind {
            PieceKind::O => return None,
            PieceKind::S | PieceKind::Z => {
                // Two-state toggle: both spin directions land on the same
                // alternate state.
                Rotation::new(if state.rotation.index() == 0 { 1 } else { 0 })
            }
            _ => match spin {
                Spin::Cw => state.rotation.cw(),
                Spin::Ccw => state.rotation.ccw(),
            },
        };
        let candidate = state.with_rotation(target);
        if board.collides(candidate.kind, candidate.rotation, candidate.x, candidate.y) {
            return None;
        }
        Some(candidate)
    }
}

const fn spin_index(spin: Spin) -> usize {
    match spin {
        Spin::Cw => 0,
        Spin::Ccw => 1,
    }
}

/// Ordered kick trials per `[from-state][spin]`, `(dx, dy)` with `dy` up.
type KickTable = [[[(i8, i8); 5]; 2]; 4];

/// Guideline kick offsets for J, L, S, T, Z.
const JLSTZ_KICKS: KickTable = [
    [
        [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)], // 0 -> 1
        [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],    // 0 -> 3
    ],
    [
        [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)], // 1 -> 2
        [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)], // 1 -> 0
    ],
    [
        [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],    // 2 -> 3
        [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)], // 2 -> 1
    ],
    [
        [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)], // 3 -> 0
        [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)], // 3 -> 2
    ],
];

/// Guideline kick offsets for the I-piece; its wider box needs kicks of a
/// different magnitude and shape.
const I_KICKS: KickTable = [
    [
        [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)], // 0 -> 1
        [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)], // 0 -> 3
    ],
    [
        [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)], // 1 -> 2
        [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)], // 1 -> 0
    ],
    [
        [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)], // 2 -> 3
        [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)], // 2 -> 1
    ],
    [
        [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)], // 3 -> 0
        [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)], // 3 -> 2
    ],
];
