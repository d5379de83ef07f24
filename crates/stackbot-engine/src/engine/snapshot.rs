use crate::core::{Board, PieceKind, RuleSet};

/// Everything a planner sees for one decision.
///
/// Snapshots are always deep copies: the board is owned and shares nothing
/// with live game state, so planners can never observe a mutation made by
/// their host between calls.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub board: Board,
    pub current: PieceKind,
    pub hold: Option<PieceKind>,
    pub hold_used: bool,
    pub allow_hold: bool,
    /// Known upcoming pieces, nearest first. May be partial or empty.
    pub preview: Vec<PieceKind>,
    pub visible_height: usize,
    pub rules: RuleSet,
}

impl Snapshot {
    /// Whether the hold slot can still be used this turn.
    #[must_use]
    pub fn can_hold(&self) -> bool {
        self.allow_hold && !self.hold_used
    }

    /// The piece that would become active after a hold, along with how many
    /// preview entries the swap consumes. With an empty hold slot the first
    /// preview piece is promoted; `None` when no hold branch exists.
    #[must_use]
    pub fn hold_target(&self) -> Option<(PieceKind, usize)> {
        if !self.can_hold() {
            return None;
        }
        match self.hold {
            Some(kind) => Some((kind, 0)),
            None => self.preview.first().map(|&kind| (kind, 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            board: Board::new(10, 24),
            current: PieceKind::T,
            hold: None,
            hold_used: false,
            allow_hold: true,
            preview: vec![PieceKind::I, PieceKind::O],
            visible_height: 20,
            rules: RuleSet::Guideline,
        }
    }

    #[test]
    fn test_hold_target_promotes_from_preview() {
        let snapshot = snapshot();
        assert_eq!(snapshot.hold_target(), Some((PieceKind::I, 1)));
    }

    #[test]
    fn test_hold_target_prefers_held_piece() {
        let snapshot = Snapshot {
            hold: Some(PieceKind::S),
            ..snapshot()
        };
        assert_eq!(snapshot.hold_target(), Some((PieceKind::S, 0)));
    }

    #[test]
    fn test_hold_target_unavailable() {
        let used = Snapshot {
            hold_used: true,
            ..snapshot()
        };
        assert_eq!(used.hold_target(), None);

        let disabled = Snapshot {
            allow_hold: false,
            ..snapshot()
        };
        assert_eq!(disabled.hold_target(), None);

        let empty = Snapshot {
            preview: Vec::new(),
            ..snapshot()
        };
        assert_eq!(empty.hold_target(), None);
    }
}
