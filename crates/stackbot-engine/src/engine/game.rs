use crate::{
    ApplyPlacementError, CollisionError,
    core::{Board, Placement, PieceKind, RuleSet},
};

use super::{PieceQueue, Snapshot};

/// Rows kept above the visible field for spawning and kicks.
const BUFFER_ROWS: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct GameStats {
    pub pieces_placed: u64,
    pub lines_cleared: u64,
}

/// What one applied turn did.
#[derive(Debug, Clone, Copy)]
pub struct TurnReport {
    pub lines_cleared: usize,
    /// The spawn after this lock collided; no further turns are possible.
    pub topped_out: bool,
}

/// Owns live game state and applies planner decisions.
///
/// A turn is atomic: an optional hold swap, a lock, line clears, and the
/// next spawn all happen inside [`Game::apply`]. Errors leave the game
/// untouched.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    rules: RuleSet,
    visible_height: usize,
    queue: PieceQueue,
    current: PieceKind,
    hold: Option<PieceKind>,
    allow_hold: bool,
    stats: GameStats,
    topped_out: bool,
}

impl Game {
    #[must_use]
    pub fn new(
        width: usize,
        visible_height: usize,
        rules: RuleSet,
        allow_hold: bool,
        mut queue: PieceQueue,
    ) -> Self {
        let board = Board::new(width, visible_height + BUFFER_ROWS);
        let current = queue.pop();
        Self {
            board,
            rules,
            visible_height,
            queue,
            current,
            hold: None,
            allow_hold,
            stats: GameStats::default(),
            topped_out: false,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn current(&self) -> PieceKind {
        self.current
    }

    #[must_use]
    pub fn hold(&self) -> Option<PieceKind> {
        self.hold
    }

    #[must_use]
    pub fn stats(&self) -> GameStats {
        self.stats
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.topped_out
    }

    /// A deep copy of the decision-relevant state with `preview_len` known
    /// upcoming pieces.
    pub fn snapshot(&mut self, preview_len: usize) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            current: self.current,
            hold: self.hold,
            hold_used: false,
            allow_hold: self.allow_hold,
            preview: self.queue.peek(preview_len),
            visible_height: self.visible_height,
            rules: self.rules,
        }
    }

    /// Applies one planner decision: hold swap if requested, lock, clear,
    /// advance the queue, and spawn the next piece.
    pub fn apply(&mut self, placement: Placement) -> Result<TurnReport, ApplyPlacementError> {
        if self.topped_out {
            return Err(ApplyPlacementError::ToppedOut);
        }

        let mut active = self.current;
        let mut hold = self.hold;
        let mut consumed_by_hold = false;
        if placement.held {
            if !self.allow_hold {
                return Err(ApplyPlacementError::HoldUnavailable);
            }
            match hold.replace(active) {
                Some(stored) => active = stored,
                None => {
                    active = self.queue.peek(1)[0];
                    consumed_by_hold = true;
                }
            }
        }
        if placement.kind != active {
            return Err(ApplyPlacementError::PieceMismatch);
        }
        if self
            .board
            .collides(placement.kind, placement.rotation, placement.x, placement.y)
        {
            return Err(ApplyPlacementError::Collision(CollisionError));
        }

        self.hold = hold;
        if consumed_by_hold {
            self.queue.pop();
        }
        let truncate = self.rules.lock_truncation(self.visible_height);
        self.board.place_piece(
            placement.kind,
            placement.rotation,
            placement.x,
            placement.y,
            truncate,
        );
        let cleared = self.board.clear_lines();
        self.stats.pieces_placed += 1;
        self.stats.lines_cleared += cleared.count as u64;

        self.current = self.queue.pop();
        let spawn = self
            .rules
            .system()
            .spawn_state(self.current, self.board.width(), self.visible_height);
        if self
            .board
            .collides(spawn.kind, spawn.rotation, spawn.x, spawn.y)
        {
            self.topped_out = true;
        }

        Ok(TurnReport {
            lines_cleared: cleared.count,
            topped_out: self.topped_out,
        })
    }
}
