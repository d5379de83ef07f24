//! Game-level logic on top of the core data structures.
//!
//! - [`Snapshot`] - one decision's worth of deep-copied game state
//! - [`simulate`] - pure lock-and-clear simulation of one placement
//! - [`PieceQueue`] - seeded piece randomizer (uniform or 7-bag)
//! - [`Game`] - game-state owner that applies planner decisions

pub use self::{game::*, piece_queue::*, simulate::*, snapshot::*};

mod game;
mod piece_queue;
mod simulate;
mod snapshot;
