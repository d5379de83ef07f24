//! Core data structures: board storage, piece shapes, rotation rules, and
//! the reachable-placement enumerator.

pub use self::{board::*, movegen::*, piece::*, rotation::*};

mod board;
mod movegen;
mod piece;
mod rotation;
