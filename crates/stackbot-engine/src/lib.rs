pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("placement collides with the board")]
pub struct CollisionError;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ApplyPlacementError {
    #[display("placement piece does not match the active piece")]
    PieceMismatch,
    #[display("placement collides with the board")]
    Collision(CollisionError),
    #[display("hold is not available this turn")]
    HoldUnavailable,
    #[display("the game has already topped out")]
    ToppedOut,
}
