use std::collections::VecDeque;

use rand::prelude::*;
use rand_pcg::Pcg32;

use crate::core::PieceKind;

/// How the queue draws the next piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueMode {
    /// Independent uniform draws over all seven kinds.
    Uniform,
    /// Shuffled permutations of all seven kinds, one bag at a time.
    SevenBag,
}

/// Seeded piece randomizer.
///
/// Cloning a queue yields an independent continuation: both copies produce
/// the same future sequence until one of them draws.
#[derive(Debug, Clone)]
pub struct PieceQueue {
    rng: Pcg32,
    mode: QueueMode,
    pending: VecDeque<PieceKind>,
}

impl PieceQueue {
    #[must_use]
    pub fn new(mode: QueueMode, seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            mode,
            pending: VecDeque::new(),
        }
    }

    /// Takes the next piece.
    pub fn pop(&mut self) -> PieceKind {
        self.fill(1);
        self.pending.pop_front().expect("queue was just filled")
    }

    /// The next `n` pieces without consuming them.
    pub fn peek(&mut self, n: usize) -> Vec<PieceKind> {
        self.fill(n);
        self.pending.iter().copied().take(n).collect()
    }

    fn fill(&mut self, n: usize) {
        while self.pending.len() < n {
            match self.mode {
                QueueMode::Uniform => {
                    self.pending.push_back(self.rng.random());
                }
                QueueMode::SevenBag => {
                    let mut bag = PieceKind::ALL;
                    bag.shuffle(&mut self.rng);
                    self.pending.extend(bag);
                }
            }
        }
    }
}
