//! Linear evaluation of placement afterstates.
//!
//! A [`FeatureVector`] is extracted from the board left behind by one
//! simulated placement, and a [`Weights`] vector turns it into a scalar
//! score by dot product. Higher scores are better; all default weights
//! penalize structural damage and reward erosion of the stack.

pub use self::{features::*, weights::*};

mod features;
mod weights;

/// Weighted sum of the feature vector. The entire evaluation model.
#[must_use]
pub fn evaluate(features: &FeatureVector, weights: &Weights) -> f32 {
    features
        .as_array()
        .iter()
        .zip(&weights.0)
        .map(|(f, w)| f * w)
        .sum()
}

#[cfg(test)]
mod tests {
    use stackbot_engine::{Board, PieceKind, Rotation, simulate};

    use super::*;

    #[test]
    fn test_evaluate_is_a_dot_product() {
        let features = FeatureVector {
            landing_height: 2.0,
            eroded_piece_cells: 4.0,
            ..FeatureVector::default()
        };
        let mut weights = Weights([0.0; FeatureVector::LEN]);
        weights.0[0] = 1.5;
        weights.0[1] = -0.5;
        assert!((evaluate(&features, &weights) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_weights_prefer_line_clear() {
        // A horizontal I on a nearly full bottom row clears it; the same
        // piece stacked on an empty column does not.
        let board = Board::from_ascii(
            24,
            r"
            ....######
            ",
        );
        let weights = Weights::default();
        let clearing = simulate(&board, PieceKind::I, Rotation::ZERO, 0, -2).unwrap();
        let stacking = simulate(&board, PieceKind::I, Rotation::ZERO, 0, -1).unwrap();
        let clear_score = evaluate(&FeatureVector::from_outcome(&clearing), &weights);
        let stack_score = evaluate(&FeatureVector::from_outcome(&stacking), &weights);
        assert!(clear_score > stack_score);
    }
}
