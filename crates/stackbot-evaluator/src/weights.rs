use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::FeatureVector;

/// Weight vector for the linear evaluation model, in [`FeatureVector`]
/// field order.
///
/// Serializes as a bare JSON array so weight files stay portable between
/// tools that train and tools that play.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Weights(pub [f32; FeatureVector::LEN]);

impl Default for Weights {
    /// Hand-tuned weights from the classic one-piece controller literature.
    /// Strong enough to play indefinitely on a standard field with greedy
    /// search alone.
    fn default() -> Self {
        Self([
            -12.63, // landing height
            6.60,   // eroded piece cells
            -9.22,  // row transitions
            -19.77, // column transitions
            -13.08, // holes
            -1.61,  // hole depth
            -24.04, // rows with holes
            -10.49, // cumulative wells
        ])
    }
}

impl Weights {
    pub fn from_slice(values: &[f32]) -> Result<Self, WeightVectorError> {
        let weights: [f32; FeatureVector::LEN] = values
            .try_into()
            .map_err(|_| WeightVectorError { found: values.len() })?;
        Ok(Self(weights))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadWeightsError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SaveWeightsError> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("expected {} weights, found {found}", FeatureVector::LEN)]
pub struct WeightVectorError {
    pub found: usize,
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LoadWeightsError {
    #[display("failed to read weight file: {_0}")]
    Io(std::io::Error),
    #[display("failed to parse weight file: {_0}")]
    Json(serde_json::Error),
}

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum SaveWeightsError {
    #[display("failed to write weight file: {_0}")]
    Io(std::io::Error),
    #[display("failed to encode weights: {_0}")]
    Json(serde_json::Error),
}
