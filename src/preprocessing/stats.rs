// projeto: triaxial_prep
// file: src/preprocessing/stats.rs
// Derived metadata that must travel with a trained model

use chrono::{DateTime, Utc};
use ndarray::{Array, Dimension};
use serde::{Deserialize, Serialize};

use crate::preprocessing::split::Split;
use crate::preprocessing::standardize::FeatureScaling;
use crate::preprocessing::utils::PrepError;
use crate::preprocessing::window::WindowSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub sequence_length: usize,
    pub num_load_features: usize,
    pub num_contact_params: usize,
    pub num_labels: usize,
}

impl Dimensions {
    pub fn of(split: &Split) -> Self {
        let (_, sequence_length, num_load_features) = split.load_sequence.dim();
        Dimensions {
            sequence_length,
            num_load_features,
            num_contact_params: split.contact_parameters.ncols(),
            num_labels: split.labels.dim().2,
        }
    }
}

/// Everything inference needs to reproduce the training-time preprocessing
/// and map predictions back to physical units.
///
/// Serialized as one flat JSON object. `mean` and `std` are empty when the
/// labels were left unscaled; the window keys are absent when no windows
/// were built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainStats {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
    #[serde(flatten)]
    pub window: Option<WindowSpec>,
    pub pad_length: usize,
    /// Sequence length after padding.
    pub sequence_length: usize,
    pub contact_columns: Vec<String>,
    pub dimensions: Dimensions,
    pub created_at: DateTime<Utc>,
}

impl TrainStats {
    pub fn is_standardized(&self) -> bool {
        !self.mean.is_empty()
    }

    /// Train-split label scaling, if the labels were standardized.
    pub fn scaling(&self) -> Option<FeatureScaling> {
        if self.is_standardized() {
            Some(FeatureScaling { mean: self.mean.clone(), std: self.std.clone() })
        } else {
            None
        }
    }

    /// Scales raw labels the way the training labels were scaled.
    pub fn standardize<D: Dimension>(&self, labels: &Array<f64, D>) -> Result<Array<f64, D>, PrepError> {
        match self.scaling() {
            Some(scaling) => scaling.apply(labels),
            None => Ok(labels.to_owned()),
        }
    }

    /// Maps model outputs back to physical units.
    pub fn destandardize<D: Dimension>(&self, labels: &Array<f64, D>) -> Result<Array<f64, D>, PrepError> {
        match self.scaling() {
            Some(scaling) => scaling.invert(labels),
            None => Ok(labels.to_owned()),
        }
    }
}
