// projeto: triaxial_prep
// file: src/preprocessing/standardize.rs
// Label standardization with train-split statistics

use log::{debug, info};
use ndarray::{Array, ArrayView1, Array3, Axis, Dimension};
use serde::{Deserialize, Serialize};

use crate::preprocessing::split::{SplitData, SplitName};
use crate::preprocessing::utils::PrepError;

/// Per-feature affine scaling fitted on the train labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaling {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl FeatureScaling {
    /// Mean and population std over samples and timesteps, one per feature.
    pub fn fit(labels: &Array3<f64>) -> Result<Self, PrepError> {
        let (n, t, f) = labels.dim();
        if n * t == 0 {
            return Err(PrepError::EmptySplit { split: SplitName::Train.to_string() });
        }
        let flat = labels.to_shape((n * t, f))?;

        let mean = flat
            .mean_axis(Axis(0))
            .ok_or_else(|| PrepError::EmptySplit { split: SplitName::Train.to_string() })?;
        let std = flat.std_axis(Axis(0), 0.0);

        for (feature, (&s, &m)) in std.iter().zip(mean.iter()).enumerate() {
            // A constant column can leave rounding noise instead of an exact zero.
            if !s.is_finite() || s <= f64::EPSILON * m.abs().max(1.0) {
                return Err(PrepError::DegenerateFeature { feature, std: s });
            }
        }
        debug!("📐 [Standardize] mean={:?} std={:?}", mean, std);

        Ok(FeatureScaling { mean: mean.to_vec(), std: std.to_vec() })
    }

    pub fn num_features(&self) -> usize {
        self.mean.len()
    }

    fn check_features(&self, shape: &[usize]) -> Result<(), PrepError> {
        match shape.last() {
            Some(&f) if f == self.num_features() => Ok(()),
            other => Err(PrepError::ShapeMismatch(format!(
                "labels have {:?} features, scaling was fitted on {}",
                other, self.num_features()
            ))),
        }
    }

    /// `(y - mean) / std` along the last axis.
    pub fn apply<D: Dimension>(&self, labels: &Array<f64, D>) -> Result<Array<f64, D>, PrepError> {
        self.check_features(labels.shape())?;
        let mean = ArrayView1::from(&self.mean[..]);
        let std = ArrayView1::from(&self.std[..]);
        let mut scaled = labels.to_owned();
        let last = Axis(scaled.ndim() - 1);
        for mut lane in scaled.lanes_mut(last) {
            lane.zip_mut_with(&mean, |y, &m| *y -= m);
            lane.zip_mut_with(&std, |y, &s| *y /= s);
        }
        Ok(scaled)
    }

    /// `y * std + mean` along the last axis; inverse of [`FeatureScaling::apply`].
    pub fn invert<D: Dimension>(&self, labels: &Array<f64, D>) -> Result<Array<f64, D>, PrepError> {
        self.check_features(labels.shape())?;
        let mean = ArrayView1::from(&self.mean[..]);
        let std = ArrayView1::from(&self.std[..]);
        let mut restored = labels.to_owned();
        let last = Axis(restored.ndim() - 1);
        for mut lane in restored.lanes_mut(last) {
            lane.zip_mut_with(&std, |y, &s| *y *= s);
            lane.zip_mut_with(&mean, |y, &m| *y += m);
        }
        Ok(restored)
    }
}

/// Standardizes the labels of every split using statistics of the train split only.
pub fn standardize_outputs(split_data: SplitData) -> Result<(SplitData, FeatureScaling), PrepError> {
    let scaling = FeatureScaling::fit(&split_data.train.labels)?;

    let SplitData { mut train, mut val, mut test } = split_data;
    train.labels = scaling.apply(&train.labels)?;
    val.labels = scaling.apply(&val.labels)?;
    test.labels = scaling.apply(&test.labels)?;

    info!("📏 [Standardize] {} output features scaled with train statistics", scaling.num_features());
    Ok((SplitData { train, val, test }, scaling))
}
