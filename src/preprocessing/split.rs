// projeto: triaxial_prep
// file: src/preprocessing/split.rs
// Sample-level train/val/test splitting from a seeded permutation

use log::{info, warn};
use ndarray::{Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::preprocessing::merge::MergedData;
use crate::preprocessing::utils::{check_fraction, fraction_count, PrepError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitName {
    Train,
    Val,
    Test,
}

impl SplitName {
    pub const ALL: [SplitName; 3] = [SplitName::Train, SplitName::Val, SplitName::Test];

    pub fn as_str(self) -> &'static str {
        match self {
            SplitName::Train => "train",
            SplitName::Val => "val",
            SplitName::Test => "test",
        }
    }
}

impl fmt::Display for SplitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the test split is taken from the permutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestSlice {
    /// Everything after train and val. Splits are disjoint and cover all samples.
    #[default]
    Remainder,
    /// The last `n_val` permutation entries, or every entry when `n_val`
    /// is zero. Kept for compatibility with splits produced by older runs;
    /// may overlap train and val.
    ValSizedTail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub val: Vec<usize>,
    pub test: Vec<usize>,
}

impl SplitIndices {
    pub fn get(&self, name: SplitName) -> &[usize] {
        match name {
            SplitName::Train => &self.train,
            SplitName::Val => &self.val,
            SplitName::Test => &self.test,
        }
    }
}

/// Partitions `0..n` using a permutation that depends only on `seed`.
pub fn split_indices(
    n: usize,
    train_frac: f64,
    val_frac: f64,
    seed: u64,
    test_slice: TestSlice,
) -> Result<SplitIndices, PrepError> {
    check_fraction("train_frac", train_frac)?;
    check_fraction("val_frac", val_frac)?;
    if train_frac + val_frac > 1.0 + 1e-12 {
        return Err(PrepError::InvalidConfig(format!(
            "train_frac + val_frac must not exceed 1, got {}",
            train_frac + val_frac
        )));
    }

    let n_train = fraction_count(train_frac, n);
    let n_val = fraction_count(val_frac, n).min(n - n_train);

    let mut permutation: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    permutation.shuffle(&mut rng);

    let train = permutation[..n_train].to_vec();
    let val = permutation[n_train..n_train + n_val].to_vec();
    let test = match test_slice {
        TestSlice::Remainder => permutation[n_train + n_val..].to_vec(),
        // A zero-length tail wraps around to the whole permutation.
        TestSlice::ValSizedTail if n_val == 0 => permutation.clone(),
        TestSlice::ValSizedTail => permutation[n - n_val..].to_vec(),
    };

    Ok(SplitIndices { train, val, test })
}

/// Samples of one split, aligned by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Split {
    pub load_sequence: Array3<f64>,
    pub contact_parameters: Array2<f64>,
    pub labels: Array3<f64>,
}

impl Split {
    pub fn len(&self) -> usize {
        self.labels.dim().0
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(merged: &MergedData, indices: &[usize]) -> Self {
        Split {
            load_sequence: merged.inputs.select(Axis(0), indices),
            contact_parameters: merged.contacts.select(Axis(0), indices),
            labels: merged.outputs.select(Axis(0), indices),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SplitData {
    pub train: Split,
    pub val: Split,
    pub test: Split,
}

impl SplitData {
    pub fn get(&self, name: SplitName) -> &Split {
        match name {
            SplitName::Train => &self.train,
            SplitName::Val => &self.val,
            SplitName::Test => &self.test,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SplitName, &Split)> {
        SplitName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }
}

/// Splits samples (never timesteps) into train, val and test.
pub fn make_splits(
    merged: &MergedData,
    train_frac: f64,
    val_frac: f64,
    seed: u64,
    test_slice: TestSlice,
) -> Result<SplitData, PrepError> {
    let n = merged.num_samples();
    let indices = split_indices(n, train_frac, val_frac, seed, test_slice)?;

    let used = indices.train.len() + indices.val.len();
    if test_slice == TestSlice::ValSizedTail && used + indices.test.len() > n {
        warn!("⚠️ [Split] Val-sized test tail overlaps the train/val splits");
    }

    let split_data = SplitData {
        train: Split::select(merged, &indices.train),
        val: Split::select(merged, &indices.val),
        test: Split::select(merged, &indices.test),
    };
    info!("✂️ [Split] Train: {} | Val: {} | Test: {} (seed {})",
          split_data.train.len(), split_data.val.len(), split_data.test.len(), seed);
    Ok(split_data)
}
