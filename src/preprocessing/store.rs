// projeto: triaxial_prep
// file: src/preprocessing/store.rs
// Keyed store of per-condition simulation tensors

use log::{debug, info};
use ndarray::{Array2, Array3};
use ndarray_npy::{read_npy, write_npy};
use std::fs;
use std::path::{Path, PathBuf};

use crate::preprocessing::condition::{Condition, EXPERIMENT_TYPES, PRESSURES};
use crate::preprocessing::utils::PrepError;

pub const CONTACT_PARAMS_FILE: &str = "contact_params.npy";
pub const INPUTS_FILE: &str = "inputs.npy";
pub const OUTPUTS_FILE: &str = "outputs.npy";

/// The three arrays stored for one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionArrays {
    /// samples × k
    pub contact_params: Array2<f64>,
    /// samples × T × load features
    pub inputs: Array3<f64>,
    /// samples × T × labels
    pub outputs: Array3<f64>,
}

impl ConditionArrays {
    pub fn num_samples(&self) -> usize {
        self.inputs.dim().0
    }

    pub fn sequence_length(&self) -> usize {
        self.inputs.dim().1
    }

    /// Checks that the three arrays describe the same samples and timesteps.
    pub fn validate(&self, key: &str) -> Result<(), PrepError> {
        let (n_in, t_in, _) = self.inputs.dim();
        let (n_out, t_out, _) = self.outputs.dim();
        let n_cp = self.contact_params.nrows();

        if n_in != n_out || n_in != n_cp {
            return Err(PrepError::ShapeMismatch(format!(
                "{}: sample counts differ (contact_params {}, inputs {}, outputs {})",
                key, n_cp, n_in, n_out
            )));
        }
        if t_in != t_out {
            return Err(PrepError::ShapeMismatch(format!(
                "{}: sequence lengths differ (inputs {}, outputs {})",
                key, t_in, t_out
            )));
        }
        Ok(())
    }
}

/// Anything that can hand out the arrays of a condition.
pub trait ConditionStore {
    fn contains(&self, condition: &Condition) -> bool;

    /// Fails with `MissingCondition` when the condition is absent.
    fn load(&self, condition: &Condition) -> Result<ConditionArrays, PrepError>;
}

/// Directory-backed store laid out as `root/{pressure}e6/{experiment_type}/*.npy`.
#[derive(Debug, Clone)]
pub struct NpyStore {
    root: PathBuf,
}

impl NpyStore {
    pub fn open(root: impl AsRef<Path>) -> Result<Self, PrepError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(PrepError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("store directory {} does not exist", root.display()),
            )));
        }
        info!("📂 [Store] Opened {}", root.display());
        Ok(NpyStore { root })
    }

    /// Creates the root directory if needed.
    pub fn create(root: impl AsRef<Path>) -> Result<Self, PrepError> {
        fs::create_dir_all(root.as_ref())?;
        Self::open(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn condition_dir(&self, condition: &Condition) -> PathBuf {
        self.root
            .join(condition.pressure.key())
            .join(condition.experiment_type.as_str())
    }

    /// Known conditions that are present on disk, in enumeration order.
    pub fn conditions(&self) -> Vec<Condition> {
        let mut present = Vec::new();
        for p in PRESSURES {
            for t in EXPERIMENT_TYPES {
                let condition = Condition::new(p, t);
                if self.contains(&condition) {
                    present.push(condition);
                }
            }
        }
        present
    }

    pub fn insert(&self, condition: &Condition, arrays: &ConditionArrays) -> Result<(), PrepError> {
        arrays.validate(&condition.key())?;
        let dir = self.condition_dir(condition);
        fs::create_dir_all(&dir)?;

        write_array(&dir.join(CONTACT_PARAMS_FILE), &arrays.contact_params)?;
        write_array(&dir.join(INPUTS_FILE), &arrays.inputs)?;
        write_array(&dir.join(OUTPUTS_FILE), &arrays.outputs)?;

        debug!("💾 [Store] Wrote {} samples to {}", arrays.num_samples(), dir.display());
        Ok(())
    }
}

impl ConditionStore for NpyStore {
    fn contains(&self, condition: &Condition) -> bool {
        let dir = self.condition_dir(condition);
        [CONTACT_PARAMS_FILE, INPUTS_FILE, OUTPUTS_FILE]
            .iter()
            .all(|name| dir.join(name).is_file())
    }

    fn load(&self, condition: &Condition) -> Result<ConditionArrays, PrepError> {
        if !self.contains(condition) {
            return Err(PrepError::MissingCondition { key: condition.key() });
        }
        let dir = self.condition_dir(condition);

        let arrays = ConditionArrays {
            contact_params: read_array(&dir.join(CONTACT_PARAMS_FILE))?,
            inputs: read_array(&dir.join(INPUTS_FILE))?,
            outputs: read_array(&dir.join(OUTPUTS_FILE))?,
        };
        arrays.validate(&condition.key())?;

        debug!("📥 [Store] {}: {} samples, sequence length {}",
               condition, arrays.num_samples(), arrays.sequence_length());
        Ok(arrays)
    }
}

pub fn read_array<T: ndarray_npy::ReadNpyExt>(path: &Path) -> Result<T, PrepError> {
    read_npy(path).map_err(|e| PrepError::Npy(format!("{}: {}", path.display(), e)))
}

pub fn write_array<T: ndarray_npy::WriteNpyExt>(path: &Path, array: &T) -> Result<(), PrepError> {
    write_npy(path, array).map_err(|e| PrepError::Npy(format!("{}: {}", path.display(), e)))
}
