// projeto: triaxial_prep
// file: src/preprocessing/config.rs
// Pipeline configuration loaded from TOML

use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::preprocessing::condition::{ExperimentType, Pressure, Selection};
use crate::preprocessing::split::TestSlice;
use crate::preprocessing::utils::{check_fraction, PrepError};
use crate::preprocessing::window::WindowSpec;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// `0.2e6`, `0.5e6`, `1.0e6` or `All`.
    pub pressure: String,
    /// `drained`, `undrained` or `All`.
    pub experiment_type: String,
    pub train_frac: f64,
    pub val_frac: f64,
    pub pad_length: usize,
    pub use_windows: bool,
    pub standardize_outputs: bool,
    /// Append the initial void ratio as an extra contact parameter.
    pub add_e0: bool,
    pub seed: u64,
    pub window_size: usize,
    pub window_step: usize,
    pub label_offset: usize,
    /// Repeat contact parameters along the load sequence before windowing.
    pub concat_contacts: bool,
    pub test_slice: TestSlice,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            data_dir: PathBuf::from("data/rnn_data"),
            output_dir: PathBuf::from("trained_models"),
            pressure: "0.2e6".to_string(),
            experiment_type: "drained".to_string(),
            train_frac: 0.7,
            val_frac: 0.15,
            pad_length: 0,
            use_windows: true,
            standardize_outputs: true,
            add_e0: false,
            seed: 42,
            window_size: 20,
            window_step: 5,
            label_offset: 1,
            concat_contacts: true,
            test_slice: TestSlice::Remainder,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PrepError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = toml::from_str(&content)?;
        info!("⚙️ [Config] Loaded {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PrepError> {
        fs::write(path.as_ref(), toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn pressure_selection(&self) -> Result<Selection<Pressure>, PrepError> {
        self.pressure.parse()
    }

    pub fn experiment_type_selection(&self) -> Result<Selection<ExperimentType>, PrepError> {
        self.experiment_type.parse()
    }

    pub fn window_spec(&self) -> WindowSpec {
        WindowSpec {
            window_size: self.window_size,
            window_step: self.window_step,
            label_offset: self.label_offset,
        }
    }

    /// Padding only applies when windows are built.
    pub fn effective_pad_length(&self) -> usize {
        if self.use_windows { self.pad_length } else { 0 }
    }

    pub fn validate(&self) -> Result<(), PrepError> {
        self.pressure_selection()?;
        self.experiment_type_selection()?;
        check_fraction("train_frac", self.train_frac)?;
        check_fraction("val_frac", self.val_frac)?;
        if self.train_frac + self.val_frac > 1.0 + 1e-12 {
            return Err(PrepError::InvalidConfig(format!(
                "train_frac + val_frac = {} leaves no room for a test split",
                self.train_frac + self.val_frac
            )));
        }
        if self.use_windows {
            self.window_spec().validate()?;
        }
        Ok(())
    }

    /// Directory name for the artifacts of this selection, e.g. `simple_rnn_All_drained`.
    pub fn run_name(&self) -> String {
        format!("simple_rnn_{}_{}", self.pressure, self.experiment_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pressure_selection().unwrap(), Selection::One(Pressure(0.2)));
        assert_eq!(config.experiment_type_selection().unwrap(), Selection::One(ExperimentType::Drained));
        assert_eq!(config.window_spec(), WindowSpec::default());
        assert_eq!(config.run_name(), "simple_rnn_0.2e6_drained");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            pressure = "All"
            experiment_type = "All"
            seed = 7
            test_slice = "val_sized_tail"
            "#,
        )
        .unwrap();
        assert!(config.pressure_selection().unwrap().is_all());
        assert!(config.experiment_type_selection().unwrap().is_all());
        assert_eq!(config.seed, 7);
        assert_eq!(config.test_slice, TestSlice::ValSizedTail);
        assert_eq!(config.train_frac, 0.7);
        assert_eq!(config.window_size, 20);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = PipelineConfig::default();
        config.train_frac = 0.9;
        config.val_frac = 0.2;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.window_step = 0;
        assert!(config.validate().is_err());
        config.use_windows = false;
        assert!(config.validate().is_ok());

        let mut config = PipelineConfig::default();
        config.label_offset = usize::MAX;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.experiment_type = "cyclic".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pad_only_with_windows() {
        let mut config = PipelineConfig::default();
        config.pad_length = 5;
        assert_eq!(config.effective_pad_length(), 5);
        config.use_windows = false;
        assert_eq!(config.effective_pad_length(), 0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prep.toml");
        let mut config = PipelineConfig::default();
        config.add_e0 = true;
        config.pad_length = 3;
        config.save(&path).unwrap();

        let loaded = PipelineConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
