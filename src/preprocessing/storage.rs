// projeto: triaxial_prep
// file: src/preprocessing/storage.rs
// Writing prepared tensors and train statistics to a model directory

use log::info;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::preprocessing::split::{SplitData, SplitName};
use crate::preprocessing::stats::TrainStats;
use crate::preprocessing::store::write_array;
use crate::preprocessing::utils::PrepError;
use crate::preprocessing::window::Windows;

pub const TRAIN_STATS_FILE: &str = "train_stats.json";

fn artifact_path(dir: &Path, split: SplitName, what: &str) -> PathBuf {
    dir.join(format!("{}_{}.npy", split.as_str(), what))
}

/// Writes split tensors, optional windows and `train_stats.json` into `dir`.
/// Returns the written paths.
pub fn save_artifacts(
    dir: &Path,
    split_data: &SplitData,
    windows: Option<&BTreeMap<SplitName, Windows>>,
    stats: &TrainStats,
) -> Result<Vec<PathBuf>, PrepError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for (name, split) in split_data.iter() {
        let path = artifact_path(dir, name, "load_sequence");
        write_array(&path, &split.load_sequence)?;
        written.push(path);

        let path = artifact_path(dir, name, "contact_parameters");
        write_array(&path, &split.contact_parameters)?;
        written.push(path);

        let path = artifact_path(dir, name, "labels");
        write_array(&path, &split.labels)?;
        written.push(path);
    }

    if let Some(windows) = windows {
        for (name, w) in windows {
            let path = artifact_path(dir, *name, "window_inputs");
            write_array(&path, &w.inputs)?;
            written.push(path);

            let path = artifact_path(dir, *name, "window_labels");
            write_array(&path, &w.labels)?;
            written.push(path);
        }
    }

    let stats_path = dir.join(TRAIN_STATS_FILE);
    fs::write(&stats_path, serde_json::to_string_pretty(stats)?)?;
    written.push(stats_path);

    info!("💾 [Storage] {} artifacts written to {}", written.len(), dir.display());
    Ok(written)
}

pub fn load_train_stats(dir: &Path) -> Result<TrainStats, PrepError> {
    let content = fs::read_to_string(dir.join(TRAIN_STATS_FILE))?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::config::PipelineConfig;
    use crate::preprocessing::merge::tests::full_store;
    use crate::preprocessing::pipeline::{prepare_datasets, prepare_windows};
    use crate::preprocessing::store::read_array;
    use ndarray::{Array2, Array3};
    use tempfile::tempdir;

    #[test]
    fn test_save_and_reload_artifacts() {
        let (_data, store) = full_store(10);
        let config = PipelineConfig {
            pressure: "All".to_string(),
            window_size: 3,
            window_step: 1,
            ..PipelineConfig::default()
        };
        let (split_data, stats) = prepare_datasets(&store, &config).unwrap();
        let windows = prepare_windows(&split_data, &config).unwrap();

        let out = tempdir().unwrap();
        let written = save_artifacts(out.path(), &split_data, Some(&windows), &stats).unwrap();
        assert_eq!(written.len(), 3 * 3 + 3 * 2 + 1);

        let labels: Array3<f64> = read_array(&out.path().join("train_labels.npy")).unwrap();
        assert_eq!(labels, split_data.train.labels);

        let window_labels: Array2<f64> = read_array(&out.path().join("val_window_labels.npy")).unwrap();
        assert_eq!(window_labels, windows[&SplitName::Val].labels);

        let reloaded = load_train_stats(out.path()).unwrap();
        assert_eq!(reloaded, stats);
    }

    #[test]
    fn test_save_without_windows() {
        let (_data, store) = full_store(6);
        let config = PipelineConfig { use_windows: false, ..PipelineConfig::default() };
        let (split_data, stats) = prepare_datasets(&store, &config).unwrap();

        let out = tempdir().unwrap();
        let written = save_artifacts(out.path(), &split_data, None, &stats).unwrap();
        assert_eq!(written.len(), 10);
        assert!(!out.path().join("train_window_inputs.npy").exists());
    }

    #[test]
    fn test_load_missing_stats() {
        let out = tempdir().unwrap();
        assert!(matches!(load_train_stats(out.path()), Err(PrepError::Io(_))));
    }
}
