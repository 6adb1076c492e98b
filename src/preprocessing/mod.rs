// projeto: triaxial_prep
// file: src/preprocessing/mod.rs
// Module declarations for the simulation preprocessing pipeline

pub mod utils;        // Error type and numeric helpers
pub mod condition;    // Pressure / experiment type selection
pub mod store;        // Keyed per-condition tensor store
pub mod merge;        // Dataset merger and contact schema
pub mod split;        // Train/val/test splitter
pub mod standardize;  // Label standardizer
pub mod pad;          // Initial padding and constant broadcasting
pub mod window;       // Sliding-window generator
pub mod stats;        // TrainStats and dataset dimensions
pub mod config;       // TOML configuration
pub mod pipeline;     // End-to-end preparation
pub mod storage;      // Artifact output

// Re-export commonly used items for convenience
pub use config::PipelineConfig;
pub use pipeline::{prepare_datasets, prepare_windows};
pub use stats::TrainStats;
pub use storage::{load_train_stats, save_artifacts};
pub use store::NpyStore;
pub use utils::PrepError;
