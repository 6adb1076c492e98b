// projeto: triaxial_prep
// file: src/preprocessing/pipeline.rs
// End-to-end preparation: merge, pad, split, standardize, window

use chrono::Utc;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeMap;

use crate::preprocessing::config::PipelineConfig;
use crate::preprocessing::merge::merge_datasets;
use crate::preprocessing::pad::{concatenate_constants, pad_initial};
use crate::preprocessing::split::{make_splits, SplitData, SplitName};
use crate::preprocessing::standardize::standardize_outputs;
use crate::preprocessing::stats::{Dimensions, TrainStats};
use crate::preprocessing::store::ConditionStore;
use crate::preprocessing::utils::PrepError;
use crate::preprocessing::window::{sliding_windows, Windows};

/// Builds the train/val/test datasets and the statistics needed to undo
/// the label scaling later.
pub fn prepare_datasets<S: ConditionStore + ?Sized>(
    store: &S,
    config: &PipelineConfig,
) -> Result<(SplitData, TrainStats), PrepError> {
    config.validate()?;

    let mut merged = merge_datasets(
        store,
        config.pressure_selection()?,
        config.experiment_type_selection()?,
    )?;
    if config.add_e0 {
        merged = merged.with_e0()?;
        debug!("➕ [Pipeline] Initial void ratio appended to contact parameters");
    }

    let pad_length = config.effective_pad_length();
    if pad_length > 0 {
        merged.inputs = pad_initial(&merged.inputs, pad_length)?;
        merged.outputs = pad_initial(&merged.outputs, pad_length)?;
        info!("⏪ [Pipeline] Sequences padded by {} steps", pad_length);
    }

    let split_data = make_splits(
        &merged,
        config.train_frac,
        config.val_frac,
        config.seed,
        config.test_slice,
    )?;

    let (split_data, mean, std) = if config.standardize_outputs {
        let (scaled, scaling) = standardize_outputs(split_data)?;
        (scaled, scaling.mean, scaling.std)
    } else {
        (split_data, Vec::new(), Vec::new())
    };

    let dimensions = Dimensions::of(&split_data.train);
    let stats = TrainStats {
        mean,
        std,
        window: config.use_windows.then(|| config.window_spec()),
        pad_length,
        sequence_length: dimensions.sequence_length,
        dimensions,
        contact_columns: merged.schema.names(),
        created_at: Utc::now(),
    };
    Ok((split_data, stats))
}

/// Windows every split. Each split shuffles with its own RNG derived from
/// the config seed, so the output is reproducible.
pub fn prepare_windows(
    split_data: &SplitData,
    config: &PipelineConfig,
) -> Result<BTreeMap<SplitName, Windows>, PrepError> {
    let spec = config.window_spec();
    spec.validate()?;

    let mut windows = BTreeMap::new();
    for (index, (name, split)) in split_data.iter().enumerate() {
        let inputs = if config.concat_contacts {
            concatenate_constants(&split.load_sequence, &split.contact_parameters)?
        } else {
            split.load_sequence.clone()
        };

        let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index as u64 + 1));
        let split_windows = sliding_windows(&inputs, &split.labels, spec, &mut rng)?;
        info!("🪟 [Pipeline] {}: {} windows of {} steps × {} features",
              name, split_windows.len(), spec.window_size, split_windows.inputs.dim().2);
        windows.insert(name, split_windows);
    }
    Ok(windows)
}
