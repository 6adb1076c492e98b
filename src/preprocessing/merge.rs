// projeto: triaxial_prep
// file: src/preprocessing/merge.rs
// Merging condition batches into one dataset with an explicit contact schema

use log::{debug, info};
use ndarray::{concatenate, s, Array2, Array3, ArrayView2, ArrayView3, Axis};
use serde::{Deserialize, Serialize};

use crate::preprocessing::condition::{selected_conditions, Condition, ExperimentType, Pressure, Selection};
use crate::preprocessing::store::{ConditionArrays, ConditionStore};
use crate::preprocessing::utils::PrepError;

/// Names of the material parameters stored per sample.
pub const BASE_CONTACT_NAMES: [&str; 5] = ["E", "v", "kr", "eta", "mu"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactColumn {
    Base(usize),
    /// Confining pressure in MPa, present when every pressure is merged.
    Pressure,
    /// 1.0 for drained, 0.0 for undrained, present when both types are merged.
    Drained,
    /// Initial void ratio, `inputs[:, 0, 0]`.
    E0,
}

/// Column layout of the contact-parameter matrix.
///
/// Optional columns always sit after the base parameters in the order
/// pressure, drained, e0. Which of them exist is fixed when the schema is
/// built, so every position is known before any data is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSchema {
    pub base_width: usize,
    pub pressure: bool,
    pub drained: bool,
    pub e0: bool,
}

impl ContactSchema {
    pub fn new(base_width: usize, pressure: bool, drained: bool, e0: bool) -> Self {
        ContactSchema { base_width, pressure, drained, e0 }
    }

    pub fn width(&self) -> usize {
        self.base_width + self.pressure as usize + self.drained as usize + self.e0 as usize
    }

    pub fn columns(&self) -> Vec<ContactColumn> {
        let mut columns: Vec<ContactColumn> = (0..self.base_width).map(ContactColumn::Base).collect();
        if self.pressure {
            columns.push(ContactColumn::Pressure);
        }
        if self.drained {
            columns.push(ContactColumn::Drained);
        }
        if self.e0 {
            columns.push(ContactColumn::E0);
        }
        columns
    }

    pub fn position(&self, column: ContactColumn) -> Option<usize> {
        self.columns().iter().position(|c| *c == column)
    }

    pub fn names(&self) -> Vec<String> {
        self.columns()
            .into_iter()
            .map(|column| match column {
                ContactColumn::Base(i) => BASE_CONTACT_NAMES
                    .get(i)
                    .map(|name| name.to_string())
                    .unwrap_or_else(|| format!("contact_{}", i)),
                ContactColumn::Pressure => "pressure".to_string(),
                ContactColumn::Drained => "drained".to_string(),
                ContactColumn::E0 => "e0".to_string(),
            })
            .collect()
    }

    /// Builds the contact block of one condition. The `e0` column is filled
    /// from `inputs` when the schema carries it.
    fn fill(
        &self,
        base: ArrayView2<f64>,
        inputs: ArrayView3<f64>,
        condition: &Condition,
    ) -> Result<Array2<f64>, PrepError> {
        if base.ncols() != self.base_width {
            return Err(PrepError::ShapeMismatch(format!(
                "{}: {} contact parameters, expected {}",
                condition, base.ncols(), self.base_width
            )));
        }
        let mut block = Array2::zeros((base.nrows(), self.width()));
        block.slice_mut(s![.., ..self.base_width]).assign(&base);

        if let Some(p) = self.position(ContactColumn::Pressure) {
            block.column_mut(p).fill(condition.pressure.mpa());
        }
        if let Some(d) = self.position(ContactColumn::Drained) {
            let flag = if condition.experiment_type.is_drained() { 1.0 } else { 0.0 };
            block.column_mut(d).fill(flag);
        }
        if let Some(e) = self.position(ContactColumn::E0) {
            block.column_mut(e).assign(&initial_values(inputs)?);
        }
        Ok(block)
    }
}

/// All selected conditions concatenated along the sample axis.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedData {
    pub inputs: Array3<f64>,
    pub outputs: Array3<f64>,
    pub contacts: Array2<f64>,
    pub schema: ContactSchema,
    /// Sample count contributed by each condition, in merge order.
    pub sources: Vec<(Condition, usize)>,
}

impl MergedData {
    pub fn num_samples(&self) -> usize {
        self.inputs.dim().0
    }

    /// Appends the initial void ratio as the last contact column.
    pub fn with_e0(mut self) -> Result<Self, PrepError> {
        if self.schema.e0 {
            return Ok(self);
        }
        self.contacts = add_e0(&self.contacts, &self.inputs)?;
        self.schema.e0 = true;
        Ok(self)
    }
}

/// First timestep of load feature 0 for every sample.
fn initial_values(inputs: ArrayView3<f64>) -> Result<ndarray::Array1<f64>, PrepError> {
    let (_, t, f) = inputs.dim();
    if t == 0 || f == 0 {
        return Err(PrepError::ShapeMismatch(
            "cannot read the initial void ratio from an empty input sequence".to_string(),
        ));
    }
    Ok(inputs.slice(s![.., 0, 0]).to_owned())
}

/// Appends `inputs[:, 0, 0]` (the initial void ratio) as an extra contact column.
pub fn add_e0(contacts: &Array2<f64>, inputs: &Array3<f64>) -> Result<Array2<f64>, PrepError> {
    if contacts.nrows() != inputs.dim().0 {
        return Err(PrepError::ShapeMismatch(format!(
            "contacts have {} samples, inputs have {}",
            contacts.nrows(),
            inputs.dim().0
        )));
    }
    let e0 = initial_values(inputs.view())?.insert_axis(Axis(1));
    Ok(concatenate(Axis(1), &[contacts.view(), e0.view()])?)
}

/// Loads every selected condition and concatenates them in enumeration order.
///
/// Selecting "All" for pressure or experiment type adds that condition's
/// value as a constant contact column, so merged samples stay distinguishable.
pub fn merge_datasets<S: ConditionStore + ?Sized>(
    store: &S,
    pressure: Selection<Pressure>,
    experiment_type: Selection<ExperimentType>,
) -> Result<MergedData, PrepError> {
    let conditions = selected_conditions(pressure, experiment_type);
    info!("🔗 [Merge] Pressure: {} | Type: {} | {} condition(s)",
          pressure, experiment_type, conditions.len());

    // Fail on any absent condition before reading arrays.
    if let Some(missing) = conditions.iter().find(|c| !store.contains(c)) {
        return Err(PrepError::MissingCondition { key: missing.key() });
    }

    let mut batches: Vec<(Condition, ConditionArrays)> = Vec::with_capacity(conditions.len());
    for condition in conditions {
        let arrays = store.load(&condition)?;
        debug!("   ├── {}: {} samples", condition, arrays.num_samples());
        batches.push((condition, arrays));
    }

    let (first_condition, first) = match batches.first() {
        Some(batch) => batch,
        None => return Err(PrepError::InvalidConfig("no conditions selected".to_string())),
    };
    let (_, seq_len, n_load) = first.inputs.dim();
    let (_, _, n_labels) = first.outputs.dim();

    for (condition, arrays) in &batches[1..] {
        let (_, t, f_in) = arrays.inputs.dim();
        let (_, _, f_out) = arrays.outputs.dim();
        if t != seq_len {
            return Err(PrepError::ShapeMismatch(format!(
                "{}: sequence length {} differs from {} in {}",
                condition, t, seq_len, first_condition
            )));
        }
        if f_in != n_load || f_out != n_labels {
            return Err(PrepError::ShapeMismatch(format!(
                "{}: {} load / {} output features, expected {} / {} as in {}",
                condition, f_in, f_out, n_load, n_labels, first_condition
            )));
        }
    }

    let schema = ContactSchema::new(
        first.contact_params.ncols(),
        pressure.is_all(),
        experiment_type.is_all(),
        false,
    );

    let mut contact_blocks = Vec::with_capacity(batches.len());
    for (condition, arrays) in &batches {
        contact_blocks.push(schema.fill(arrays.contact_params.view(), arrays.inputs.view(), condition)?);
    }

    let input_views: Vec<_> = batches.iter().map(|(_, a)| a.inputs.view()).collect();
    let output_views: Vec<_> = batches.iter().map(|(_, a)| a.outputs.view()).collect();
    let contact_views: Vec<_> = contact_blocks.iter().map(|c| c.view()).collect();

    let merged = MergedData {
        inputs: concatenate(Axis(0), &input_views)?,
        outputs: concatenate(Axis(0), &output_views)?,
        contacts: concatenate(Axis(0), &contact_views)?,
        schema,
        sources: batches.iter().map(|(c, a)| (*c, a.num_samples())).collect(),
    };

    info!("✅ [Merge] {} samples | sequence length {} | {} contact columns",
          merged.num_samples(), seq_len, schema.width());
    Ok(merged)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::preprocessing::condition::{EXPERIMENT_TYPES, PRESSURES};
    use crate::preprocessing::store::NpyStore;
    use tempfile::{tempdir, TempDir};

    /// Arrays whose values encode (condition, sample, step, feature), so
    /// merged rows can be traced back to their origin.
    pub(crate) fn condition_arrays(tag: usize, n: usize, t: usize) -> ConditionArrays {
        ConditionArrays {
            contact_params: Array2::from_shape_fn((n, 5), |(i, j)| (tag * 1000 + i * 10 + j) as f64),
            inputs: Array3::from_shape_fn((n, t, 3), |(i, j, k)| {
                0.5 + tag as f64 + i as f64 * 0.1 + j as f64 * 0.001 + k as f64 * 0.0001
            }),
            outputs: Array3::from_shape_fn((n, t, 7), |(i, j, k)| {
                (tag * 10_000 + i * 100 + j) as f64 + k as f64 * 0.5
            }),
        }
    }

    /// Store with all six conditions; condition `c` holds `2 + c` samples.
    pub(crate) fn full_store(t: usize) -> (TempDir, NpyStore) {
        let dir = tempdir().unwrap();
        let store = NpyStore::create(dir.path()).unwrap();
        let mut tag = 0;
        for p in PRESSURES {
            for e in EXPERIMENT_TYPES {
                store.insert(&Condition::new(p, e), &condition_arrays(tag, 2 + tag, t)).unwrap();
                tag += 1;
            }
        }
        (dir, store)
    }

    #[test]
    fn test_single_condition_is_identity() {
        let (_dir, store) = full_store(8);
        let condition = Condition::new(Pressure(0.5), ExperimentType::Undrained);
        let raw = store.load(&condition).unwrap();

        let merged = merge_datasets(
            &store,
            Selection::One(Pressure(0.5)),
            Selection::One(ExperimentType::Undrained),
        )
        .unwrap();

        assert_eq!(merged.inputs, raw.inputs);
        assert_eq!(merged.outputs, raw.outputs);
        assert_eq!(merged.contacts, raw.contact_params);
        assert_eq!(merged.schema.width(), 5);
        assert_eq!(merged.sources, vec![(condition, raw.num_samples())]);
    }

    #[test]
    fn test_all_conditions_append_two_columns() {
        let (_dir, store) = full_store(8);
        let merged = merge_datasets(&store, Selection::All, Selection::All).unwrap();

        let expected_total: usize = (0..6).map(|tag| 2 + tag).sum();
        assert_eq!(merged.num_samples(), expected_total);
        assert_eq!(merged.contacts.ncols(), 7);
        assert_eq!(merged.schema.names(), vec!["E", "v", "kr", "eta", "mu", "pressure", "drained"]);

        let mut row = 0;
        for (condition, count) in &merged.sources {
            for _ in 0..*count {
                assert_eq!(merged.contacts[[row, 5]], condition.pressure.mpa());
                let flag = if condition.experiment_type.is_drained() { 1.0 } else { 0.0 };
                assert_eq!(merged.contacts[[row, 6]], flag);
                row += 1;
            }
        }
        assert_eq!(row, expected_total);
    }

    #[test]
    fn test_all_pressures_single_type_appends_one_column() {
        let (_dir, store) = full_store(8);
        let merged = merge_datasets(&store, Selection::All, Selection::One(ExperimentType::Drained)).unwrap();
        assert_eq!(merged.contacts.ncols(), 6);
        assert_eq!(merged.schema.position(ContactColumn::Pressure), Some(5));
        assert_eq!(merged.schema.position(ContactColumn::Drained), None);
        // 0.2 drained (tag 0), 0.5 drained (tag 2), 1.0 drained (tag 4)
        assert_eq!(merged.num_samples(), 2 + 4 + 6);
        assert_eq!(merged.contacts[[0, 5]], 0.2);
        assert_eq!(merged.contacts[[merged.num_samples() - 1, 5]], 1.0);
    }

    #[test]
    fn test_missing_condition_fails() {
        let dir = tempdir().unwrap();
        let store = NpyStore::create(dir.path()).unwrap();
        store
            .insert(&Condition::new(Pressure(0.2), ExperimentType::Drained), &condition_arrays(0, 3, 5))
            .unwrap();

        let result = merge_datasets(&store, Selection::One(Pressure(0.2)), Selection::All);
        match result {
            Err(PrepError::MissingCondition { key }) => assert_eq!(key, "0.2e6/undrained"),
            other => panic!("expected MissingCondition, got {:?}", other),
        }
    }

    #[test]
    fn test_sequence_length_mismatch_fails() {
        let dir = tempdir().unwrap();
        let store = NpyStore::create(dir.path()).unwrap();
        store
            .insert(&Condition::new(Pressure(0.2), ExperimentType::Drained), &condition_arrays(0, 3, 5))
            .unwrap();
        store
            .insert(&Condition::new(Pressure(0.2), ExperimentType::Undrained), &condition_arrays(1, 3, 6))
            .unwrap();

        let result = merge_datasets(&store, Selection::One(Pressure(0.2)), Selection::All);
        assert!(matches!(result, Err(PrepError::ShapeMismatch(_))));
    }

    /// Store holding 0.2e6/drained as built by `condition_arrays` and
    /// 0.2e6/undrained as given.
    fn store_with_undrained(undrained: ConditionArrays) -> (TempDir, NpyStore) {
        let dir = tempdir().unwrap();
        let store = NpyStore::create(dir.path()).unwrap();
        store
            .insert(&Condition::new(Pressure(0.2), ExperimentType::Drained), &condition_arrays(0, 3, 5))
            .unwrap();
        store
            .insert(&Condition::new(Pressure(0.2), ExperimentType::Undrained), &undrained)
            .unwrap();
        (dir, store)
    }

    #[test]
    fn test_output_channel_mismatch_fails() {
        let mut undrained = condition_arrays(1, 3, 5);
        undrained.outputs = Array3::zeros((3, 5, 6));
        let (_dir, store) = store_with_undrained(undrained);

        let result = merge_datasets(&store, Selection::One(Pressure(0.2)), Selection::All);
        match result {
            Err(PrepError::ShapeMismatch(msg)) => assert!(msg.contains("0.2e6/undrained"), "{}", msg),
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_contact_width_mismatch_fails() {
        let mut undrained = condition_arrays(1, 3, 5);
        undrained.contact_params = Array2::ones((3, 6));
        let (_dir, store) = store_with_undrained(undrained);

        let result = merge_datasets(&store, Selection::One(Pressure(0.2)), Selection::All);
        match result {
            Err(PrepError::ShapeMismatch(msg)) => assert!(msg.contains("6 contact parameters"), "{}", msg),
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_add_e0() {
        let arrays = condition_arrays(1, 3, 4);
        let with_e0 = add_e0(&arrays.contact_params, &arrays.inputs).unwrap();
        assert_eq!(with_e0.ncols(), 6);
        for i in 0..3 {
            assert_eq!(with_e0[[i, 5]], arrays.inputs[[i, 0, 0]]);
        }
    }

    #[test]
    fn test_with_e0_extends_schema() {
        let (_dir, store) = full_store(4);
        let merged = merge_datasets(&store, Selection::All, Selection::All)
            .unwrap()
            .with_e0()
            .unwrap();
        assert_eq!(merged.contacts.ncols(), 8);
        assert_eq!(merged.schema.position(ContactColumn::E0), Some(7));
        assert_eq!(merged.contacts[[0, 7]], merged.inputs[[0, 0, 0]]);
    }

    #[test]
    fn test_schema_fill_with_e0() {
        let arrays = condition_arrays(0, 2, 3);
        let schema = ContactSchema::new(5, false, true, true);
        let condition = Condition::new(Pressure(0.2), ExperimentType::Undrained);
        let block = schema
            .fill(arrays.contact_params.view(), arrays.inputs.view(), &condition)
            .unwrap();
        assert_eq!(block.ncols(), 7);
        assert_eq!(block[[1, 5]], 0.0);
        assert_eq!(block[[1, 6]], arrays.inputs[[1, 0, 0]]);
    }
}
