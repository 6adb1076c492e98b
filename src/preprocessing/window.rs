// projeto: triaxial_prep
// file: src/preprocessing/window.rs
// Sliding windows: many (window, future label) pairs from each sequence

use log::{debug, warn};
use ndarray::{s, Array2, Array3, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::preprocessing::utils::PrepError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub window_size: usize,
    pub window_step: usize,
    /// Gap between the window's exclusive end and the label timestep.
    /// With 1 the window `[s, s + size)` is labelled with step `s + size + 1`.
    pub label_offset: usize,
}

impl Default for WindowSpec {
    fn default() -> Self {
        WindowSpec { window_size: 20, window_step: 5, label_offset: 1 }
    }
}

impl WindowSpec {
    pub fn validate(&self) -> Result<(), PrepError> {
        if self.window_size == 0 {
            return Err(PrepError::InvalidConfig("window_size must be greater than zero".to_string()));
        }
        if self.window_step == 0 {
            return Err(PrepError::InvalidConfig("window_step must be greater than zero".to_string()));
        }
        if self.window_size.checked_add(self.label_offset).is_none() {
            return Err(PrepError::InvalidConfig(format!(
                "window_size {} + label_offset {} overflows",
                self.window_size, self.label_offset
            )));
        }
        Ok(())
    }

    /// Saturates instead of overflowing; a saturated index lies past any sequence.
    pub fn label_index(&self, start: usize) -> usize {
        start.saturating_add(self.window_size).saturating_add(self.label_offset)
    }

    /// Window starts whose label still lies inside a sequence of `sequence_length` steps.
    pub fn start_offsets(&self, sequence_length: usize) -> Vec<usize> {
        (0..sequence_length)
            .step_by(self.window_step.max(1))
            .take_while(|&start| self.label_index(start) < sequence_length)
            .collect()
    }
}

/// Flat batch of windows; row `i` of `inputs` is labelled by row `i` of `labels`.
#[derive(Debug, Clone, PartialEq)]
pub struct Windows {
    /// windows × window_size × input features
    pub inputs: Array3<f64>,
    /// windows × output features
    pub labels: Array2<f64>,
}

impl Windows {
    pub fn len(&self) -> usize {
        self.labels.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Applies one random permutation to inputs and labels together.
    pub fn shuffled<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        Windows {
            inputs: self.inputs.select(Axis(0), &order),
            labels: self.labels.select(Axis(0), &order),
        }
    }
}

/// Cuts every sequence into windows of `spec.window_size` steps taken every
/// `spec.window_step` steps, each paired with the output at
/// `spec.label_index(start)`, then shuffles the whole batch.
///
/// Produces `samples × spec.start_offsets(T).len()` windows.
pub fn sliding_windows<R: Rng + ?Sized>(
    inputs: &Array3<f64>,
    outputs: &Array3<f64>,
    spec: WindowSpec,
    rng: &mut R,
) -> Result<Windows, PrepError> {
    spec.validate()?;
    let (n, t, f_in) = inputs.dim();
    let (n_out, t_out, f_out) = outputs.dim();
    if n != n_out || t != t_out {
        return Err(PrepError::ShapeMismatch(format!(
            "inputs are {}×{} (samples × steps), outputs are {}×{}",
            n, t, n_out, t_out
        )));
    }

    let starts = spec.start_offsets(t);
    if starts.is_empty() {
        warn!("⚠️ [Window] Sequence length {} too short for window {} + label offset {}",
              t, spec.window_size, spec.label_offset);
    }

    // Offset-major: all samples for the first start, then the next start.
    let blocks: Vec<(Array3<f64>, Array2<f64>)> = starts
        .par_iter()
        .map(|&start| {
            let window = inputs.slice(s![.., start..start + spec.window_size, ..]).to_owned();
            let label = outputs.slice(s![.., spec.label_index(start), ..]).to_owned();
            (window, label)
        })
        .collect();

    let total = n * starts.len();
    let mut window_inputs = Array3::zeros((total, spec.window_size, f_in));
    let mut window_labels = Array2::zeros((total, f_out));
    for (block, (window, label)) in blocks.iter().enumerate() {
        let rows = block * n..(block + 1) * n;
        window_inputs.slice_mut(s![rows.clone(), .., ..]).assign(window);
        window_labels.slice_mut(s![rows, ..]).assign(label);
    }

    debug!("🪟 [Window] {} samples × {} offsets = {} windows", n, starts.len(), total);
    Ok(Windows { inputs: window_inputs, labels: window_labels }.shuffled(rng))
}
