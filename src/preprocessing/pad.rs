// projeto: triaxial_prep
// file: src/preprocessing/pad.rs
// Time-axis reshaping: initial padding and broadcasting constants into sequences

use ndarray::{s, Array2, Array3};

use crate::preprocessing::utils::PrepError;

/// Prepends `pad_length` copies of timestep 0 along the time axis.
///
/// Lets a window-based model start predicting at the real sequence origin.
pub fn pad_initial(array: &Array3<f64>, pad_length: usize) -> Result<Array3<f64>, PrepError> {
    let (n, t, f) = array.dim();
    if pad_length == 0 {
        return Ok(array.clone());
    }
    if t == 0 {
        return Err(PrepError::ShapeMismatch(
            "cannot pad a sequence without timesteps".to_string(),
        ));
    }

    let mut padded = Array3::zeros((n, t + pad_length, f));
    let first = array.slice(s![.., 0, ..]);
    for step in 0..pad_length {
        padded.slice_mut(s![.., step, ..]).assign(&first);
    }
    padded.slice_mut(s![.., pad_length.., ..]).assign(array);
    Ok(padded)
}

/// Repeats each sample's contact parameters at every timestep and appends
/// them to the load features: (n, T, F) + (n, k) -> (n, T, F + k).
pub fn concatenate_constants(inputs: &Array3<f64>, contacts: &Array2<f64>) -> Result<Array3<f64>, PrepError> {
    let (n, t, f) = inputs.dim();
    let (n_c, k) = contacts.dim();
    if n != n_c {
        return Err(PrepError::ShapeMismatch(format!(
            "load sequence has {} samples, contact parameters have {}",
            n, n_c
        )));
    }

    let mut combined = Array3::zeros((n, t, f + k));
    combined.slice_mut(s![.., .., ..f]).assign(inputs);
    for step in 0..t {
        combined.slice_mut(s![.., step, f..]).assign(contacts);
    }
    Ok(combined)
}
