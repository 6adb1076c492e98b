// projeto: triaxial_prep
// file: src/preprocessing/utils.rs
// Error handling and small numeric helpers shared by the pipeline stages

use ndarray::ShapeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Condition '{key}' not found in store")]
    MissingCondition { key: String },

    #[error("Degenerate output feature {feature}: train std is {std}")]
    DegenerateFeature { feature: usize, std: f64 },

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Split '{split}' has no samples")]
    EmptySplit { split: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("NPY error: {0}")]
    Npy(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<ShapeError> for PrepError {
    fn from(err: ShapeError) -> Self {
        PrepError::ShapeMismatch(err.to_string())
    }
}

impl From<serde_json::Error> for PrepError {
    fn from(err: serde_json::Error) -> Self {
        PrepError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PrepError {
    fn from(err: toml::de::Error) -> Self {
        PrepError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for PrepError {
    fn from(err: toml::ser::Error) -> Self {
        PrepError::Serialization(err.to_string())
    }
}

/// Checks that `value` is a usable fraction in `[0, 1]`.
pub fn check_fraction(name: &str, value: f64) -> Result<(), PrepError> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(PrepError::InvalidConfig(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Number of samples a fraction selects, truncated toward zero.
pub fn fraction_count(fraction: f64, total: usize) -> usize {
    (fraction * total as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_fraction() {
        assert!(check_fraction("train_frac", 0.0).is_ok());
        assert!(check_fraction("train_frac", 0.7).is_ok());
        assert!(check_fraction("train_frac", 1.0).is_ok());
        assert!(check_fraction("train_frac", -0.1).is_err());
        assert!(check_fraction("train_frac", 1.5).is_err());
        assert!(check_fraction("train_frac", f64::NAN).is_err());
    }

    #[test]
    fn test_fraction_count_truncates() {
        assert_eq!(fraction_count(0.7, 10), 7);
        assert_eq!(fraction_count(0.15, 10), 1);
        assert_eq!(fraction_count(0.15, 100), 15);
        assert_eq!(fraction_count(0.0, 50), 0);
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = PrepError::MissingCondition { key: "0.5e6/undrained".to_string() };
        assert!(err.to_string().contains("0.5e6/undrained"));

        let err = PrepError::DegenerateFeature { feature: 3, std: 0.0 };
        assert!(err.to_string().contains("feature 3"));
    }
}
