// projeto: triaxial_prep
// file: src/preprocessing/condition.rs
// Simulation conditions (confining pressure, drainage) and how they are selected

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::preprocessing::utils::PrepError;

/// Confining pressure in MPa. The store keys it as `{value}e6`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Pressure(pub f64);

/// Pressures present in the simulation campaign, in store enumeration order.
pub const PRESSURES: [Pressure; 3] = [Pressure(0.2), Pressure(0.5), Pressure(1.0)];

impl Pressure {
    pub fn mpa(self) -> f64 {
        self.0
    }

    /// Store group name, e.g. `0.2e6` or `1.0e6`.
    pub fn key(self) -> String {
        format!("{:?}e6", self.0)
    }
}

impl fmt::Display for Pressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for Pressure {
    type Err = PrepError;

    /// Accepts the store spelling (`0.2e6`, in Pa) or a bare MPa value (`0.2`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().parse().map_err(|_| {
            PrepError::InvalidConfig(format!("invalid pressure '{}'", s))
        })?;
        if !value.is_finite() || value <= 0.0 {
            return Err(PrepError::InvalidConfig(format!("pressure must be positive, got '{}'", s)));
        }
        let mpa = if value >= 1e3 { value / 1e6 } else { value };
        Ok(Pressure(mpa))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperimentType {
    Drained,
    Undrained,
}

/// Experiment types in store enumeration order.
pub const EXPERIMENT_TYPES: [ExperimentType; 2] = [ExperimentType::Drained, ExperimentType::Undrained];

impl ExperimentType {
    pub fn as_str(self) -> &'static str {
        match self {
            ExperimentType::Drained => "drained",
            ExperimentType::Undrained => "undrained",
        }
    }

    pub fn is_drained(self) -> bool {
        self == ExperimentType::Drained
    }
}

impl fmt::Display for ExperimentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentType {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drained" => Ok(ExperimentType::Drained),
            "undrained" => Ok(ExperimentType::Undrained),
            other => Err(PrepError::InvalidConfig(format!("unknown experiment type '{}'", other))),
        }
    }
}

/// One batch of simulations sharing pressure and drainage settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub pressure: Pressure,
    pub experiment_type: ExperimentType,
}

impl Condition {
    pub fn new(pressure: Pressure, experiment_type: ExperimentType) -> Self {
        Condition { pressure, experiment_type }
    }

    /// Hierarchical store key, `{pressure}e6/{experiment_type}`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.pressure.key(), self.experiment_type.as_str())
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Either a single value or every known value ("All").
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<T> {
    One(T),
    All,
}

impl<T: Copy> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Expands the selection against the full enumeration `known`.
    pub fn values(&self, known: &[T]) -> Vec<T> {
        match self {
            Selection::One(value) => vec![*value],
            Selection::All => known.to_vec(),
        }
    }
}

impl<T> FromStr for Selection<T>
where
    T: FromStr<Err = PrepError>,
{
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            Ok(Selection::One(s.parse()?))
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::One(value) => write!(f, "{}", value),
            Selection::All => f.write_str("All"),
        }
    }
}

/// Cartesian product of the selections, pressure-major.
pub fn selected_conditions(
    pressure: Selection<Pressure>,
    experiment_type: Selection<ExperimentType>,
) -> Vec<Condition> {
    let mut conditions = Vec::new();
    for p in pressure.values(&PRESSURES) {
        for t in experiment_type.values(&EXPERIMENT_TYPES) {
            conditions.push(Condition::new(p, t));
        }
    }
    conditions
}
