//! Parameter spaces explored by the experiments.
//!
//! The optimizer itself is external; these definitions only describe which
//! inputs it may vary and within which bounds.

use anyhow::{anyhow, bail, Result};
use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

pub const GRID_SIZE: &str = "gridSize";
pub const EDGE_MAX_SPEED: &str = "edgeMaxSpeed";
pub const MAX_SPEED: &str = "maxSpeed";
pub const EDGE_LENGTH: &str = "edgeLength";
pub const NUMBER_OF_LANES: &str = "numberOfLanes";
pub const ACCEL: &str = "accel";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Domain {
    Discrete { values: Vec<f64> },
    Continuous { min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(flatten)]
    pub domain: Domain,
}

impl Parameter {
    pub fn discrete(name: &str, values: Vec<f64>) -> Self {
        Self {
            name: name.to_string(),
            domain: Domain::Discrete { values },
        }
    }

    pub fn continuous(name: &str, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            domain: Domain::Continuous { min, max },
        }
    }

    /// The same kind of parameter, pinned to a single value
    pub fn locked(&self, value: f64) -> Self {
        match self.domain {
            Domain::Discrete { .. } => Self::discrete(&self.name, vec![value]),
            Domain::Continuous { .. } => Self::continuous(&self.name, value, value),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        match &self.domain {
            Domain::Discrete { values } => values.contains(&value),
            Domain::Continuous { min, max } => *min <= value && value <= *max,
        }
    }

    /// Draws a value uniformly from the domain. `None` when the domain is
    /// empty: no discrete values, or a continuous range with min > max.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Option<f64> {
        match &self.domain {
            Domain::Discrete { values } => values.choose(rng).copied(),
            Domain::Continuous { min, max } if min > max => None,
            Domain::Continuous { min, max } if min == max => Some(*min),
            Domain::Continuous { min, max } => Some(rng.random_range(*min..=*max)),
        }
    }
}

/// A named assignment of values to parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DesignPoint {
    pub values: BTreeMap<String, f64>,
}

impl DesignPoint {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn set(&mut self, name: &str, value: f64) {
        self.values.insert(name.to_string(), value);
    }
}

/// Which locked values the one-factor-at-a-time spaces use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfatVariant {
    Default,
    /// Locked at the optimum found for trip duration
    Time,
    /// Locked at the optimum found for CO2
    Co2,
}

impl OfatVariant {
    fn locked_value(self, name: &str) -> Result<f64> {
        Ok(match (self, name) {
            (_, GRID_SIZE) => 20.0,
            (_, EDGE_MAX_SPEED) => 25.0,
            (OfatVariant::Time, MAX_SPEED) => 7.315849,
            (_, MAX_SPEED) => 5.0,
            (_, EDGE_LENGTH) => 70.0,
            (_, NUMBER_OF_LANES) => 1.0,
            (_, ACCEL) => 1.5,
            (variant, other) => bail!("No locked value for {} in {:?}", other, variant),
        })
    }
}

/// One-factor-at-a-time space: a single parameter varies
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedSpace {
    /// Human readable name of the varying parameter
    pub name: String,
    pub space: ParameterSpace,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParameterSpace {
    pub parameters: Vec<Parameter>,
}

impl ParameterSpace {
    pub fn new(parameters: Vec<Parameter>) -> Self {
        Self { parameters }
    }

    /// The space the grid experiments search
    pub fn default_space() -> Self {
        Self::new(vec![
            Parameter::discrete(GRID_SIZE, (3..=20).map(f64::from).collect()),
            Parameter::continuous(EDGE_MAX_SPEED, 8.0, 25.0),
            Parameter::continuous(MAX_SPEED, 5.0, 27.0),
            Parameter::continuous(EDGE_LENGTH, 30.0, 70.0),
            Parameter::discrete(NUMBER_OF_LANES, vec![1.0, 2.0, 3.0]),
            Parameter::continuous(ACCEL, 1.5, 5.0),
        ])
    }

    /// One space per parameter of the default space, in which only that
    /// parameter varies and the rest are locked
    pub fn ofat(variant: OfatVariant) -> Result<Vec<NamedSpace>> {
        Self::default_space().ofat_spaces(variant)
    }

    /// One-factor-at-a-time spaces derived from this one
    pub fn ofat_spaces(&self, variant: OfatVariant) -> Result<Vec<NamedSpace>> {
        self.parameters
            .iter()
            .enumerate()
            .map(|(varying, parameter)| {
                let parameters = self
                    .parameters
                    .iter()
                    .enumerate()
                    .map(|(i, other)| {
                        if i == varying {
                            Ok(other.clone())
                        } else {
                            Ok(other.locked(variant.locked_value(&other.name)?))
                        }
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(NamedSpace {
                    name: display_name(&parameter.name).to_string(),
                    space: Self::new(parameters),
                })
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    pub fn dimensionality(&self) -> usize {
        self.parameters.len()
    }

    pub fn contains(&self, point: &DesignPoint) -> bool {
        self.parameters.iter().all(|parameter| {
            point
                .get(&parameter.name)
                .is_some_and(|value| parameter.contains(value))
        })
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<DesignPoint> {
        let mut point = DesignPoint::default();
        for parameter in &self.parameters {
            let value = parameter
                .sample(rng)
                .ok_or_else(|| anyhow!("Parameter {} has an empty domain", parameter.name))?;
            point.set(&parameter.name, value);
        }
        Ok(point)
    }
}

/// Name used on plot axes
pub fn display_name(name: &str) -> &str {
    match name {
        GRID_SIZE => "Grid Size",
        EDGE_MAX_SPEED => "Edge Max Speed (m/s)",
        MAX_SPEED => "Vehicle Max Speed (m/s)",
        EDGE_LENGTH => "Edge Length (m)",
        NUMBER_OF_LANES => "Number of Lanes",
        ACCEL => "Acceleration (m/s^2)",
        other => other,
    }
}
