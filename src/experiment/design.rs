//! Evaluating design points and recording them for the optimizer

use anyhow::{bail, Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::io::Write;

use super::space::{
    DesignPoint, ParameterSpace, ACCEL, EDGE_LENGTH, EDGE_MAX_SPEED, GRID_SIZE, MAX_SPEED,
    NUMBER_OF_LANES,
};
use crate::demand::VehicleType;
use crate::network::GridParams;
use crate::simulation::{SimulationResult, Simulator};

/// Uniform random sampling of a space, reproducible from its seed
pub struct RandomDesign {
    space: ParameterSpace,
    rng: StdRng,
}

impl RandomDesign {
    pub fn new(space: ParameterSpace, seed: u64) -> Self {
        Self {
            space,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn points(&mut self, count: usize) -> Result<Vec<DesignPoint>> {
        (0..count).map(|_| self.space.sample(&mut self.rng)).collect()
    }
}

/// Applies a point's values on top of base grid and vehicle settings.
/// Names the grid experiments don't know are rejected.
pub fn apply_point(
    point: &DesignPoint,
    grid: &GridParams,
    vehicle_type: &VehicleType,
) -> Result<(GridParams, VehicleType)> {
    let mut grid = grid.clone();
    let mut vehicle_type = vehicle_type.clone();

    for (name, &value) in &point.values {
        match name.as_str() {
            GRID_SIZE => {
                grid.grid_size = usize::try_from(whole(name, value)?)
                    .with_context(|| format!("{} {} is out of range", name, value))?
            }
            EDGE_MAX_SPEED => grid.edge_max_speed = value,
            EDGE_LENGTH => grid.edge_length = value,
            NUMBER_OF_LANES => {
                grid.number_of_lanes = u32::try_from(whole(name, value)?)
                    .with_context(|| format!("{} {} is out of range", name, value))?
            }
            MAX_SPEED => vehicle_type.max_speed = value,
            ACCEL => vehicle_type.accel = value,
            other => bail!("Unknown parameter {}", other),
        }
    }
    Ok((grid, vehicle_type))
}

fn whole(name: &str, value: f64) -> Result<u64> {
    if !value.is_finite() || value.fract() != 0.0 || value < 0.0 || value >= u64::MAX as f64 {
        bail!("{} must be a non-negative whole number, got {}", name, value);
    }
    Ok(value as u64)
}

/// Something that maps a design point to simulation outputs
pub trait Objective {
    fn evaluate(&mut self, point: &DesignPoint) -> Result<SimulationResult>;
}

/// Runs the grid pipeline for each point
pub struct GridObjective<'a> {
    pub simulator: &'a Simulator,
    pub grid: GridParams,
    pub vehicle_type: VehicleType,
}

impl Objective for GridObjective<'_> {
    fn evaluate(&mut self, point: &DesignPoint) -> Result<SimulationResult> {
        let (grid, vehicle_type) = apply_point(point, &self.grid, &self.vehicle_type)?;
        self.simulator.simulate(&grid, &vehicle_type)
    }
}

/// One line of the design output
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub inputs: DesignPoint,
    pub outputs: SimulationResult,
}

/// Evaluates every point in order, writing each evaluation as a JSON line
/// as soon as it is available
pub fn run_design<O: Objective, W: Write>(
    objective: &mut O,
    points: &[DesignPoint],
    out: &mut W,
) -> Result<Vec<Evaluation>> {
    let mut evaluations = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        info!("Evaluating point {}/{}", i + 1, points.len());
        let outputs = objective
            .evaluate(point)
            .with_context(|| format!("Evaluating point {}", i + 1))?;
        let evaluation = Evaluation {
            inputs: point.clone(),
            outputs,
        };
        serde_json::to_writer(&mut *out, &evaluation)?;
        writeln!(out)?;
        out.flush()?;
        evaluations.push(evaluation);
    }
    Ok(evaluations)
}
