//! Driving the external simulator
//!
//! This module owns the scenario file layout, starts `sumo` as a
//! subprocess, steps it over TraCI until every vehicle has arrived and
//! reads back the reports it wrote.

mod driver;
mod paths;
mod results;
mod sumo_home;

pub use driver::{run_until_empty, Simulator, SimulatorConfig, VEHICLE_TYPE_ID};
pub use paths::ScenarioPaths;
pub use results::{
    parse_emissions, parse_results, parse_statistics, EmissionTotals, SimulationResult,
    TripStatistics,
};
pub use sumo_home::{SumoHome, SUMO_HOME_VAR};
