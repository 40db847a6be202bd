//! Random trip generation through SUMO's bundled `randomTrips.py`

use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use crate::network::VehicleClass;
use crate::tools::run_tool;

/// Options for one run of `randomTrips.py` producing trips of a single
/// vehicle type.
///
/// To let n vehicles depart between t0 and t1, use begin t0, end t1 and
/// period (t1 - t0) / n.
#[derive(Debug, Clone)]
pub struct RandomTrips {
    /// Vehicle type id, e.g. `veh_passenger`
    pub vehicle_type: String,
    pub vehicle_class: VehicleClass,
    pub begin: f64,
    pub end: f64,
    /// Arrival rate is 1/period per second
    pub period: f64,
    /// Departures per second are drawn from Binomial(n, period/n)
    pub binomial: u32,
    pub use_binomial: bool,
    /// Weight of edges without successor or predecessor as trip endpoints
    pub fringe_factor: f64,
    /// `None` leaves seeding to the tool
    pub seed: Option<u64>,
}

impl RandomTrips {
    pub fn new(vehicle_type: impl Into<String>, vehicle_class: VehicleClass) -> Self {
        Self {
            vehicle_type: vehicle_type.into(),
            vehicle_class,
            begin: 0.0,
            end: 3600.0,
            period: 10.0,
            binomial: 1,
            use_binomial: true,
            fringe_factor: 10.0,
            seed: None,
        }
    }
}

/// Where `randomTrips.py` reads and writes
#[derive(Debug, Clone)]
pub struct TripFiles {
    pub script: PathBuf,
    pub net_file: PathBuf,
    pub trips_file: PathBuf,
    pub routes_file: PathBuf,
    pub additional_file: PathBuf,
}

impl RandomTrips {
    /// Arguments following the script path
    pub fn args(&self, files: &TripFiles) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--net-file".into(),
            files.net_file.clone().into(),
            "--output-trip-file".into(),
            files.trips_file.clone().into(),
            "--route-file".into(),
            files.routes_file.clone().into(),
            "--begin".into(),
            self.begin.to_string().into(),
            "--end".into(),
            self.end.to_string().into(),
            "--allow-fringe".into(),
            "--fringe-factor".into(),
            self.fringe_factor.to_string().into(),
            "--validate".into(),
            "--additional-files".into(),
            files.additional_file.clone().into(),
            "--trip-attributes".into(),
            format!("type=\"{}\"", self.vehicle_type).into(),
            "--edge-permission".into(),
            self.vehicle_class.tag().into(),
            "--period".into(),
            self.period.to_string().into(),
        ];

        if let Some(seed) = self.seed {
            args.push("--seed".into());
            args.push(seed.to_string().into());
        }
        if self.use_binomial {
            args.push("--binomial".into());
            args.push(self.binomial.to_string().into());
        }
        args
    }

    pub fn command(&self, python: &str, files: &TripFiles) -> Command {
        let mut command = Command::new(python);
        command.arg(&files.script).args(self.args(files));
        command
    }

    pub fn run(&self, python: &str, files: &TripFiles) -> Result<ExitStatus> {
        run_tool(&mut self.command(python, files))
    }
}
