//! Runs the whole pipeline for one parameter point: network, demand,
//! simulation and result extraction.

use anyhow::{ensure, Context, Result};
use log::{debug, info, warn};
use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use super::paths::ScenarioPaths;
use super::results::{parse_results, SimulationResult};
use super::sumo_home::SumoHome;
use crate::demand::{write_additional, RandomTrips, TripFiles, VehicleType};
use crate::network::{generate_grid, write_plain_xml, GridNetwork, GridParams, NetConvert};
use crate::tools::describe;
use crate::traci::{Connection, TraciError};

/// Id of the single vehicle type the grid experiments use
pub const VEHICLE_TYPE_ID: &str = "veh_passenger";

/// Settings that stay fixed across the runs of an experiment
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Run `sumo-gui` instead of `sumo`
    pub show_gui: bool,
    pub seed: u64,
    /// Milliseconds between steps, only useful with the GUI
    pub step_delay: u32,
    pub begin_time: f64,
    pub end_time: f64,
    pub trips_period: f64,
    pub trips_fringe_factor: f64,
    pub trips_binomial: u32,
    pub trips_use_binomial: bool,
    /// Interpreter used for SUMO's python tools
    pub python: String,
    /// How many times to try reaching a freshly started simulator
    pub connect_attempts: u32,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            show_gui: false,
            seed: 42,
            step_delay: 0,
            begin_time: 0.0,
            end_time: 3600.0,
            trips_period: 10.0,
            trips_fringe_factor: 10.0,
            trips_binomial: 1,
            trips_use_binomial: true,
            python: "python".to_string(),
            connect_attempts: 60,
        }
    }
}

pub struct Simulator {
    pub config: SimulatorConfig,
    pub sumo_home: SumoHome,
    pub paths: ScenarioPaths,
}

impl Simulator {
    pub fn new(config: SimulatorConfig, sumo_home: SumoHome, paths: ScenarioPaths) -> Result<Self> {
        paths.create_dirs()?;
        Ok(Self {
            config,
            sumo_home,
            paths,
        })
    }

    fn sumo_binary(&self) -> PathBuf {
        self.sumo_home
            .binary(if self.config.show_gui { "sumo-gui" } else { "sumo" })
    }

    /// Generates the grid, writes its plain XML and converts it into the
    /// network file
    pub fn generate_network(&self, params: &GridParams) -> Result<GridNetwork> {
        let network = generate_grid(params)?;
        write_plain_xml(&network, params, self.paths.plain_xml_files())?;
        info!(
            "Wrote {} nodes and {} edges to {}",
            network.node_count(),
            network.edge_count(),
            self.paths.plain_xml_dir.display()
        );

        clear_output(&self.paths.net_file)?;
        NetConvert {
            binary: self.sumo_home.binary("netconvert"),
            node_files: self.paths.nodes_file.clone(),
            edge_files: self.paths.edges_file.clone(),
            type_files: self.paths.edge_types_file.clone(),
            output_file: self.paths.net_file.clone(),
        }
        .run()?;
        require_output(&self.paths.net_file, "netconvert")?;
        Ok(network)
    }

    /// Writes the vehicle type and generates random trips using it
    pub fn generate_demand(&self, vehicle_type: &VehicleType) -> Result<()> {
        write_additional(&self.paths.additional_file, std::slice::from_ref(vehicle_type))?;
        clear_output(&self.paths.trips_file)?;
        clear_output(&self.paths.routes_file)?;

        let trips = RandomTrips {
            begin: self.config.begin_time,
            end: self.config.end_time,
            period: self.config.trips_period,
            binomial: self.config.trips_binomial,
            use_binomial: self.config.trips_use_binomial,
            fringe_factor: self.config.trips_fringe_factor,
            seed: Some(self.config.seed),
            ..RandomTrips::new(vehicle_type.id.clone(), vehicle_type.vehicle_class)
        };
        trips.run(&self.config.python, &self.trip_files())?;
        require_output(&self.paths.routes_file, "randomTrips.py")
    }

    pub fn trip_files(&self) -> TripFiles {
        TripFiles {
            script: self.sumo_home.random_trips_script(),
            net_file: self.paths.net_file.clone(),
            trips_file: self.paths.trips_file.clone(),
            routes_file: self.paths.routes_file.clone(),
            additional_file: self.paths.additional_file.clone(),
        }
    }

    /// Simulator flags for a run on the generated grid
    pub fn grid_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--net-file".into(),
            self.paths.net_file.clone().into(),
            "--route-files".into(),
            self.paths.routes_file.clone().into(),
        ];
        args.extend(self.common_args());
        if self.config.show_gui {
            if let Some(settings) = self.paths.gui_settings() {
                args.push("--gui-settings-file".into());
                args.push(settings.into());
            }
        }
        let outputs: [OsString; 6] = [
            "--tripinfo-output".into(),
            self.paths.trip_info_file.clone().into(),
            "--statistics-output".into(),
            self.paths.statistics_file.clone().into(),
            "--emission-output".into(),
            self.paths.emissions_file.clone().into(),
        ];
        args.extend(outputs);
        args
    }

    fn common_args(&self) -> Vec<OsString> {
        vec![
            "--start".into(),
            "--seed".into(),
            self.config.seed.to_string().into(),
            "--delay".into(),
            self.config.step_delay.to_string().into(),
            "--quit-on-end".into(),
        ]
    }

    /// Runs the full pipeline for one grid and vehicle configuration
    pub fn simulate(&self, grid: &GridParams, vehicle_type: &VehicleType) -> Result<SimulationResult> {
        self.generate_network(grid)?;
        self.generate_demand(vehicle_type)?;

        for report in [
            &self.paths.emissions_file,
            &self.paths.statistics_file,
            &self.paths.trip_info_file,
        ] {
            clear_output(report)?;
        }
        let steps = self.run_sumo(self.grid_args())?;
        info!("Simulation finished after {} steps", steps);
        require_output(&self.paths.emissions_file, "sumo")?;
        require_output(&self.paths.statistics_file, "sumo")?;

        parse_results(&self.paths.emissions_file, &self.paths.statistics_file)
    }

    /// Steps an existing `.sumocfg` scenario (e.g. one imported from
    /// OpenStreetMap) to completion, returning the number of steps
    pub fn run_config(&self, config_file: &Path) -> Result<u64> {
        let mut args: Vec<OsString> = vec!["--configuration-file".into(), config_file.into()];
        args.extend(self.common_args());
        self.run_sumo(args)
    }

    /// Starts the simulator with remote control enabled, steps it until
    /// nothing is left to simulate and shuts it down
    fn run_sumo(&self, args: Vec<OsString>) -> Result<u64> {
        let port = free_port()?;
        let mut command = Command::new(self.sumo_binary());
        command
            .args(args)
            .arg("--remote-port")
            .arg(port.to_string())
            .stdin(Stdio::null());
        info!("Starting {}", describe(&command));

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to start {}", self.sumo_binary().display()))?;

        let result = self.drive(port);
        if result.is_err() {
            // The simulator may still be waiting for a client
            if let Err(e) = child.kill() {
                debug!("Couldn't kill simulator: {}", e);
            }
        }
        wait_for_exit(&mut child);
        result
    }

    fn drive(&self, port: u16) -> Result<u64> {
        let mut connection: Connection<TcpStream> =
            Connection::connect(port, self.config.connect_attempts, Duration::from_secs(1))?;
        let (api_version, version) = connection.get_version()?;
        info!("Simulator {} (TraCI API {})", version, api_version);

        let steps = run_until_empty(&mut connection)?;
        connection.close()?;
        Ok(steps)
    }
}

/// Steps the simulation while vehicles are still running or waiting to
/// depart. Returns the number of steps taken.
pub fn run_until_empty<S: Read + Write>(connection: &mut Connection<S>) -> Result<u64, TraciError> {
    let mut step = 0;
    while connection.min_expected_number()? > 0 {
        connection.simulation_step(0.0)?;
        debug!("step {}", step);
        step += 1;
    }
    Ok(step)
}

/// Deletes a previous run's copy of a file a tool is about to write
fn clear_output(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Couldn't remove {}", path.display())),
    }
}

fn require_output(path: &Path, tool: &str) -> Result<()> {
    ensure!(path.is_file(), "{} did not produce {}", tool, path.display());
    Ok(())
}

fn free_port() -> Result<u16> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .context("Couldn't find a free port for the simulator")?;
    Ok(listener.local_addr()?.port())
}

fn wait_for_exit(child: &mut Child) {
    match child.wait() {
        Ok(status) if !status.success() => warn!("Simulator exited with {}", status),
        Ok(_) => {}
        Err(e) => warn!("Couldn't wait for simulator: {}", e),
    }
}
