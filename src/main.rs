use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use log::info;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use sumo_grid_sim::demand::{write_additional, VehicleType};
use sumo_grid_sim::experiment::{
    run_design, GridObjective, OfatVariant, ParameterSpace, RandomDesign,
};
use sumo_grid_sim::network::{
    generate_grid, write_plain_xml, EdgeType, GridParams, JunctionType, TrafficLightLayout,
    TrafficLightType,
};
use sumo_grid_sim::simulation::{
    ScenarioPaths, Simulator, SimulatorConfig, SumoHome, VEHICLE_TYPE_ID,
};

#[derive(Parser)]
#[command(name = "sumo_grid_sim")]
#[command(about = "Grid network experiments on the SUMO traffic simulator")]
struct Cli {
    /// Directory holding the simulation input and output folders
    #[arg(long, global = true, default_value = ".")]
    workdir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a grid network and convert it with netconvert
    Grid {
        #[command(flatten)]
        grid: GridArgs,

        /// Only write the plain XML files
        #[arg(long)]
        no_convert: bool,
    },
    /// Write the vehicle type additional file
    Vtypes {
        #[command(flatten)]
        vehicle: VehicleArgs,
    },
    /// Generate random trips on an existing network
    Trips {
        #[command(flatten)]
        vehicle: VehicleArgs,

        #[command(flatten)]
        sim: SimArgs,
    },
    /// Run the whole pipeline for one configuration and print the results
    Simulate {
        #[command(flatten)]
        grid: GridArgs,

        #[command(flatten)]
        vehicle: VehicleArgs,

        #[command(flatten)]
        sim: SimArgs,
    },
    /// Step an existing .sumocfg scenario to completion
    Scenario {
        /// SUMO configuration file
        config: PathBuf,

        #[command(flatten)]
        sim: SimArgs,
    },
    /// Print the experiment parameter space as JSON
    Space {
        /// Print the one-factor-at-a-time spaces instead
        #[arg(long, value_enum)]
        ofat: Option<OfatArg>,
    },
    /// Evaluate random points of the parameter space, one JSON line each
    Experiment {
        /// Number of points to evaluate
        #[arg(long, default_value = "10")]
        samples: usize,

        /// Seed for drawing the points
        #[arg(long, default_value = "0")]
        design_seed: u64,

        /// Output file (stdout when absent)
        #[arg(long)]
        out: Option<PathBuf>,

        #[command(flatten)]
        grid: GridArgs,

        #[command(flatten)]
        vehicle: VehicleArgs,

        #[command(flatten)]
        sim: SimArgs,
    },
}

#[derive(Args)]
struct GridArgs {
    /// Number of junctions on one side
    #[arg(long, default_value = "3")]
    grid_size: usize,

    /// Junction type code (1 priority .. 8 allway_stop)
    #[arg(long, default_value = "1")]
    junction_type: u32,

    /// Traffic light type code (1 static, 2 actuated, 3 delay_based)
    #[arg(long, default_value = "2")]
    tl_type: u32,

    /// Traffic light layout code (1 opposites, 2 incoming, 3 alternateOneWay)
    #[arg(long, default_value = "1")]
    tl_layout: u32,

    /// Junction-blocking heuristic
    #[arg(long, action = ArgAction::Set, default_value = "true")]
    keep_clear: bool,

    /// Edge type code (1..4 lanes)
    #[arg(long, default_value = "1")]
    edge_type: u32,

    #[arg(long, default_value = "50")]
    edge_length: f64,

    #[arg(long, default_value = "1")]
    number_of_lanes: u32,

    /// m/s
    #[arg(long, default_value = "13.9")]
    edge_max_speed: f64,

    #[arg(long, default_value = "0")]
    edge_priority: i32,

    /// Leave out the fringe nodes used for through-traffic
    #[arg(long)]
    no_fringe: bool,
}

impl GridArgs {
    fn to_params(&self) -> Result<GridParams> {
        Ok(GridParams {
            grid_size: self.grid_size,
            junction_type: JunctionType::from_code(self.junction_type)?,
            tl_type: TrafficLightType::from_code(self.tl_type)?,
            tl_layout: TrafficLightLayout::from_code(self.tl_layout)?,
            keep_clear: self.keep_clear,
            edge_type: EdgeType::from_code(self.edge_type)?,
            edge_length: self.edge_length,
            number_of_lanes: self.number_of_lanes,
            edge_max_speed: self.edge_max_speed,
            edge_priority: self.edge_priority,
            with_fringe: !self.no_fringe,
        })
    }
}

#[derive(Args)]
struct VehicleArgs {
    /// Vehicle class code (1 passenger .. 6 truck)
    #[arg(long, default_value = "1")]
    vehicle_class: u32,

    /// Emission class code (1 Zero, 2 Energy, 3 HBEFA3/PC_G_EU4)
    #[arg(long, default_value = "3")]
    emission_class: u32,

    #[arg(long, default_value = "2.6")]
    accel: f64,

    #[arg(long, default_value = "4.5")]
    decel: f64,

    #[arg(long, default_value = "55.55")]
    max_speed: f64,

    #[arg(long, default_value = "1.0")]
    speed_factor: f64,

    #[arg(long, default_value = "0.1")]
    speed_dev: f64,
}

impl VehicleArgs {
    fn to_vehicle_type(&self) -> Result<VehicleType> {
        Ok(
            VehicleType::from_codes(VEHICLE_TYPE_ID, self.vehicle_class, self.emission_class)?
                .with_accel(self.accel)
                .with_decel(self.decel)
                .with_max_speed(self.max_speed)
                .with_speed_factor(self.speed_factor)
                .with_speed_dev(self.speed_dev),
        )
    }
}

#[derive(Args)]
struct SimArgs {
    /// Run sumo-gui instead of sumo
    #[arg(long)]
    gui: bool,

    #[arg(long, default_value = "42")]
    seed: u64,

    /// Milliseconds between simulation steps
    #[arg(long, default_value = "0")]
    step_delay: u32,

    #[arg(long, default_value = "0")]
    begin: f64,

    #[arg(long, default_value = "3600")]
    end: f64,

    /// Seconds between generated departures
    #[arg(long, default_value = "10")]
    period: f64,

    #[arg(long, default_value = "10")]
    fringe_factor: f64,

    #[arg(long, default_value = "1")]
    binomial: u32,

    /// Draw departures from a binomial distribution
    #[arg(long, action = ArgAction::Set, default_value = "true")]
    use_binomial: bool,

    /// Python interpreter for SUMO's tools
    #[arg(long, default_value = "python")]
    python: String,
}

impl SimArgs {
    fn to_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            show_gui: self.gui,
            seed: self.seed,
            step_delay: self.step_delay,
            begin_time: self.begin,
            end_time: self.end,
            trips_period: self.period,
            trips_fringe_factor: self.fringe_factor,
            trips_binomial: self.binomial,
            trips_use_binomial: self.use_binomial,
            python: self.python.clone(),
            ..SimulatorConfig::default()
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OfatArg {
    Default,
    Time,
    Co2,
}

impl From<OfatArg> for OfatVariant {
    fn from(arg: OfatArg) -> Self {
        match arg {
            OfatArg::Default => OfatVariant::Default,
            OfatArg::Time => OfatVariant::Time,
            OfatArg::Co2 => OfatVariant::Co2,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let paths = ScenarioPaths::new(&cli.workdir);

    match cli.command {
        Commands::Grid { grid, no_convert } => {
            let params = grid.to_params()?;
            if no_convert {
                paths.create_dirs()?;
                let network = generate_grid(&params)?;
                write_plain_xml(&network, &params, paths.plain_xml_files())?;
                info!(
                    "Wrote {} nodes and {} edges to {}",
                    network.node_count(),
                    network.edge_count(),
                    paths.plain_xml_dir.display()
                );
            } else {
                let simulator = simulator(SimulatorConfig::default(), paths)?;
                simulator.generate_network(&params)?;
            }
        }
        Commands::Vtypes { vehicle } => {
            paths.create_dirs()?;
            write_additional(&paths.additional_file, &[vehicle.to_vehicle_type()?])?;
            info!("Wrote {}", paths.additional_file.display());
        }
        Commands::Trips { vehicle, sim } => {
            let simulator = simulator(sim.to_config(), paths)?;
            simulator.generate_demand(&vehicle.to_vehicle_type()?)?;
        }
        Commands::Simulate { grid, vehicle, sim } => {
            let simulator = simulator(sim.to_config(), paths)?;
            let result = simulator.simulate(&grid.to_params()?, &vehicle.to_vehicle_type()?)?;
            print_json(&result)?;
        }
        Commands::Scenario { config, sim } => {
            let simulator = simulator(sim.to_config(), paths)?;
            let steps = simulator.run_config(&config)?;
            info!("Scenario {} finished after {} steps", config.display(), steps);
        }
        Commands::Space { ofat } => match ofat {
            Some(variant) => print_json(&ParameterSpace::ofat(variant.into())?)?,
            None => print_json(&ParameterSpace::default_space())?,
        },
        Commands::Experiment {
            samples,
            design_seed,
            out,
            grid,
            vehicle,
            sim,
        } => {
            let simulator = simulator(sim.to_config(), paths)?;
            let points =
                RandomDesign::new(ParameterSpace::default_space(), design_seed).points(samples)?;
            let mut objective = GridObjective {
                simulator: &simulator,
                grid: grid.to_params()?,
                vehicle_type: vehicle.to_vehicle_type()?,
            };

            let mut writer: Box<dyn Write> = match &out {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path)
                        .with_context(|| format!("Couldn't create {}", path.display()))?,
                )),
                None => Box::new(io::stdout().lock()),
            };
            let evaluations = run_design(&mut objective, &points, &mut writer)?;
            info!("Evaluated {} points", evaluations.len());
        }
    }

    Ok(())
}

/// Everything that talks to SUMO needs `SUMO_HOME`
fn simulator(config: SimulatorConfig, paths: ScenarioPaths) -> Result<Simulator> {
    let sumo_home = SumoHome::from_env()?;
    Simulator::new(config, sumo_home, paths)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
