//! Scenario layout and the simulator command line

use std::ffi::OsString;
use std::fs;

use sumo_grid_sim::demand::VehicleType;
use sumo_grid_sim::network::{EmissionClass, GridParams, VehicleClass};
use sumo_grid_sim::simulation::{
    ScenarioPaths, Simulator, SimulatorConfig, SumoHome, VEHICLE_TYPE_ID,
};

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

fn simulator(root: &std::path::Path, config: SimulatorConfig) -> Simulator {
    Simulator::new(config, SumoHome::new("/opt/sumo"), ScenarioPaths::new(root)).unwrap()
}

#[test]
fn test_scenario_layout() {
    let paths = ScenarioPaths::new("work");

    assert!(paths.nodes_file.ends_with("simulation_input_files/grid_plain_xml/nodes.nod.xml"));
    assert!(paths.edge_types_file.ends_with("grid_plain_xml/edge_types.typ.xml"));
    assert!(paths.net_file.ends_with("simulation_input_files/grid.net.xml"));
    assert!(paths.routes_file.ends_with("simulation_input_files/veh_passenger.rou.xml"));
    assert!(paths.additional_file.ends_with("simulation_input_files/veh.add.xml"));
    assert!(paths.emissions_file.ends_with("simulation_output_files/emissions_output.xml"));
    assert!(paths.statistics_file.ends_with("simulation_output_files/statistics_output.xml"));
    assert!(paths.trip_info_file.ends_with("simulation_output_files/tripinfo.xml"));
}

#[test]
fn test_simulator_creates_directories() {
    let dir = tempfile::tempdir().unwrap();
    let simulator = simulator(dir.path(), SimulatorConfig::default());

    assert!(simulator.paths.input_dir.is_dir());
    assert!(simulator.paths.plain_xml_dir.is_dir());
    assert!(simulator.paths.output_dir.is_dir());
}

#[test]
fn test_grid_args() {
    let dir = tempfile::tempdir().unwrap();
    let simulator = simulator(dir.path(), SimulatorConfig::default());
    let paths = &simulator.paths;
    let args = strings(&simulator.grid_args());

    let flag = |name: &str| -> String {
        let i = args.iter().position(|arg| arg == name).unwrap();
        args[i + 1].clone()
    };
    assert_eq!(flag("--net-file"), paths.net_file.to_string_lossy());
    assert_eq!(flag("--route-files"), paths.routes_file.to_string_lossy());
    assert_eq!(flag("--seed"), "42");
    assert_eq!(flag("--delay"), "0");
    assert_eq!(flag("--emission-output"), paths.emissions_file.to_string_lossy());
    assert_eq!(flag("--statistics-output"), paths.statistics_file.to_string_lossy());
    assert_eq!(flag("--tripinfo-output"), paths.trip_info_file.to_string_lossy());
    assert!(args.contains(&"--start".to_string()));
    assert!(args.contains(&"--quit-on-end".to_string()));
    assert!(!args.contains(&"--gui-settings-file".to_string()));
}

#[test]
fn test_gui_settings_only_with_gui() {
    let dir = tempfile::tempdir().unwrap();
    let headless = simulator(dir.path(), SimulatorConfig::default());
    fs::write(&headless.paths.gui_settings_file, "<viewsettings/>").unwrap();

    // The file exists, but only the GUI gets it
    let args = strings(&headless.grid_args());
    assert!(!args.contains(&"--gui-settings-file".to_string()));

    let gui = simulator(
        dir.path(),
        SimulatorConfig {
            show_gui: true,
            step_delay: 200,
            ..SimulatorConfig::default()
        },
    );
    let args = strings(&gui.grid_args());
    assert!(args.contains(&"--gui-settings-file".to_string()));
    assert!(args.contains(&"200".to_string()));
}

#[test]
fn test_trip_files_point_into_sumo_home() {
    let dir = tempfile::tempdir().unwrap();
    let simulator = simulator(dir.path(), SimulatorConfig::default());
    let files = simulator.trip_files();

    assert!(files.script.ends_with("tools/randomTrips.py"));
    assert!(files.script.starts_with("/opt/sumo"));
    assert_eq!(files.net_file, simulator.paths.net_file);
    assert_eq!(files.additional_file, simulator.paths.additional_file);
}

#[test]
fn test_missing_simulator_binary_fails_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("scenario.sumocfg");
    fs::write(&config, "<configuration/>").unwrap();

    let simulator = Simulator::new(
        SimulatorConfig {
            connect_attempts: 1,
            ..SimulatorConfig::default()
        },
        SumoHome::new(dir.path()),
        ScenarioPaths::new(dir.path()),
    )
    .unwrap();
    // No sumo under bin/ and, in the test environment, none on PATH either
    if which_sumo_on_path() {
        return;
    }
    assert!(simulator.run_config(&config).is_err());
}

fn which_sumo_on_path() -> bool {
    std::env::var_os("PATH").is_some_and(|path| {
        std::env::split_paths(&path).any(|dir| dir.join("sumo").is_file())
    })
}

/// Installs an executable shell script at `path`
#[cfg(unix)]
fn install_script(path: &std::path::Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Test that a failing netconvert doesn't leave the previous network in use
#[cfg(unix)]
#[test]
fn test_failed_netconvert_discards_previous_network() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    install_script(
        &home.path().join("bin/netconvert"),
        "echo 'Error: broken network' >&2\nexit 1",
    );

    let simulator = Simulator::new(
        SimulatorConfig::default(),
        SumoHome::new(home.path()),
        ScenarioPaths::new(work.path()),
    )
    .unwrap();
    fs::write(&simulator.paths.net_file, "<net>PREVIOUS RUN</net>").unwrap();

    let err = simulator
        .generate_network(&GridParams::with_size(2))
        .unwrap_err();
    assert!(
        err.to_string().contains("netconvert did not produce"),
        "unexpected error: {}",
        err
    );
    assert!(!simulator.paths.net_file.exists());
}

/// Test that a netconvert writing its output lets the pipeline continue
#[cfg(unix)]
#[test]
fn test_netconvert_output_is_accepted() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    install_script(
        &home.path().join("bin/netconvert"),
        "for arg in \"$@\"; do\n  case \"$arg\" in\n    --output-file=*) echo '<net/>' > \"${arg#--output-file=}\" ;;\n  esac\ndone",
    );

    let simulator = Simulator::new(
        SimulatorConfig::default(),
        SumoHome::new(home.path()),
        ScenarioPaths::new(work.path()),
    )
    .unwrap();
    fs::write(&simulator.paths.net_file, "<net>PREVIOUS RUN</net>").unwrap();

    let network = simulator.generate_network(&GridParams::with_size(2)).unwrap();
    assert_eq!(network.node_count(), 12);
    assert_eq!(
        fs::read_to_string(&simulator.paths.net_file).unwrap().trim(),
        "<net/>"
    );
}

/// Test that failed trip generation doesn't reuse the previous routes
#[cfg(unix)]
#[test]
fn test_failed_trip_generation_discards_previous_routes() {
    let home = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    // Run through sh, standing in for the python interpreter
    install_script(&home.path().join("tools/randomTrips.py"), "exit 1");

    let simulator = Simulator::new(
        SimulatorConfig {
            python: "sh".to_string(),
            ..SimulatorConfig::default()
        },
        SumoHome::new(home.path()),
        ScenarioPaths::new(work.path()),
    )
    .unwrap();
    fs::write(&simulator.paths.routes_file, "<routes>PREVIOUS RUN</routes>").unwrap();
    fs::write(&simulator.paths.trips_file, "<routes>PREVIOUS RUN</routes>").unwrap();

    let vehicle_type = VehicleType::new(
        VEHICLE_TYPE_ID,
        VehicleClass::Passenger,
        EmissionClass::PcGEu4,
    );
    let err = simulator.generate_demand(&vehicle_type).unwrap_err();
    assert!(
        err.to_string().contains("randomTrips.py did not produce"),
        "unexpected error: {}",
        err
    );
    assert!(!simulator.paths.routes_file.exists());
    assert!(!simulator.paths.trips_file.exists());
    // The vehicle types were still written
    assert!(simulator.paths.additional_file.is_file());
}
