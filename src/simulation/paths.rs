//! Fixed file layout of a scenario working directory

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::network::PlainXmlFiles;

/// Every file the pipeline reads or writes, relative to one root
#[derive(Debug, Clone)]
pub struct ScenarioPaths {
    pub root: PathBuf,

    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub plain_xml_dir: PathBuf,

    pub nodes_file: PathBuf,
    pub edges_file: PathBuf,
    pub edge_types_file: PathBuf,
    pub net_file: PathBuf,

    pub routes_file: PathBuf,
    pub trips_file: PathBuf,
    pub additional_file: PathBuf,
    pub gui_settings_file: PathBuf,

    pub emissions_file: PathBuf,
    pub statistics_file: PathBuf,
    pub trip_info_file: PathBuf,
}

impl ScenarioPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let input_dir = root.join("simulation_input_files");
        let output_dir = root.join("simulation_output_files");
        let plain_xml_dir = input_dir.join("grid_plain_xml");

        Self {
            nodes_file: plain_xml_dir.join("nodes.nod.xml"),
            edges_file: plain_xml_dir.join("edges.edg.xml"),
            edge_types_file: plain_xml_dir.join("edge_types.typ.xml"),
            net_file: input_dir.join("grid.net.xml"),

            routes_file: input_dir.join("veh_passenger.rou.xml"),
            trips_file: input_dir.join("veh_passenger.trips.xml"),
            additional_file: input_dir.join("veh.add.xml"),
            gui_settings_file: input_dir.join("custom_sumo_gui_view.xml"),

            emissions_file: output_dir.join("emissions_output.xml"),
            statistics_file: output_dir.join("statistics_output.xml"),
            trip_info_file: output_dir.join("tripinfo.xml"),

            root,
            input_dir,
            output_dir,
            plain_xml_dir,
        }
    }

    /// Creates the input, plain XML and output directories
    pub fn create_dirs(&self) -> Result<()> {
        for dir in [&self.input_dir, &self.plain_xml_dir, &self.output_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Couldn't create directory {}", dir.display()))?;
        }
        Ok(())
    }

    pub fn plain_xml_files(&self) -> PlainXmlFiles<'_> {
        PlainXmlFiles {
            nodes: &self.nodes_file,
            edges: &self.edges_file,
            types: &self.edge_types_file,
        }
    }

    /// The GUI settings file, if one was put in place
    pub fn gui_settings(&self) -> Option<&Path> {
        self.gui_settings_file
            .is_file()
            .then_some(self.gui_settings_file.as_path())
    }
}
