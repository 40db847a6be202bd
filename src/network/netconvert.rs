//! Turning plain XML into a `.net.xml` with SUMO's own converter

use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use crate::tools::run_tool;

#[derive(Debug, Clone)]
pub struct NetConvert {
    pub binary: PathBuf,
    pub node_files: PathBuf,
    pub edge_files: PathBuf,
    pub type_files: PathBuf,
    pub output_file: PathBuf,
}

impl NetConvert {
    pub fn args(&self) -> Vec<OsString> {
        [
            ("--node-files=", &self.node_files),
            ("--edge-files=", &self.edge_files),
            ("--type-files=", &self.type_files),
            ("--output-file=", &self.output_file),
        ]
        .into_iter()
        .map(|(flag, path)| {
            let mut arg = OsString::from(flag);
            arg.push(path);
            arg
        })
        .collect()
    }

    pub fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(self.args());
        command
    }

    pub fn run(&self) -> Result<ExitStatus> {
        run_tool(&mut self.command())
    }
}
