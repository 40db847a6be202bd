//! Locating the SUMO installation

use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

pub const SUMO_HOME_VAR: &str = "SUMO_HOME";

/// Root of a SUMO installation, as given by `SUMO_HOME`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumoHome {
    root: PathBuf,
}

impl SumoHome {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reads `SUMO_HOME`. Nothing works without it, so callers treat a
    /// missing variable as fatal.
    pub fn from_env() -> Result<Self> {
        let root = env::var_os(SUMO_HOME_VAR)
            .filter(|value| !value.is_empty())
            .with_context(|| format!("{} must be declared", SUMO_HOME_VAR))?;
        Ok(Self::new(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tools_dir(&self) -> PathBuf {
        self.root.join("tools")
    }

    pub fn random_trips_script(&self) -> PathBuf {
        self.tools_dir().join("randomTrips.py")
    }

    /// Path of a SUMO executable: the copy under `$SUMO_HOME/bin` when it
    /// exists, otherwise the bare name so it is looked up on `PATH`.
    pub fn binary(&self, name: &str) -> PathBuf {
        let file_name = if cfg!(windows) {
            format!("{}.exe", name)
        } else {
            name.to_string()
        };
        let candidate = self.root.join("bin").join(&file_name);
        if candidate.is_file() {
            candidate
        } else {
            PathBuf::from(file_name)
        }
    }
}
