//! Facade configuration
//!
//! A config names the region, the algorithm and metric to serve and how the
//! region is held in memory. It loads from JSON and every field has a default,
//! so a config file only needs to carry what differs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::{Algorithm, Result};
use crate::storage::Region;

/// How the region is held in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryMode {
    /// Read-only file mapping, shared by every process that maps the file
    #[default]
    Mapped,
    /// Private copy read into this process
    Process,
}

impl fmt::Display for MemoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoryMode::Mapped => write!(f, "mapped"),
            MemoryMode::Process => write!(f, "process"),
        }
    }
}

impl FromStr for MemoryMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mapped" | "shared" => Ok(MemoryMode::Mapped),
            "process" => Ok(MemoryMode::Process),
            other => Err(format!("unknown memory mode '{other}' (expected mapped or process)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacadeConfig {
    pub region: PathBuf,
    pub algorithm: Algorithm,
    pub metric: String,
    pub exclude_index: usize,
    pub memory: MemoryMode,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            region: PathBuf::from("network.bfr"),
            algorithm: Algorithm::default(),
            metric: "routability".to_string(),
            exclude_index: 0,
            memory: MemoryMode::default(),
        }
    }
}

impl FacadeConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Opens the configured region in the configured memory mode
    pub fn open_region(&self) -> Result<Region> {
        match self.memory {
            MemoryMode::Mapped => Region::open(&self.region),
            MemoryMode::Process => Region::read(&self.region),
        }
    }
}
