use crate::species::Species;
use crate::utils::CliPath;
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// A `0`/`1` switch, kept in that form because the Snakefile compares the strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toggle {
    #[serde(rename = "1")]
    On,
    #[serde(rename = "0")]
    Off,
}

impl FromStr for Toggle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Toggle> {
        Ok(match s {
            "1" => Toggle::On,
            "0" => Toggle::Off,
            _ => bail!("type 1 to enable or 0 to disable, got \"{s}\""),
        })
    }
}

impl Display for Toggle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Toggle::On => "1",
            Toggle::Off => "0",
        })
    }
}

/// The validated user options, as written to the `Parameters` section of the
/// configuration document. Field names are read by the Snakefile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub output_dir: PathBuf,
    pub input_dir: CliPath,
    pub species: Species,
    /// Minimum ResFinder coverage.
    pub coverage: f64,
    /// Minimum ResFinder identity.
    pub threshold: f64,
    pub pointfinder_db: PathBuf,
    pub resfinder_db: PathBuf,
    pub run_pointfinder: Toggle,
    pub dryrun: bool,
}

impl Parameters {
    /// Apply the species rules: underscores in the species name become spaces,
    /// and PointFinder is switched off for `other`. Applying this twice changes
    /// nothing further.
    pub fn normalized(mut self) -> Parameters {
        self.species = self.species.normalized();
        if self.species.is_other() {
            self.run_pointfinder = Toggle::Off;
        }
        self
    }
}
