//! The configuration document handed to the workflow engine.
//!
//! It is written as JSON, which the engine reads like any YAML configfile.

use crate::fastqs::SampleFastqs;
use crate::parameters::Parameters;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where the document is written, relative to the working directory.
pub const CONFIG_DOCUMENT_PATH: &str = "config/user_parameters.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigDocument {
    #[serde(rename = "Parameters")]
    pub parameters: Parameters,
    pub samples_fastq_r1: BTreeMap<String, PathBuf>,
    pub samples_fastq_r2: BTreeMap<String, PathBuf>,
}

impl ConfigDocument {
    pub fn new(parameters: Parameters, samples: SampleFastqs) -> Self {
        ConfigDocument {
            parameters,
            samples_fastq_r1: samples.r1,
            samples_fastq_r2: samples.r2,
        }
    }

    /// Write the document to `path`, replacing any previous one.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).with_context(|| dir.display().to_string())?;
        }
        let mut writer =
            BufWriter::new(File::create(path).with_context(|| path.display().to_string())?);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("error writing {}", path.display()))?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<ConfigDocument> {
        let reader =
            BufReader::new(File::open(path).with_context(|| path.display().to_string())?);
        serde_json::from_reader(reader).with_context(|| format!("error reading {}", path.display()))
    }
}
