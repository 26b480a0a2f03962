use crate::config_doc::ConfigDocument;
use crate::fastqs::{list_fastq_dir, SampleFastqs, UnmatchedPolicy};
use crate::parameters::{Parameters, Toggle};
use crate::species::Species;
use crate::utils::{expand_tilde, validate_fraction, CliPath};
use anyhow::{anyhow, Result};
use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};

pub const DEFAULT_POINTFINDER_DB: &str = "/mnt/db/resfinder/db_pointfinder";
pub const DEFAULT_RESFINDER_DB: &str = "/mnt/db/resfinder/db_resfinder";

#[derive(Parser, Debug, Clone)]
pub struct AmrArgs {
    /// Path to the directory of your input. Example: path/to/input/fastq.
    /// Only .fastq, .fq, .fastq.gz and .fq.gz files are allowed.
    #[clap(short = 'i', long = "input", value_name = "DIR", required = true)]
    pub input_dir: PathBuf,

    /// Full scientific name of the species sample, use underscores not
    /// spaces, e.g. escherichia_coli. Options are the species of the
    /// PointFinder database, or "other" to skip PointFinder.
    #[clap(short = 's', long, value_name = "SPECIES", required = true)]
    pub species: String,

    /// Path to the directory you want to use as an output directory.
    #[clap(short = 'o', long = "output", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Minimum coverage of ResFinder, as a fraction.
    #[clap(
        short = 'l',
        long = "min_cov",
        value_name = "FLOAT",
        default_value = "0.6",
        value_parser = validate_fraction
    )]
    pub coverage: f64,

    /// Threshold for identity of ResFinder, as a fraction.
    #[clap(
        short = 't',
        long = "threshold",
        value_name = "FLOAT",
        default_value = "0.8",
        value_parser = validate_fraction
    )]
    pub threshold: f64,

    /// Alternative database for PointFinder.
    #[clap(long = "db_point", value_name = "DIR", default_value = DEFAULT_POINTFINDER_DB)]
    pub pointfinder_db: PathBuf,

    /// Alternative database for ResFinder.
    #[clap(long = "db_res", value_name = "DIR", default_value = DEFAULT_RESFINDER_DB)]
    pub resfinder_db: PathBuf,

    /// Type 1 to run PointFinder, 0 to not run PointFinder.
    /// Always 0 for species "other".
    #[clap(long = "point", value_name = "0|1", default_value = "1")]
    pub run_pointfinder: Toggle,

    /// Only report what the workflow would run.
    #[clap(short = 'n', long)]
    pub dryrun: bool,

    /// Fail instead of warning when a FASTQ file is not named
    /// <sample>_R1/<sample>_R2 or lacks its mate.
    #[clap(long = "strict_names")]
    pub strict_names: bool,
}

fn expand(path: &Path) -> Result<PathBuf> {
    expand_tilde(path).ok_or_else(|| {
        anyhow!(
            "Can't expand '~' in {}. No home directory is known",
            path.display()
        )
    })
}

impl AmrArgs {
    /// Check the input directory and the species. Nothing is written.
    pub fn to_parameters(&self) -> Result<Parameters> {
        let input_dir = expand(&self.input_dir)?;
        list_fastq_dir(&input_dir)?;
        let pointfinder_db = expand(&self.pointfinder_db)?;
        let species = Species::resolve(&self.species, &pointfinder_db)?;

        Ok(Parameters {
            output_dir: self.output_dir.clone(),
            input_dir: CliPath::canonicalize(&input_dir)?,
            species,
            coverage: self.coverage,
            threshold: self.threshold,
            pointfinder_db,
            resfinder_db: expand(&self.resfinder_db)?,
            run_pointfinder: self.run_pointfinder,
            dryrun: self.dryrun,
        })
    }

    pub fn unmatched_policy(&self) -> UnmatchedPolicy {
        if self.strict_names {
            UnmatchedPolicy::Fail
        } else {
            UnmatchedPolicy::Warn
        }
    }

    /// Validate and normalize the arguments and find the samples: the
    /// complete configuration document, ready to be written.
    pub fn prepare(&self) -> Result<ConfigDocument> {
        let parameters = self.to_parameters()?.normalized();
        let samples = SampleFastqs::discover(&parameters.input_dir, self.unmatched_policy())?;
        info!(
            "found {} R1 and {} R2 files in {}",
            samples.r1.len(),
            samples.r2.len(),
            parameters.input_dir
        );
        Ok(ConfigDocument::new(parameters, samples))
    }
}
