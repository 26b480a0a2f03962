use crate::parameters::Parameters;
use crate::{DrmaaSubmission, Invocation};
use clap::builder::NonEmptyStringValueParser;
use clap::{value_parser, Parser};
use engine_toml::{EngineSettings, JobMode};
use std::path::{Path, PathBuf};

/// Command-line overrides of the engine settings.
#[derive(Parser, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Job manager to use. Valid options: local or drmaa.
    /// Defaults to the jobmode of config/engine.toml, or local.
    #[clap(long, value_name = "MODE")]
    jobmode: Option<JobMode>,

    /// Set max cores the workflow engine may use at one time.
    #[clap(long, value_name = "NUM", value_parser = value_parser!(u32).range(1..))]
    cores: Option<u32>,

    /// Cluster queue to submit jobs to. Only applies to the
    /// drmaa jobmode.
    #[clap(
        long,
        value_name = "QUEUE",
        value_parser = NonEmptyStringValueParser::new(),
    )]
    queue: Option<String>,

    /// Seconds to wait for output files that are late to appear
    /// on a shared filesystem.
    #[clap(long = "latency_wait", value_name = "SECS")]
    latency_wait: Option<u64>,

    /// Workflow definition to run.
    #[clap(long, value_name = "PATH")]
    snakefile: Option<PathBuf>,
}

impl EngineArgs {
    /// Combine these overrides with `settings` into the engine call for the
    /// configuration document at `configfile`.
    pub fn invocation(
        &self,
        settings: &EngineSettings,
        configfile: &Path,
        parameters: &Parameters,
    ) -> Invocation {
        let jobmode = self.jobmode.unwrap_or(settings.jobmode);
        let cluster = match jobmode {
            JobMode::Local => None,
            JobMode::Drmaa => Some(DrmaaSubmission::new(
                self.queue.as_deref().unwrap_or(&settings.queue),
                &parameters.output_dir,
            )),
        };
        Invocation {
            executable: settings.executable.clone(),
            snakefile: self
                .snakefile
                .clone()
                .unwrap_or_else(|| settings.snakefile.clone()),
            configfile: configfile.to_path_buf(),
            cores: self.cores.map_or(settings.cores, |c| c as usize),
            latency_wait: self.latency_wait.unwrap_or(settings.latency_wait),
            use_conda: settings.use_conda,
            dry_run: parameters.dryrun,
            cluster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::Toggle;
    use crate::species::Species;
    use crate::utils::CliPath;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    fn parse_args(args: &[&str]) -> Result<EngineArgs> {
        let mut full_args = vec!["program"];
        full_args.extend(args);
        Ok(EngineArgs::try_parse_from(full_args)?)
    }

    fn parameters(dryrun: bool) -> Result<Parameters> {
        Ok(Parameters {
            output_dir: PathBuf::from("/runs/output"),
            input_dir: CliPath::from(PathBuf::from("/reads")),
            species: Species::resolve("other", Path::new("/unused"))?,
            coverage: 0.6,
            threshold: 0.8,
            pointfinder_db: PathBuf::from("/db/pointfinder"),
            resfinder_db: PathBuf::from("/db/resfinder"),
            run_pointfinder: Toggle::Off,
            dryrun,
        })
    }

    #[test]
    fn test_settings_without_overrides() -> Result<()> {
        let settings = EngineSettings {
            cores: 8,
            ..EngineSettings::default()
        };
        let inv = parse_args(&[])?.invocation(
            &settings,
            Path::new("config/user_parameters.json"),
            &parameters(false)?,
        );
        assert_eq!(inv.cores, 8);
        assert_eq!(inv.latency_wait, 5);
        assert_eq!(inv.snakefile, PathBuf::from("Snakefile"));
        assert_eq!(inv.executable, "snakemake");
        assert!(inv.cluster.is_none());
        assert!(!inv.dry_run);
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let inv = parse_args(&[
            "--cores=4",
            "--jobmode=drmaa",
            "--queue",
            "long",
            "--latency_wait",
            "60",
            "--snakefile",
            "workflow/Snakefile",
        ])?
        .invocation(
            &EngineSettings::default(),
            Path::new("config/user_parameters.json"),
            &parameters(true)?,
        );
        assert_eq!(inv.cores, 4);
        assert_eq!(inv.latency_wait, 60);
        assert_eq!(inv.snakefile, PathBuf::from("workflow/Snakefile"));
        assert!(inv.dry_run);
        assert_eq!(
            inv.cluster,
            Some(DrmaaSubmission {
                queue: "long".to_string(),
                log_dir: PathBuf::from("/runs/output/log/drmaa"),
            })
        );
        Ok(())
    }

    #[test]
    fn test_drmaa_from_settings_uses_settings_queue() -> Result<()> {
        let settings = EngineSettings {
            jobmode: JobMode::Drmaa,
            ..EngineSettings::default()
        };
        let inv = parse_args(&[])?.invocation(
            &settings,
            Path::new("config/user_parameters.json"),
            &parameters(false)?,
        );
        assert_eq!(inv.cluster.map(|c| c.queue), Some("bio".to_string()));
        Ok(())
    }

    #[test]
    fn test_invalid_overrides() {
        assert!(parse_args(&["--cores=0"]).is_err());
        assert!(parse_args(&["--jobmode=sge"]).is_err());
        assert!(parse_args(&["--queue="]).is_err());
    }
}
