//! juno-amr
#![deny(missing_docs)]

use amr_wrap::config_doc::{ConfigDocument, CONFIG_DOCUMENT_PATH};
use amr_wrap::engine_args::EngineArgs;
use amr_wrap::intake::AmrArgs;
use amr_wrap::utils::{canonicalize_legacy_flags, print_error_chain};
use amr_wrap::{env, execute};
use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::Path;
use std::process::ExitCode;

const CMD: &str = "juno-amr";

/// Juno-amr pipeline. Automated pipeline to use ResFinder and PointFinder
/// on paired-end FASTQ data.
#[derive(Parser, Debug)]
#[clap(
    name = CMD,
    version,
    override_usage = "juno-amr -s <SPECIES> -i <DIR> [OPTIONS]",
)]
struct JunoAmr {
    #[clap(flatten)]
    args: AmrArgs,

    #[clap(flatten)]
    engine: EngineArgs,
}

fn inner_main() -> Result<ExitCode> {
    env::set_env_columns();
    env::init_logging();

    let opts = JunoAmr::parse_from(canonicalize_legacy_flags(std::env::args_os()));
    let settings = engine_toml::engine_settings()?;

    let config_path = Path::new(CONFIG_DOCUMENT_PATH);
    opts.args.prepare()?.write(config_path)?;
    info!("wrote {}", config_path.display());

    // Run from what the engine will actually read.
    let written = ConfigDocument::read(config_path)?;
    let invocation = opts
        .engine
        .invocation(settings, config_path, &written.parameters);
    execute(&invocation)
}

fn main() -> ExitCode {
    match inner_main() {
        Ok(exit_code) => exit_code,
        Err(err) => {
            print_error_chain(&err);
            ExitCode::FAILURE
        }
    }
}
