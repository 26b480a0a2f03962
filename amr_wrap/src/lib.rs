// Warning groups (as of rust 1.55)
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2021_compatibility,
    rust_2018_idioms,
    unused
)]
// Other warnings (as of rust 1.55)
#![deny(
    asm_sub_register,
    bad_asm_style,
    bindings_with_variant_name,
    clashing_extern_declarations,
    confusable_idents,
    const_item_mutation,
    deprecated,
    deref_nullptr,
    drop_bounds,
    dyn_drop,
    elided_lifetimes_in_paths,
    exported_private_dependencies,
    function_item_references,
    improper_ctypes,
    improper_ctypes_definitions,
    incomplete_features,
    inline_no_sanitize,
    invalid_value,
    irrefutable_let_patterns,
    large_assignments,
    mixed_script_confusables,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overlapping_range_endpoints,
    renamed_and_removed_lints,
    stable_features,
    dangling_pointers_from_temporaries,
    trivial_bounds,
    type_alias_bounds,
    uncommon_codepoints,
    unconditional_recursion,
    unknown_lints,
    unnameable_test_items,
    unused_comparisons,
    while_true
)]

pub mod config_doc;
pub mod engine_args;
pub mod env;
pub mod error;
pub mod fastqs;
pub mod intake;
pub mod parameters;
pub mod species;
pub mod utils;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::info;
use shell_escape::escape;
use std::borrow::Cow;
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode, ExitStatus};

/// Convert something to an ExitCode.
trait IntoExitCode {
    fn into_exit_code(self) -> ExitCode;
}

impl IntoExitCode for ExitStatus {
    /// Convert an ExitStatus to an ExitCode.
    fn into_exit_code(self) -> ExitCode {
        self.code()
            .map_or(ExitCode::FAILURE, |x| ExitCode::from(x as u8))
    }
}

/// Cluster submission through DRMAA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrmaaSubmission {
    pub queue: String,
    /// Where the cluster writes the stdout and stderr of each job.
    pub log_dir: PathBuf,
}

impl DrmaaSubmission {
    /// Submit to `queue`, logging under `<output_dir>/log/drmaa`.
    pub fn new(queue: &str, output_dir: &Path) -> Self {
        DrmaaSubmission {
            queue: queue.to_string(),
            log_dir: output_dir.join("log").join("drmaa"),
        }
    }

    pub fn template(&self) -> String {
        drmaa_template(&self.queue, &self.log_dir)
    }
}

/// The per-job DRMAA resource string. The brace placeholders are filled in by
/// the engine for every job it submits.
pub fn drmaa_template(queue: &str, log_dir: &Path) -> String {
    let log = log_dir.display();
    format!(
        "-q {queue} -n {{threads}} \
         -o {log}/{{name}}_{{wildcards}}_{{jobid}}.out \
         -e {log}/{{name}}_{{wildcards}}_{{jobid}}.err \
         -R \"span[hosts=1]\" -R \"rusage[mem={{resources.mem_mb}}]\""
    )
}

/// A call of the workflow engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub executable: String,
    pub snakefile: PathBuf,
    pub configfile: PathBuf,
    pub cores: usize,
    pub latency_wait: u64,
    pub use_conda: bool,
    /// Only build the job graph and report what would run.
    pub dry_run: bool,
    pub cluster: Option<DrmaaSubmission>,
}

impl Invocation {
    /// Convert this struct into a vector of command line arguments.
    pub fn get_args(&self) -> Vec<String> {
        [
            Some(format!("--snakefile={}", self.snakefile.display())),
            Some(format!("--configfile={}", self.configfile.display())),
            Some(format!("--cores={}", self.cores)),
            Some(format!("--latency-wait={}", self.latency_wait)),
            self.use_conda.then(|| "--use-conda".to_string()),
            self.dry_run.then(|| "--dry-run".to_string()),
            self.cluster
                .as_ref()
                .map(|c| format!("--drmaa={}", c.template())),
            self.cluster
                .as_ref()
                .map(|c| format!("--drmaa-log-dir={}", c.log_dir.display())),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// The invocation as a shell command line.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.clone())
            .chain(self.get_args())
            .map(|arg| escape(Cow::from(arg)).into_owned())
            .join(" ")
    }
}

/// Run the workflow engine and return an ExitCode.
/// The exit status of the engine is passed through unchanged.
pub fn execute(invocation: &Invocation) -> Result<ExitCode> {
    Ok(execute_to_status(invocation)?.into_exit_code())
}

/// Run the workflow engine and return its ExitStatus.
pub fn execute_to_status(invocation: &Invocation) -> Result<ExitStatus> {
    if invocation.dry_run {
        println!("Dry Run Mode");
        println!();
        println!("workflow command: {}", invocation.command_line());
        println!("config file: {}", invocation.configfile.display());
        println!();
    } else if let Some(cluster) = &invocation.cluster {
        create_dir_all(&cluster.log_dir)
            .with_context(|| cluster.log_dir.display().to_string())?;
    }

    info!("running {}", invocation.command_line());
    Command::new(&invocation.executable)
        .args(invocation.get_args())
        .status()
        .with_context(|| format!("running {}", invocation.command_line()))
}
