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

//!
//! Settings for the workflow engine run, read from `config/engine.toml`.
//!

use anyhow::{bail, Context, Result};
use log::warn;
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

/// Default location of the settings file, relative to the working directory.
pub const ENGINE_TOML_PATH: &str = "config/engine.toml";

/// Environment variable that overrides `ENGINE_TOML_PATH`.
pub const ENGINE_TOML_ENV_VARIABLE_NAME: &str = "JUNO_AMR_ENGINE_TOML";

/// How the engine runs its jobs.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobMode {
    /// Run every job on this machine.
    Local,
    /// Submit every job to the cluster through DRMAA.
    Drmaa,
}

impl FromStr for JobMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<JobMode> {
        Ok(match s {
            "local" => JobMode::Local,
            "drmaa" => JobMode::Drmaa,
            _ => bail!("unknown job mode \"{s}\", expected local or drmaa"),
        })
    }
}

impl Display for JobMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            JobMode::Local => "local",
            JobMode::Drmaa => "drmaa",
        })
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Maximum number of cores the engine may use at one time.
    pub cores: usize,
    /// Seconds to wait for output files that are late to appear on a shared filesystem.
    pub latency_wait: u64,
    /// Workflow definition handed to the engine.
    pub snakefile: PathBuf,
    /// Engine executable, looked up on the PATH unless it contains a slash.
    pub executable: String,
    /// Let the engine provision a conda environment per rule.
    pub use_conda: bool,
    pub jobmode: JobMode,
    /// Cluster queue jobs are submitted to in drmaa mode.
    pub queue: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            cores: 1,
            latency_wait: 5,
            snakefile: PathBuf::from("Snakefile"),
            executable: String::from("snakemake"),
            use_conda: true,
            jobmode: JobMode::Local,
            queue: String::from("bio"),
        }
    }
}

macro_rules! warn_if_changed {
    ($settings:expr, $default:expr, $($a:ident),+) => {
        $(
            if $default.$a != $settings.$a {
                warn!("using non-default {} = {:?}", stringify!($a), $settings.$a);
            }
        )+
    };
}

impl EngineSettings {
    /// Load settings from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<EngineSettings> {
        if !path.exists() {
            warn!(
                "could not find engine settings at {}, falling back to defaults",
                path.display()
            );
            return Ok(EngineSettings::default());
        }
        let s = std::fs::read_to_string(path).with_context(|| path.display().to_string())?;
        let settings: EngineSettings =
            toml::from_str(&s).with_context(|| path.display().to_string())?;
        settings.log_overrides();
        Ok(settings)
    }

    fn log_overrides(&self) {
        let default = EngineSettings::default();
        warn_if_changed!(
            self,
            default,
            cores,
            latency_wait,
            snakefile,
            executable,
            use_conda,
            jobmode,
            queue
        );
    }
}

/// Path of the settings file for this process.
pub fn settings_path() -> PathBuf {
    std::env::var_os(ENGINE_TOML_ENV_VARIABLE_NAME)
        .map_or_else(|| PathBuf::from(ENGINE_TOML_PATH), PathBuf::from)
}

static SETTINGS: OnceLock<Result<EngineSettings>> = OnceLock::new();

/// Return a reference to the global engine settings.
/// The settings may need to be loaded; if loading fails, return Err.
pub fn engine_settings() -> Result<&'static EngineSettings> {
    // TODO: use get_or_try_init once [#109737](https://github.com/rust-lang/rust/issues/109737) is stabilized
    match SETTINGS.get_or_init(|| EngineSettings::load(&settings_path())) {
        Ok(settings) => Ok(settings),
        Err(e) => Err(anyhow::anyhow!("{e:#}")),
    }
}
