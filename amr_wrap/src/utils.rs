use anyhow::{ensure, Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt::{Debug, Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Convert an io::error to a string and strip "(os error 4)" from the end.
fn io_error_to_string(err: &std::io::Error) -> String {
    let s = err.to_string();
    s.strip_suffix(&format!(" (os error {})", err.raw_os_error().unwrap_or(0)))
        .unwrap_or(&s)
        .to_string()
}

/// Print an error chain.
pub fn print_error_chain(err: &anyhow::Error) {
    let error_chain = err.chain().join("\n\tCaused by: ");
    if let Some(io_err) = err.downcast_ref::<std::io::Error>() {
        let io_err_str = io_error_to_string(io_err);
        match err.chain().len() {
            1 => eprintln!("ERROR: {io_err_str}"),
            2 => eprintln!("ERROR: {io_err_str}: {err}"),
            _ => eprintln!("ERROR: {error_chain}"),
        };
    } else {
        eprintln!("ERROR: {error_chain}");
    };
}

/// An absolute, canonical path written into the configuration document.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct CliPath {
    path: PathBuf,
}

impl CliPath {
    /// Canonicalize `path`, which must exist.
    pub fn canonicalize(path: &Path) -> Result<CliPath> {
        let path = path
            .canonicalize()
            .with_context(|| io_path_context(path))?;
        Ok(CliPath { path })
    }
}

fn io_path_context(path: &Path) -> String {
    format!("resolving {}", path.display())
}

impl From<PathBuf> for CliPath {
    fn from(path: PathBuf) -> Self {
        CliPath { path }
    }
}

impl Display for CliPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        Display::fmt(&self.path.display(), f)
    }
}

impl Debug for CliPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(&self.path, f)
    }
}

impl AsRef<Path> for CliPath {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Deref for CliPath {
    type Target = Path;

    fn deref(&self) -> &Path {
        &self.path
    }
}

/// Expand a `~` to the current users home dir.
/// Returns None if the path starts with `~` and no home directory is known.
pub fn expand_tilde(path: &Path) -> Option<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Some(path.to_path_buf());
    };
    let home = dirs::home_dir()?;
    if rest.as_os_str().is_empty() {
        Some(home)
    } else {
        Some(home.join(rest))
    }
}

/// Parse and validate a fraction in [0, 1], for use with Clap's value_parser.
pub fn validate_fraction(s: &str) -> Result<f64> {
    let value: f64 = s
        .parse()
        .with_context(|| format!("\"{s}\" is not a number"))?;
    ensure!(
        (0.0..=1.0).contains(&value),
        "must be a fraction between 0 and 1, got {value}"
    );
    Ok(value)
}

/// Options that historically took a single dash, like `-db_point`.
const LEGACY_LONG_FLAGS: [&str; 2] = ["db_point", "db_res"];

/// Rewrite `-db_point`/`-db_res` (and their `=value` forms) to the double-dash
/// spelling clap understands. Every other argument is passed through unchanged.
pub fn canonicalize_legacy_flags<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let legacy = arg.to_str().is_some_and(|s| {
                LEGACY_LONG_FLAGS.iter().any(|flag| {
                    s.strip_prefix('-')
                        .and_then(|s| s.strip_prefix(flag))
                        .is_some_and(|rest| rest.is_empty() || rest.starts_with('='))
                })
            });
            if legacy {
                let mut fixed = OsString::from("-");
                fixed.push(&arg);
                fixed
            } else {
                arg
            }
        })
        .collect()
}
