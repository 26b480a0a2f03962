// End-to-end runs of the juno-amr binary. A shell script named `snakemake`
// stands in for the workflow engine and records the arguments it was given.

use amr_wrap::config_doc::{ConfigDocument, CONFIG_DOCUMENT_PATH};
use amr_wrap::parameters::Toggle;
use anyhow::Result;
use std::fs::{self, File};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const JUNO_AMR: &str = env!("CARGO_BIN_EXE_juno-amr");

struct Workspace {
    root: TempDir,
}

impl Workspace {
    fn new(fastqs: &[&str], engine_exit_code: i32) -> Result<Workspace> {
        let root = tempfile::tempdir()?;
        fs::create_dir(root.path().join("reads"))?;
        for name in fastqs {
            File::create(root.path().join("reads").join(name))?;
        }
        fs::create_dir(root.path().join("bin"))?;
        let engine = root.path().join("bin/snakemake");
        fs::write(
            &engine,
            format!(
                "#!/bin/sh\nprintf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args.txt\"\nexit {engine_exit_code}\n"
            ),
        )?;
        fs::set_permissions(&engine, fs::Permissions::from_mode(0o755))?;
        Ok(Workspace { root })
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        let path = std::env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![self.path().join("bin")];
        paths.extend(std::env::split_paths(&path));
        Ok(Command::new(JUNO_AMR)
            .args(["-i", "reads"])
            .args(args)
            .current_dir(self.path())
            .env("PATH", std::env::join_paths(paths)?)
            .env_remove("JUNO_AMR_ENGINE_TOML")
            .output()?)
    }

    fn config_path(&self) -> PathBuf {
        self.path().join(CONFIG_DOCUMENT_PATH)
    }

    fn engine_args(&self) -> Result<Vec<String>> {
        Ok(fs::read_to_string(self.path().join("bin/args.txt"))?
            .lines()
            .map(String::from)
            .collect())
    }
}

#[test]
fn test_dry_run() -> Result<()> {
    let ws = Workspace::new(&["sample1_R1.fastq", "sample1_R2.fastq"], 0)?;
    let output = ws.run(&["-s", "other", "-n"])?;
    assert!(output.status.success(), "{output:?}");

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Dry Run Mode"), "{stdout}");

    let args = ws.engine_args()?;
    assert!(args.iter().any(|a| a == "--dry-run"), "{args:?}");
    assert!(args.iter().any(|a| a == "--use-conda"), "{args:?}");
    assert!(
        args.iter().any(|a| a == &format!("--configfile={CONFIG_DOCUMENT_PATH}")),
        "{args:?}"
    );

    let doc = ConfigDocument::read(&ws.config_path())?;
    assert_eq!(doc.parameters.species.as_str(), "other");
    assert_eq!(doc.parameters.run_pointfinder, Toggle::Off);
    assert!(doc.parameters.dryrun);
    let reads = ws.path().join("reads").canonicalize()?;
    assert_eq!(doc.samples_fastq_r1["sample1"], reads.join("sample1_R1.fastq"));
    assert_eq!(doc.samples_fastq_r2["sample1"], reads.join("sample1_R2.fastq"));
    Ok(())
}

#[test]
fn test_engine_exit_code_is_passed_through() -> Result<()> {
    let ws = Workspace::new(&["sample1_R1.fastq", "sample1_R2.fastq"], 3)?;
    let output = ws.run(&["-s", "other", "--jobmode", "drmaa", "-o", "results"])?;
    assert_eq!(output.status.code(), Some(3), "{output:?}");

    // the document exists, so the run can simply be repeated
    assert!(ws.config_path().exists());
    assert!(ws.path().join("results/log/drmaa").is_dir());
    let args = ws.engine_args()?;
    assert!(args.iter().any(|a| a.starts_with("--drmaa=-q bio ")), "{args:?}");
    assert!(!args.iter().any(|a| a == "--dry-run"), "{args:?}");
    Ok(())
}

#[test]
fn test_disallowed_extension_writes_nothing() -> Result<()> {
    let ws = Workspace::new(&["sample1_R1.fastq", "sample1_R2.fastq", "random.txt"], 0)?;
    let output = ws.run(&["-s", "other"])?;
    assert_eq!(output.status.code(), Some(1), "{output:?}");
    assert!(String::from_utf8(output.stderr)?.contains("random.txt"));
    assert!(!ws.config_path().exists());
    assert!(!ws.path().join("bin/args.txt").exists());
    Ok(())
}

#[test]
fn test_unknown_species_writes_nothing() -> Result<()> {
    let ws = Workspace::new(&["sample1_R1.fastq", "sample1_R2.fastq"], 0)?;
    fs::create_dir_all(ws.path().join("db/salmonella"))?;
    let output = ws.run(&["-s", "listeria", "-db_point", "db"])?;
    assert_eq!(output.status.code(), Some(1), "{output:?}");
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("salmonella"), "{stderr}");
    assert!(!ws.config_path().exists());
    Ok(())
}

#[test]
fn test_missing_species_is_a_usage_error() -> Result<()> {
    let ws = Workspace::new(&["sample1_R1.fastq", "sample1_R2.fastq"], 0)?;
    let output = ws.run(&[])?;
    assert_eq!(output.status.code(), Some(2), "{output:?}");
    assert!(String::from_utf8(output.stderr)?.contains("--species"));
    assert!(!ws.config_path().exists());
    Ok(())
}
