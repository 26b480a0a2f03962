use crate::error::ConfigurationError;
use anyhow::{bail, Context, Result};
use log::{debug, warn};
use regex::Regex;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// File extensions accepted in the input directory.
pub const ALLOWED_FASTQ_EXTENSIONS: [&str; 4] = [".fastq", ".fq", ".fastq.gz", ".fq.gz"];

pub fn has_fastq_extension(filename: &str) -> bool {
    ALLOWED_FASTQ_EXTENSIONS
        .iter()
        .any(|ext| filename.len() > ext.len() && filename.ends_with(ext))
}

/// List the files of a FASTQ input directory, sorted by name.
/// Hidden entries are ignored. Every other entry must be a FASTQ file.
pub fn list_fastq_dir(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        bail!(ConfigurationError::NotADirectory(dir.to_path_buf()));
    }

    let mut filenames = Vec::new();
    let mut disallowed = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| dir.display().to_string())? {
        let entry = entry.with_context(|| dir.display().to_string())?;
        let filename = entry.file_name().to_string_lossy().into_owned();
        if filename.starts_with('.') {
            debug!("ignoring hidden entry {filename}");
            continue;
        }
        if has_fastq_extension(&filename) && !entry.path().is_dir() {
            filenames.push(filename);
        } else {
            disallowed.push(filename);
        }
    }

    if !disallowed.is_empty() {
        disallowed.sort();
        bail!(ConfigurationError::DisallowedExtension { files: disallowed });
    }
    filenames.sort();
    Ok(filenames)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadIndex {
    R1,
    R2,
}

impl Display for ReadIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ReadIndex::R1 => "R1",
            ReadIndex::R2 => "R2",
        })
    }
}

/// A FASTQ file name classified against the paired-end naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FastqName {
    Matched { sample: String, read: ReadIndex },
    Unmatched(String),
}

// An explicit R/pR marker wins over a bare read digit, so in `isolate_1_R2.fastq`
// the `1` belongs to the sample.
fn fastq_name_regexes() -> &'static [Regex; 2] {
    static FASTQ_NAME: OnceLock<[Regex; 2]> = OnceLock::new();
    FASTQ_NAME.get_or_init(|| {
        [
            r"^(.+?)(?:_S\d+)?[_.]p?R([12])(?:_\d+)?\.f(?:ast)?q(?:\.gz)?$",
            r"^(.+?)(?:_S\d+)?[_.]p?([12])(?:_\d+)?\.f(?:ast)?q(?:\.gz)?$",
        ]
        .map(|pattern| Regex::new(pattern).expect("invalid FASTQ name regex"))
    })
}

/// Split a file name such as `sample1_R1.fastq.gz` or `sample1_S3_pR2_001.fq`
/// into its sample name and read index.
pub fn parse_fastq_name(filename: &str) -> FastqName {
    let Some(caps) = fastq_name_regexes()
        .iter()
        .find_map(|regex| regex.captures(filename))
    else {
        return FastqName::Unmatched(filename.to_string());
    };
    let read = match &caps[2] {
        "1" => ReadIndex::R1,
        _ => ReadIndex::R2,
    };
    FastqName::Matched {
        sample: caps[1].to_string(),
        read,
    }
}

/// What to do with files that cannot be assigned to a complete read pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedPolicy {
    Warn,
    Fail,
}

/// The read 1 and read 2 files of each sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleFastqs {
    pub r1: BTreeMap<String, PathBuf>,
    pub r2: BTreeMap<String, PathBuf>,
}

impl SampleFastqs {
    /// Assign the FASTQ files of `dir` to samples.
    pub fn discover(dir: &Path, policy: UnmatchedPolicy) -> Result<SampleFastqs> {
        let filenames = list_fastq_dir(dir)?;
        Self::from_filenames(dir, &filenames, policy)
    }

    /// Assign `filenames`, which live in `dir`, to samples.
    pub fn from_filenames(
        dir: &Path,
        filenames: &[String],
        policy: UnmatchedPolicy,
    ) -> Result<SampleFastqs> {
        let mut samples = SampleFastqs::default();
        let mut unmatched = Vec::new();
        let mut duplicates = Vec::new();

        for filename in filenames {
            match parse_fastq_name(filename) {
                FastqName::Matched { sample, read } => {
                    let reads = match read {
                        ReadIndex::R1 => &mut samples.r1,
                        ReadIndex::R2 => &mut samples.r2,
                    };
                    match reads.entry(sample) {
                        Entry::Vacant(e) => {
                            e.insert(dir.join(filename));
                        }
                        Entry::Occupied(e) => {
                            warn!(
                                "ignoring {filename}: sample {} already has a {read} file {}",
                                e.key(),
                                e.get().display()
                            );
                            duplicates.push(filename.clone());
                        }
                    }
                }
                FastqName::Unmatched(filename) => {
                    warn!("skipping {filename}: not named like <sample>_R1/<sample>_R2");
                    unmatched.push(filename);
                }
            }
        }

        if policy == UnmatchedPolicy::Fail && !unmatched.is_empty() {
            bail!(ConfigurationError::UnmatchedFastqNames { files: unmatched });
        }
        if policy == UnmatchedPolicy::Fail && !duplicates.is_empty() {
            bail!(ConfigurationError::DuplicateReads { files: duplicates });
        }

        let unpaired = samples.unpaired();
        for sample in &unpaired {
            warn!("sample {sample} does not have both an R1 and an R2 file");
        }
        if policy == UnmatchedPolicy::Fail && !unpaired.is_empty() {
            bail!(ConfigurationError::UnpairedSamples { samples: unpaired });
        }

        if samples.r1.is_empty() && samples.r2.is_empty() {
            warn!("no paired-end FASTQ files found in {}", dir.display());
        }
        Ok(samples)
    }

    /// Samples that are present in only one of the two read maps.
    pub fn unpaired(&self) -> Vec<String> {
        let only_r1 = self.r1.keys().filter(|s| !self.r2.contains_key(*s));
        let only_r2 = self.r2.keys().filter(|s| !self.r1.contains_key(*s));
        let mut samples: Vec<String> = only_r1.chain(only_r2).cloned().collect();
        samples.sort();
        samples
    }
}
