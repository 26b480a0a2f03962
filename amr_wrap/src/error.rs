use crate::fastqs::ALLOWED_FASTQ_EXTENSIONS;
use std::path::PathBuf;

/// Input that parsed correctly but cannot be run. Reported before anything is written.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("\"{}\" is not a directory. Give an existing directory.", .0.display())]
    NotADirectory(PathBuf),

    #[error(
        "files in the input directory do not have a correct file format. \
         Please give a directory with files in the format: {}\nOffending files:\n{}",
        ALLOWED_FASTQ_EXTENSIONS.join(", "),
        .files.join("\n")
    )]
    DisallowedExtension { files: Vec<String> },

    #[error("invalid species \"{species}\". Options: {}", .options.join(", "))]
    UnknownSpecies {
        species: String,
        options: Vec<String>,
    },

    #[error("could not read the PointFinder species from \"{}\"", .path.display())]
    SpeciesDatabase {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "the following files do not follow the <sample>_R1/<sample>_R2 naming convention:\n{}",
        .files.join("\n")
    )]
    UnmatchedFastqNames { files: Vec<String> },

    #[error(
        "more than one file was found for the same sample and read:\n{}",
        .files.join("\n")
    )]
    DuplicateReads { files: Vec<String> },

    #[error("the following samples are missing one of their read files:\n{}", .samples.join("\n"))]
    UnpairedSamples { samples: Vec<String> },
}
