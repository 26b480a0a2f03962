use crate::error::ConfigurationError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display, Formatter};
use std::path::Path;

/// Species token for samples without a PointFinder database.
pub const OTHER_SPECIES: &str = "other";

/// Species known to PointFinder: the names of the visible subdirectories of
/// the database, lowercased and sorted.
pub fn pointfinder_species(pointfinder_db: &Path) -> Result<Vec<String>> {
    let db_error = |source| ConfigurationError::SpeciesDatabase {
        path: pointfinder_db.to_path_buf(),
        source,
    };

    let mut species = Vec::new();
    for entry in std::fs::read_dir(pointfinder_db).map_err(db_error)? {
        let entry = entry.map_err(db_error)?;
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if !name.starts_with('.') && entry.path().is_dir() {
            species.push(name);
        }
    }
    species.sort();
    Ok(species)
}

/// Replace underscores with spaces: `escherichia_coli` becomes `escherichia coli`.
pub fn normalize_species_name(name: &str) -> String {
    name.replace('_', " ")
}

/// A validated, lowercase species name.
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Species(String);

impl Species {
    /// Check a command-line species token against the species of the
    /// PointFinder database. `other` is always accepted and does not
    /// require the database to exist.
    pub fn resolve(token: &str, pointfinder_db: &Path) -> Result<Species> {
        let token = token.trim().to_lowercase();
        if token == OTHER_SPECIES {
            return Ok(Species(token));
        }

        let mut options = pointfinder_species(pointfinder_db)?;
        let wanted = normalize_species_name(&token);
        if options
            .iter()
            .any(|option| normalize_species_name(option) == wanted)
        {
            Ok(Species(token))
        } else {
            options.push(OTHER_SPECIES.to_string());
            Err(ConfigurationError::UnknownSpecies {
                species: token,
                options,
            }
            .into())
        }
    }

    /// The species name with underscores replaced by spaces.
    pub fn normalized(&self) -> Species {
        Species(normalize_species_name(&self.0))
    }

    pub fn is_other(&self) -> bool {
        self.0.eq_ignore_ascii_case(OTHER_SPECIES)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Debug for Species {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}
