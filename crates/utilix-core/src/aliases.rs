//! Header alias table mapping spreadsheet column names to request fields.
//!
//! Headers are compared after [`canonical_header`]: trimmed, lower-cased,
//! and with every whitespace run collapsed into a single `_`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Request field a spreadsheet column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Apn,
    StreetAddress,
    County,
    State,
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanonicalField::Apn => write!(f, "apn"),
            CanonicalField::StreetAddress => write!(f, "street_address"),
            CanonicalField::County => write!(f, "county"),
            CanonicalField::State => write!(f, "state"),
        }
    }
}

/// Canonical form of a column header used for alias matching.
#[must_use]
pub fn canonical_header(header: &str) -> String {
    header
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Lookup from canonical header to the field it populates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: HashMap<String, CanonicalField>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let entries = [
            ("apn", CanonicalField::Apn),
            ("pan", CanonicalField::Apn),
            ("address", CanonicalField::StreetAddress),
            ("county", CanonicalField::County),
            ("state", CanonicalField::State),
        ]
        .into_iter()
        .map(|(alias, field)| (alias.to_string(), field))
        .collect();
        Self { entries }
    }
}

impl AliasTable {
    /// Returns the field a header maps to, or `None` for unrecognized headers.
    #[must_use]
    pub fn resolve(&self, header: &str) -> Option<CanonicalField> {
        self.entries.get(&canonical_header(header)).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Builds a table from a YAML document shaped like
    /// `aliases: { apn: [apn, pan], county: [county] }`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AliasFileParse`] for malformed YAML and
    /// [`ConfigError::Validation`] for empty or conflicting aliases.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let file: AliasFile = serde_yaml::from_str(content).map_err(ConfigError::AliasFileParse)?;

        let mut entries = HashMap::new();
        for (field, aliases) in file.aliases {
            for alias in aliases {
                let key = canonical_header(&alias);
                if key.is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "empty alias configured for field '{field}'"
                    )));
                }
                if let Some(existing) = entries.insert(key.clone(), field) {
                    if existing != field {
                        return Err(ConfigError::Validation(format!(
                            "alias '{key}' maps to both '{existing}' and '{field}'"
                        )));
                    }
                }
            }
        }

        Ok(Self { entries })
    }
}

#[derive(Debug, Deserialize)]
struct AliasFile {
    aliases: BTreeMap<CanonicalField, Vec<String>>,
}

/// Load and validate a header alias table from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_aliases(path: &Path) -> Result<AliasTable, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::AliasFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    AliasTable::from_yaml_str(&content)
}
