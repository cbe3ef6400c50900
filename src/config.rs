use std::path::Path;

use serde::Deserialize;

use crate::error::LoadError;

/// Loader settings. Every field has a default, so a config file only needs
/// the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    /// Field delimiter for CSV sources.
    pub delimiter: char,
    /// Largest accepted source file, in bytes.
    pub max_bytes: u64,
    /// Largest accepted number of data rows.
    pub max_rows: usize,
    /// Reject tables where a neighborhood name appears on more than one row.
    pub require_unique_names: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            max_bytes: 256 * 1024 * 1024,
            max_rows: 1_000_000,
            require_unique_names: true,
        }
    }
}

impl LoaderConfig {
    /// Read a JSON config file, e.g. `{ "delimiter": ";", "max_rows": 500 }`.
    pub fn from_json_file(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LoadError::Config(format!("reading {}: {e}", path.display())))?;
        let config: LoaderConfig = serde_json::from_str(&text)
            .map_err(|e| LoadError::Config(format!("parsing {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), LoadError> {
        if !self.delimiter.is_ascii() {
            return Err(LoadError::Config(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        if self.max_rows == 0 || self.max_bytes == 0 {
            return Err(LoadError::Config("size limits must be positive".into()));
        }
        Ok(())
    }

    pub(crate) fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }
}
