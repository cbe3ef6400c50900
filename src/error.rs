//! Error and diagnostic types.
//!
//! Fatal conditions are `thiserror` enums. Conditions a dashboard can live
//! with (a missing optional column, an unpaired age band) are [`Diagnostic`]
//! values carried next to the derived structure instead.

use std::path::PathBuf;

use serde::Serialize;

/// Failure to produce a [`Dataset`](crate::data::model::Dataset). Fatal for
/// the session: the caller stops the pipeline and reports it.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("source not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("source {} could not be read as a table: {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    #[error("source {} exceeds the limit of {limit} {unit}", path.display())]
    SourceTooLarge {
        path: PathBuf,
        limit: u64,
        unit: &'static str,
    },

    #[error("required column '{column}' is missing")]
    MissingRequiredColumn { column: String },

    #[error("neighborhood '{name}' appears on rows {first_row} and {second_row}")]
    DuplicateNeighborhood {
        name: String,
        first_row: usize,
        second_row: usize,
    },

    #[error("invalid loader configuration: {0}")]
    Config(String),
}

/// Failure of a single derivation. Other derivations for the same
/// neighborhood are unaffected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AggregationError {
    #[error("no neighborhood matches '{0}'")]
    UnknownNeighborhood(String),

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("column '{column}' holds a non-numeric value for neighborhood '{neighborhood}'")]
    NonNumericValue {
        column: String,
        neighborhood: String,
    },
}

/// A recoverable gap found while deriving a structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// An optional column is absent; the field it feeds is left empty.
    MissingOptionalColumn { column: String },
    /// A male age-band column has no female counterpart.
    UnpairedAgeColumn {
        male_column: String,
        expected_female: String,
    },
    /// A cell that should be a number is empty or text.
    NonNumericValue { column: String, row: usize },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::MissingOptionalColumn { column } => {
                write!(f, "column not found: {column}")
            }
            Diagnostic::UnpairedAgeColumn {
                male_column,
                expected_female,
            } => write!(f, "'{male_column}' has no partner column '{expected_female}'"),
            Diagnostic::NonNumericValue { column, row } => {
                write!(f, "row {row}: '{column}' is not a number")
            }
        }
    }
}
