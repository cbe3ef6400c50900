use serde::Serialize;

use super::columns;
use super::{read_number, NumberLookup};
use crate::data::model::Dataset;
use crate::error::{AggregationError, Diagnostic};

/// Scalar figures for one neighborhood.
///
/// The three identity counts are always present. Optional figures are
/// `None` when their column is missing or the cell is not a number; the
/// reason is recorded in `diagnostics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodSnapshot {
    /// Row of the source table the figures came from.
    pub row: usize,
    pub name: String,
    pub code: String,
    pub population: f64,
    pub male: f64,
    pub female: f64,
    pub responsible_persons: Option<f64>,
    /// Residents in permanent private households.
    pub household_residents: Option<f64>,
    pub average_income: Option<f64>,
    pub income_variance: Option<f64>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Snapshot of the first row whose name or code equals `key`.
pub fn snapshot(dataset: &Dataset, key: &str) -> Result<NeighborhoodSnapshot, AggregationError> {
    let row = (0..dataset.len())
        .find(|&row| dataset.name_of(row) == key || dataset.code_of(row) == key)
        .ok_or_else(|| AggregationError::UnknownNeighborhood(key.to_string()))?;
    snapshot_row(dataset, row)
}

/// Snapshot of a known row.
pub fn snapshot_row(
    dataset: &Dataset,
    row: usize,
) -> Result<NeighborhoodSnapshot, AggregationError> {
    if row >= dataset.len() {
        return Err(AggregationError::UnknownNeighborhood(format!("row {row}")));
    }
    let name = dataset.name_of(row);
    let required = |column: &str| match read_number(dataset, row, column) {
        NumberLookup::Value(v) => Ok(v),
        NumberLookup::MissingColumn => Err(AggregationError::MissingColumn(column.to_string())),
        NumberLookup::NotNumeric => Err(AggregationError::NonNumericValue {
            column: column.to_string(),
            neighborhood: name.clone(),
        }),
    };
    let population = required(columns::POPULATION)?;
    let male = required(columns::MALE)?;
    let female = required(columns::FEMALE)?;

    let mut diagnostics = Vec::new();
    let mut optional = |column: &str| match read_number(dataset, row, column) {
        NumberLookup::Value(v) => Some(v),
        NumberLookup::MissingColumn => {
            log::warn!("{name}: optional column not found: {column}");
            diagnostics.push(Diagnostic::MissingOptionalColumn {
                column: column.to_string(),
            });
            None
        }
        NumberLookup::NotNumeric => {
            log::warn!("{name}: '{column}' is not a number");
            diagnostics.push(Diagnostic::NonNumericValue {
                column: column.to_string(),
                row,
            });
            None
        }
    };
    let responsible_persons = optional(columns::RESPONSIBLE_PERSONS);
    let household_residents = optional(columns::HOUSEHOLD_RESIDENTS);
    let average_income = optional(columns::AVERAGE_INCOME);
    let income_variance = optional(columns::INCOME_VARIANCE);

    Ok(NeighborhoodSnapshot {
        row,
        code: dataset.code_of(row),
        name,
        population,
        male,
        female,
        responsible_persons,
        household_residents,
        average_income,
        income_variance,
        diagnostics,
    })
}

/// Male/female counts for the sex bar chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SexSplit {
    pub male: f64,
    pub female: f64,
}

impl SexSplit {
    pub fn total(&self) -> f64 {
        self.male + self.female
    }

    /// Male share of `male + female`; `None` for an empty neighborhood.
    pub fn male_share(&self) -> Option<f64> {
        let total = self.total();
        (total > 0.0).then(|| self.male / total)
    }

    pub fn female_share(&self) -> Option<f64> {
        self.male_share().map(|m| 1.0 - m)
    }
}

pub fn sex_split(snapshot: &NeighborhoodSnapshot) -> SexSplit {
    SexSplit {
        male: snapshot.male,
        female: snapshot.female,
    }
}
