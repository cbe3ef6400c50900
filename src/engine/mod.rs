//! Aggregation engine: pure derivations over a loaded [`Dataset`].
//!
//! Every function here takes the dataset (and a row or key) by reference
//! and returns a fresh value. Nothing is cached and nothing is mutated, so
//! calling the same function twice yields identical results.

pub mod age_sex;
pub mod city;
pub mod columns;
pub mod household;
pub mod snapshot;

pub use age_sex::{age_sex_distribution, AgeBand, AgeSexDistribution};
pub use city::{city_aggregate, CityAggregate, IncomeDispersion, NeighborhoodTotals};
pub use household::{household_type_distribution, HouseholdType, HouseholdTypeDistribution};
pub use snapshot::{sex_split, snapshot, snapshot_row, NeighborhoodSnapshot, SexSplit};

use crate::data::model::Dataset;

/// Outcome of reading one numeric cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum NumberLookup {
    Value(f64),
    MissingColumn,
    /// Empty cell, text, or NaN.
    NotNumeric,
}

pub(crate) fn read_number(dataset: &Dataset, row: usize, column: &str) -> NumberLookup {
    match dataset.cell(row, column) {
        None => NumberLookup::MissingColumn,
        Some(cell) => cell
            .as_f64()
            .map_or(NumberLookup::NotNumeric, NumberLookup::Value),
    }
}
