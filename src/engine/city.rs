use std::collections::BTreeMap;

use serde::Serialize;

use super::columns;
use crate::data::model::{CellValue, Dataset};
use crate::error::Diagnostic;

/// Per-neighborhood row of the population × income correlation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodTotals {
    pub name: String,
    pub population: f64,
    pub mean_income: Option<f64>,
}

/// Per-neighborhood point of the income × variance scatter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncomeDispersion {
    pub name: String,
    pub mean_income: Option<f64>,
    pub mean_variance: Option<f64>,
}

/// Dataset-wide figures, always computed over the unfiltered table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAggregate {
    pub total_population: f64,
    pub total_male: f64,
    pub total_female: f64,
    /// Unweighted mean of the neighborhood average incomes.
    pub mean_income: Option<f64>,
    /// Grouped by neighborhood name, sorted by name.
    pub by_neighborhood: Vec<NeighborhoodTotals>,
    /// Present only when the table has an income variance column.
    pub income_dispersion: Option<Vec<IncomeDispersion>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Running sum/count pair. Empty cells are skipped, as a dataframe does.
#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    sum: f64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

#[derive(Default)]
struct Group {
    population: Accumulator,
    income: Accumulator,
    variance: Accumulator,
}

/// Column reader that records text cells it had to skip.
struct Reader<'a> {
    dataset: &'a Dataset,
    diagnostics: Vec<Diagnostic>,
}

impl Reader<'_> {
    fn number(&mut self, row: usize, column: &str) -> Option<f64> {
        match self.dataset.cell(row, column)? {
            CellValue::Null => None,
            cell => {
                let value = cell.as_f64();
                if value.is_none() {
                    log::warn!("row {row}: '{column}' is not a number, skipped");
                    self.diagnostics.push(Diagnostic::NonNumericValue {
                        column: column.to_string(),
                        row,
                    });
                }
                value
            }
        }
    }
}

pub fn city_aggregate(dataset: &Dataset) -> CityAggregate {
    let mut reader = Reader {
        dataset,
        diagnostics: Vec::new(),
    };
    let mut male = Accumulator::default();
    let mut female = Accumulator::default();
    let mut population = Accumulator::default();
    let mut income = Accumulator::default();
    let mut groups: BTreeMap<String, Group> = BTreeMap::new();

    for row in 0..dataset.len() {
        let group = groups.entry(dataset.name_of(row)).or_default();

        if let Some(v) = reader.number(row, columns::POPULATION) {
            population.add(v);
            group.population.add(v);
        }
        if let Some(v) = reader.number(row, columns::MALE) {
            male.add(v);
        }
        if let Some(v) = reader.number(row, columns::FEMALE) {
            female.add(v);
        }
        if let Some(v) = reader.number(row, columns::AVERAGE_INCOME) {
            income.add(v);
            group.income.add(v);
        }
        if let Some(v) = reader.number(row, columns::INCOME_VARIANCE) {
            group.variance.add(v);
        }
    }

    let by_neighborhood = groups
        .iter()
        .map(|(name, g)| NeighborhoodTotals {
            name: name.clone(),
            population: g.population.sum,
            mean_income: g.income.mean(),
        })
        .collect();

    let income_dispersion = dataset.has_column(columns::INCOME_VARIANCE).then(|| {
        groups
            .iter()
            .map(|(name, g)| IncomeDispersion {
                name: name.clone(),
                mean_income: g.income.mean(),
                mean_variance: g.variance.mean(),
            })
            .collect()
    });

    log::debug!(
        "city aggregate over {} rows, {} neighborhoods",
        dataset.len(),
        groups.len()
    );

    CityAggregate {
        total_population: population.sum,
        total_male: male.sum,
        total_female: female.sum,
        mean_income: income.mean(),
        by_neighborhood,
        income_dispersion,
        diagnostics: reader.diagnostics,
    }
}
