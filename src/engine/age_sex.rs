use serde::Serialize;

use super::columns;
use super::{read_number, NumberLookup};
use crate::data::model::Dataset;
use crate::error::Diagnostic;

/// One age band of the population pyramid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeBand {
    /// e.g. `"0 a 4 anos"`.
    pub label: String,
    pub male: f64,
    pub female: f64,
}

/// Age bands in the order their male columns appear in the source, plus the
/// gaps skipped on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AgeSexDistribution {
    pub bands: Vec<AgeBand>,
    pub diagnostics: Vec<Diagnostic>,
}

impl AgeSexDistribution {
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

/// Male age-band columns of the table, in header order.
pub fn male_age_columns(dataset: &Dataset) -> impl Iterator<Item = &str> {
    dataset
        .columns()
        .iter()
        .map(String::as_str)
        .filter(|c| c.contains(columns::MALE) && c.contains(columns::AGE_UNIT))
}

/// Pair every male age column of `row` with its female counterpart.
///
/// The female column name is the male one with the sex label replaced
/// literally. A band whose partner is missing, or whose cells are not
/// numbers, is left out and reported in `diagnostics`.
pub fn age_sex_distribution(dataset: &Dataset, row: usize) -> AgeSexDistribution {
    let mut dist = AgeSexDistribution::default();

    for male_column in male_age_columns(dataset) {
        let female_column = male_column.replace(columns::MALE, columns::FEMALE);
        if !dataset.has_column(&female_column) {
            log::warn!("age band '{male_column}' has no partner '{female_column}'");
            dist.diagnostics.push(Diagnostic::UnpairedAgeColumn {
                male_column: male_column.to_string(),
                expected_female: female_column,
            });
            continue;
        }

        let male = read_number(dataset, row, male_column);
        let female = read_number(dataset, row, &female_column);
        match (male, female) {
            (NumberLookup::Value(male), NumberLookup::Value(female)) => {
                dist.bands.push(AgeBand {
                    label: male_column.replace(columns::AGE_LABEL_PREFIX, ""),
                    male,
                    female,
                });
            }
            (male, _) => {
                let column = if matches!(male, NumberLookup::Value(_)) {
                    female_column
                } else {
                    male_column.to_string()
                };
                log::warn!("row {row}: age band '{column}' is not a number");
                dist.diagnostics
                    .push(Diagnostic::NonNumericValue { column, row });
            }
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, RawRecord};

    fn dataset(columns: &[&str], cells: Vec<CellValue>) -> Dataset {
        Dataset::new(
            columns.iter().map(|c| c.to_string()).collect(),
            vec![RawRecord { cells }],
        )
    }

    #[test]
    fn pairs_columns_in_source_order() {
        let ds = dataset(
            &[
                "Sexo masculino",
                "Sexo masculino, 5 a 9 anos",
                "Sexo feminino, 0 a 4 anos",
                "Sexo masculino, 0 a 4 anos",
                "Sexo feminino, 5 a 9 anos",
            ],
            vec![
                CellValue::Integer(30),
                CellValue::Integer(11),
                CellValue::Integer(22),
                CellValue::Integer(19),
                CellValue::Float(12.0),
            ],
        );
        let dist = age_sex_distribution(&ds, 0);
        assert_eq!(
            dist.bands,
            vec![
                AgeBand {
                    label: "5 a 9 anos".into(),
                    male: 11.0,
                    female: 12.0
                },
                AgeBand {
                    label: "0 a 4 anos".into(),
                    male: 19.0,
                    female: 22.0
                },
            ]
        );
        assert!(dist.diagnostics.is_empty());
    }

    #[test]
    fn unpaired_band_is_a_gap() {
        let ds = dataset(
            &[
                "Sexo masculino, 0 a 4 anos",
                "Sexo feminino, 0 a 4 anos",
                "Sexo masculino, 100 anos ou mais",
            ],
            vec![
                CellValue::Integer(1),
                CellValue::Integer(2),
                CellValue::Integer(3),
            ],
        );
        let dist = age_sex_distribution(&ds, 0);
        assert_eq!(dist.len(), 1);
        assert_eq!(
            dist.diagnostics,
            vec![Diagnostic::UnpairedAgeColumn {
                male_column: "Sexo masculino, 100 anos ou mais".into(),
                expected_female: "Sexo feminino, 100 anos ou mais".into(),
            }]
        );
    }

    #[test]
    fn non_numeric_band_is_a_gap() {
        let ds = dataset(
            &["Sexo masculino, 0 a 4 anos", "Sexo feminino, 0 a 4 anos"],
            vec![CellValue::Integer(1), CellValue::Null],
        );
        let dist = age_sex_distribution(&ds, 0);
        assert!(dist.is_empty());
        assert_eq!(
            dist.diagnostics,
            vec![Diagnostic::NonNumericValue {
                column: "Sexo feminino, 0 a 4 anos".into(),
                row: 0
            }]
        );
    }

    #[test]
    fn no_age_columns_gives_empty_distribution() {
        let ds = dataset(&["Sexo masculino"], vec![CellValue::Integer(3)]);
        assert_eq!(age_sex_distribution(&ds, 0), AgeSexDistribution::default());
    }
}
