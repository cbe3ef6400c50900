use serde::Serialize;

use super::columns;
use super::{read_number, NumberLookup};
use crate::data::model::Dataset;
use crate::error::AggregationError;

/// Dwelling type of an occupied permanent private household.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseholdType {
    House,
    RowHouseOrCondominium,
    Apartment,
    TenementRoom,
}

impl HouseholdType {
    pub const ALL: [HouseholdType; 4] = [
        HouseholdType::House,
        HouseholdType::RowHouseOrCondominium,
        HouseholdType::Apartment,
        HouseholdType::TenementRoom,
    ];

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            HouseholdType::House => "Casa",
            HouseholdType::RowHouseOrCondominium => "Casa de vila ou condomínio",
            HouseholdType::Apartment => "Apartamento",
            HouseholdType::TenementRoom => "Casa de cômodos ou cortiço",
        }
    }

    /// Source column holding the count.
    pub fn column(self) -> &'static str {
        match self {
            HouseholdType::House => columns::HOUSE,
            HouseholdType::RowHouseOrCondominium => columns::ROW_HOUSE,
            HouseholdType::Apartment => columns::APARTMENT,
            HouseholdType::TenementRoom => columns::TENEMENT,
        }
    }
}

/// Household counts for all four types, in [`HouseholdType::ALL`] order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HouseholdTypeDistribution {
    pub counts: Vec<(HouseholdType, f64)>,
}

impl HouseholdTypeDistribution {
    pub fn get(&self, kind: HouseholdType) -> f64 {
        self.counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0.0, |(_, v)| *v)
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().map(|(_, v)| v).sum()
    }

    /// Share of the total for a pie slice; `None` when there are no households.
    pub fn share(&self, kind: HouseholdType) -> Option<f64> {
        let total = self.total();
        (total > 0.0).then(|| self.get(kind) / total)
    }
}

/// All-or-nothing: any missing column or non-numeric cell fails the whole
/// distribution.
pub fn household_type_distribution(
    dataset: &Dataset,
    row: usize,
) -> Result<HouseholdTypeDistribution, AggregationError> {
    let counts = HouseholdType::ALL
        .iter()
        .map(|&kind| {
            let column = kind.column();
            match read_number(dataset, row, column) {
                NumberLookup::Value(v) => Ok((kind, v)),
                NumberLookup::MissingColumn => {
                    Err(AggregationError::MissingColumn(column.to_string()))
                }
                NumberLookup::NotNumeric => Err(AggregationError::NonNumericValue {
                    column: column.to_string(),
                    neighborhood: dataset.name_of(row),
                }),
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|e| log::warn!("household distribution for row {row} failed: {e}"))?;

    Ok(HouseholdTypeDistribution { counts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, RawRecord};

    fn dataset(skip: Option<HouseholdType>) -> Dataset {
        let kinds: Vec<HouseholdType> = HouseholdType::ALL
            .into_iter()
            .filter(|k| Some(*k) != skip)
            .collect();
        let mut cols = vec![columns::NAME.to_string()];
        cols.extend(kinds.iter().map(|k| k.column().to_string()));
        let mut cells = vec![CellValue::String("Centro".into())];
        cells.extend((1..=kinds.len() as i64).map(|i| CellValue::Integer(i * 10)));
        Dataset::new(cols, vec![RawRecord { cells }])
    }

    #[test]
    fn reads_all_four_types() {
        let dist = household_type_distribution(&dataset(None), 0).unwrap();
        assert_eq!(dist.counts.len(), 4);
        assert_eq!(dist.get(HouseholdType::House), 10.0);
        assert_eq!(dist.get(HouseholdType::TenementRoom), 40.0);
        assert_eq!(dist.total(), 100.0);
        assert_eq!(dist.share(HouseholdType::Apartment), Some(0.3));
    }

    #[test]
    fn any_missing_column_fails_everything() {
        for kind in HouseholdType::ALL {
            let err = household_type_distribution(&dataset(Some(kind)), 0).unwrap_err();
            assert_eq!(err, AggregationError::MissingColumn(kind.column().to_string()));
        }
    }

    #[test]
    fn empty_cell_fails_everything() {
        let mut ds_cols = vec![columns::NAME.to_string()];
        ds_cols.extend(HouseholdType::ALL.iter().map(|k| k.column().to_string()));
        let ds = Dataset::new(
            ds_cols,
            vec![RawRecord {
                cells: vec![
                    CellValue::String("Centro".into()),
                    CellValue::Integer(1),
                    CellValue::Null,
                    CellValue::Integer(1),
                    CellValue::Integer(1),
                ],
            }],
        );
        assert_eq!(
            household_type_distribution(&ds, 0),
            Err(AggregationError::NonNumericValue {
                column: columns::ROW_HOUSE.into(),
                neighborhood: "Centro".into()
            })
        );
    }
}
