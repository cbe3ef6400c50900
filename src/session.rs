use std::sync::Arc;

use serde::Serialize;

use crate::data::filter::{select, FilterSelection};
use crate::data::model::Dataset;
use crate::engine::{
    age_sex_distribution, city_aggregate, household_type_distribution, sex_split, snapshot_row,
    AgeSexDistribution, CityAggregate, HouseholdTypeDistribution, NeighborhoodSnapshot, SexSplit,
};

// ---------------------------------------------------------------------------
// Derived report handed to a presentation sink
// ---------------------------------------------------------------------------

/// Everything a dashboard shows for one selected neighborhood.
///
/// A failing derivation is kept as its error text so the others still
/// render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NeighborhoodReport {
    pub snapshot: NeighborhoodSnapshot,
    pub sex_split: SexSplit,
    pub age_sex: AgeSexDistribution,
    pub households: Result<HouseholdTypeDistribution, String>,
}

/// Full derived state for one (dataset, selection) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub city: CityAggregate,
    /// True when the consumer selected nothing, i.e. no detail analysis was
    /// requested.
    pub selection_empty: bool,
    /// Empty when nothing is selected or nothing matched.
    pub neighborhoods: Vec<NeighborhoodReport>,
    /// Rows that matched the selection but could not be summarized.
    pub errors: Vec<String>,
}

impl DashboardReport {
    /// Whether there is any per-neighborhood output to show.
    pub fn has_detail(&self) -> bool {
        !self.neighborhoods.is_empty() || !self.errors.is_empty()
    }

    /// A selection was made but no row matched it.
    pub fn selection_unmatched(&self) -> bool {
        !self.selection_empty && !self.has_detail()
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// One consumer's view: a shared read-only dataset and its own selection.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Arc<Dataset>,
    selection: FilterSelection,
}

impl Session {
    pub fn new(dataset: impl Into<Arc<Dataset>>) -> Self {
        Self {
            dataset: dataset.into(),
            selection: FilterSelection::default(),
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: FilterSelection) {
        self.selection = selection;
    }

    /// Toggle a single neighborhood name in the selection.
    pub fn toggle_name(&mut self, name: &str) {
        self.selection.toggle_name(name);
    }

    /// Toggle a single neighborhood code in the selection.
    pub fn toggle_code(&mut self, code: &str) {
        self.selection.toggle_code(code);
    }

    /// Select every neighborhood name, in sorted order.
    pub fn select_all_names(&mut self) {
        let mut selection = FilterSelection::by_names(self.dataset.neighborhood_names());
        for code in self.selection.codes() {
            selection.add_code(code.as_str());
        }
        self.selection = selection;
    }

    /// Drop the whole selection.
    pub fn clear(&mut self) {
        self.selection = FilterSelection::default();
    }

    /// Derive the report for the current selection. Recomputed on every
    /// call.
    pub fn report(&self) -> DashboardReport {
        derive_report(&self.dataset, &self.selection)
    }
}

/// Pure derivation behind [`Session::report`].
pub fn derive_report(dataset: &Dataset, selection: &FilterSelection) -> DashboardReport {
    let city = city_aggregate(dataset);
    let mut neighborhoods = Vec::new();
    let mut errors = Vec::new();

    for row in select(dataset, selection) {
        let snapshot = match snapshot_row(dataset, row) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("skipping row {row}: {e}");
                errors.push(e.to_string());
                continue;
            }
        };
        neighborhoods.push(NeighborhoodReport {
            sex_split: sex_split(&snapshot),
            age_sex: age_sex_distribution(dataset, row),
            households: household_type_distribution(dataset, row).map_err(|e| e.to_string()),
            snapshot,
        });
    }

    DashboardReport {
        city,
        selection_empty: selection.is_empty(),
        neighborhoods,
        errors,
    }
}
