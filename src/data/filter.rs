use serde::{Deserialize, Serialize};

use super::model::Dataset;

// ---------------------------------------------------------------------------
// Filter selection: which neighborhoods the consumer asked about
// ---------------------------------------------------------------------------

/// Neighborhoods picked by the consumer, by name (`NM_BAIRRO`) and/or code
/// (`CD_BAIRRO`), in the order they were picked. Duplicates are ignored.
///
/// An empty selection means "no detail analysis requested", never "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    names: Vec<String>,
    codes: Vec<String>,
}

/// Append `value` unless already present.
fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Remove `value` if present, otherwise append it.
fn toggle(list: &mut Vec<String>, value: &str) {
    match list.iter().position(|v| v == value) {
        Some(i) => {
            list.remove(i);
        }
        None => list.push(value.to_string()),
    }
}

impl FilterSelection {
    /// Selection of the given neighborhood names.
    pub fn by_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::default();
        for name in names {
            selection.add_name(name);
        }
        selection
    }

    /// Selection of the given neighborhood codes.
    pub fn by_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::default();
        for code in codes {
            selection.add_code(code);
        }
        selection
    }

    /// Selected names, in pick order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Selected codes, in pick order.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn add_name(&mut self, name: impl Into<String>) {
        push_unique(&mut self.names, name.into());
    }

    pub fn add_code(&mut self, code: impl Into<String>) {
        push_unique(&mut self.codes, code.into());
    }

    pub fn toggle_name(&mut self, name: &str) {
        toggle(&mut self.names, name);
    }

    pub fn toggle_code(&mut self, code: &str) {
        toggle(&mut self.codes, code);
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.codes.is_empty()
    }
}

/// Return indices of rows passing the selection.
///
/// A row passes when:
/// * the code list is empty, or the row's code is in it, **and**
/// * the name list is empty, or the row's name is in it.
///
/// Both lists empty → no rows. Rows come back in pick order: by the
/// position of their name in the selection (or of their code, when only
/// codes were picked), then table order.
pub fn select(dataset: &Dataset, selection: &FilterSelection) -> Vec<usize> {
    if selection.is_empty() {
        return Vec::new();
    }
    let position = |list: &[String], key: &str| list.iter().position(|v| v == key);

    let mut rows: Vec<(usize, usize)> = (0..dataset.len())
        .filter_map(|row| {
            let code_pos = position(&selection.codes, &dataset.code_of(row));
            let name_pos = position(&selection.names, &dataset.name_of(row));
            if !selection.codes.is_empty() && code_pos.is_none() {
                return None;
            }
            if !selection.names.is_empty() && name_pos.is_none() {
                return None;
            }
            Some((name_pos.or(code_pos).unwrap_or(0), row))
        })
        .collect();
    rows.sort_unstable();
    log::debug!(
        "selection of {} names / {} codes matched {} rows",
        selection.names.len(),
        selection.codes.len(),
        rows.len()
    );
    rows.into_iter().map(|(_, row)| row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, RawRecord};

    fn dataset() -> Dataset {
        let rows = [(10, "Leme"), (20, "Centro"), (30, "Gávea")];
        Dataset::new(
            vec!["CD_BAIRRO".into(), "NM_BAIRRO".into()],
            rows.iter()
                .map(|(code, name)| RawRecord {
                    cells: vec![CellValue::Integer(*code), CellValue::String(name.to_string())],
                })
                .collect(),
        )
    }

    #[test]
    fn empty_selection_selects_nothing() {
        assert!(select(&dataset(), &FilterSelection::default()).is_empty());
    }

    #[test]
    fn names_only_in_pick_order() {
        let sel = FilterSelection::by_names(["Leme", "Centro"]);
        assert_eq!(select(&dataset(), &sel), vec![0, 1]);
        let sel = FilterSelection::by_names(["Gávea", "Leme"]);
        assert_eq!(select(&dataset(), &sel), vec![2, 0]);
    }

    #[test]
    fn codes_only_in_pick_order() {
        let sel = FilterSelection::by_codes(["30", "10"]);
        assert_eq!(select(&dataset(), &sel), vec![2, 0]);
    }

    #[test]
    fn duplicate_picks_are_ignored_and_toggles_remove() {
        let mut sel = FilterSelection::by_names(["Leme", "Leme"]);
        assert_eq!(sel.names(), ["Leme"]);
        sel.toggle_name("Centro");
        sel.toggle_name("Leme");
        assert_eq!(sel.names(), ["Centro"]);
        assert!(sel.contains_name("Centro"));
    }

    #[test]
    fn codes_only() {
        let sel = FilterSelection::by_codes(["30"]);
        assert_eq!(select(&dataset(), &sel), vec![2]);
    }

    #[test]
    fn codes_and_names_intersect() {
        let mut sel = FilterSelection::by_names(["Leme", "Centro"]);
        sel.add_code("10");
        sel.add_code("30");
        assert_eq!(select(&dataset(), &sel), vec![0]);
    }

    #[test]
    fn unknown_name_matches_nothing() {
        let sel = FilterSelection::by_names(["Copacabana"]);
        assert!(select(&dataset(), &sel).is_empty());
    }
}
