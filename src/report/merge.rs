//! Table merger: dataset-level results become attributes of their series
//!
//! ```text
//! (LakeX, -)    chronology present = true          (LakeX, TS1) chronology present = true
//! (LakeX, TS1)  latlon = passed            ──►     (LakeX, TS2) chronology present = true
//! (LakeX, TS2)  latlon = failed
//! ```

use super::{CellValue, Identity, ResultRow, ResultTable};
use rustc_hash::FxHashMap;

/// Merge dataset-level rows into the series rows of the same dataset.
///
/// - Without series rows the table is returned as is (dataset-only report).
/// - Otherwise every column with at least one non-missing dataset-level value
///   is copied onto the series rows of that dataset that lack a value for it.
///   Existing series values are never overwritten. Dataset-level rows are then
///   dropped, including those of datasets without series.
///
/// The output is sorted by `(dataset, series id)`. Merging is deterministic and
/// idempotent.
#[must_use]
pub fn merge(table: ResultTable) -> ResultTable {
    let (columns, checks, rows) = table.into_parts();
    let (general, series): (Vec<_>, Vec<_>) = rows
        .into_iter()
        .partition(|(identity, _)| identity.is_dataset_level());

    if series.is_empty() {
        return ResultTable::from_parts(columns, checks, general);
    }

    let broadcast: Vec<String> = columns
        .iter()
        .filter(|column| general.iter().any(|(_, row)| has_value(row, column)))
        .cloned()
        .collect();
    let by_dataset: FxHashMap<&str, &ResultRow> = general
        .iter()
        .map(|(identity, row)| (identity.dataset_name(), row))
        .collect();

    let mut merged: Vec<(Identity, ResultRow)> = series;
    for (identity, row) in &mut merged {
        let Some(general_row) = by_dataset.get(identity.dataset_name()) else {
            continue;
        };
        for column in &broadcast {
            let Some(value) = general_row.get(column).filter(|v| !v.is_missing()) else {
                continue;
            };
            if !has_value(row, column) {
                row.insert(column.clone(), value.clone());
            }
        }
    }

    ResultTable::from_parts(columns, checks, merged)
}

fn has_value(row: &ResultRow, column: &str) -> bool {
    row.get(column).is_some_and(|value| !CellValue::is_missing(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, CellValue)]) -> ResultRow {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_dataset_only_report_is_verbatim() {
        let table = ResultTable::from_parts(
            columns(&["valid file"]),
            vec![],
            vec![
                (Identity::dataset("LakeY"), row(&[("valid file", true.into())])),
                (Identity::dataset("LakeX"), row(&[("valid file", false.into())])),
            ],
        );
        let merged = merge(table.clone());
        assert_eq!(merged, table);
        assert!(merged.rows().iter().all(|(id, _)| id.is_dataset_level()));
    }

    #[test]
    fn test_broadcast_to_series_rows() {
        let table = ResultTable::from_parts(
            columns(&["chronology present", "min"]),
            vec![],
            vec![
                (Identity::dataset("LakeX"), row(&[("chronology present", true.into())])),
                (Identity::series("LakeX", "TS1"), row(&[("min", 1.0.into())])),
                (Identity::series("LakeX", "TS2"), row(&[])),
            ],
        );
        let merged = merge(table);

        assert_eq!(merged.len(), 2);
        for ts in ["TS1", "TS2"] {
            assert_eq!(
                merged.get(&Identity::series("LakeX", ts), "chronology present"),
                Some(&CellValue::Bool(true))
            );
        }
        assert!(merged.row(&Identity::dataset("LakeX")).is_none());
    }

    #[test]
    fn test_existing_series_values_win() {
        let table = ResultTable::from_parts(
            columns(&["nchronpoints"]),
            vec![],
            vec![
                (Identity::dataset("LakeX"), row(&[("nchronpoints", 5_i64.into())])),
                (Identity::series("LakeX", "TS1"), row(&[("nchronpoints", 7_i64.into())])),
                (
                    Identity::series("LakeX", "TS2"),
                    row(&[("nchronpoints", CellValue::Missing)]),
                ),
            ],
        );
        let merged = merge(table);

        assert_eq!(
            merged.get(&Identity::series("LakeX", "TS1"), "nchronpoints"),
            Some(&CellValue::Int(7))
        );
        // Explicit null counts as missing
        assert_eq!(
            merged.get(&Identity::series("LakeX", "TS2"), "nchronpoints"),
            Some(&CellValue::Int(5))
        );
    }

    #[test]
    fn test_datasets_without_series_are_dropped() {
        let table = ResultTable::from_parts(
            columns(&["valid file", "min"]),
            vec![],
            vec![
                (Identity::dataset("LakeX"), row(&[("valid file", true.into())])),
                (Identity::dataset("Orphan"), row(&[("valid file", false.into())])),
                (Identity::series("LakeX", "TS1"), row(&[("min", 1.0.into())])),
            ],
        );
        let merged = merge(table);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged.rows()[0].0, Identity::series("LakeX", "TS1"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let table = ResultTable::from_parts(
            columns(&["chronology present"]),
            vec![],
            vec![
                (Identity::dataset("LakeX"), row(&[("chronology present", true.into())])),
                (Identity::series("LakeX", "TS1"), row(&[])),
            ],
        );
        let once = merge(table.clone());
        assert_eq!(merge(table), once);
        assert_eq!(merge(once.clone()), once);
    }
}
