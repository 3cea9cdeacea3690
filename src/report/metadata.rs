//! Column descriptions for the Help sheet

use super::collector::id_column;
use super::ResultTable;
use crate::checks::Check;
use rustc_hash::FxHashMap;

/// Ordered `(column, description)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestMetadata {
    entries: Vec<(String, String)>,
}

impl TestMetadata {
    /// Build the descriptions of every column of `table`.
    ///
    /// Check columns take the first paragraph of the check's description and
    /// `<check>-id` columns a generated sentence; metric columns take the
    /// description the check declares. An annotation recorded during the run
    /// for the exact column name wins over all of these. Unknown columns get
    /// an empty description.
    #[must_use]
    pub fn assemble(
        table: &ResultTable,
        annotations: &FxHashMap<String, String>,
        registry: &[&dyn Check],
    ) -> Self {
        let mut entries = vec![
            ("dataSetName".to_string(), "Name of the dataset".to_string()),
            (
                "TSid".to_string(),
                "Time series id (paleoData_TSid); empty for dataset-level results".to_string(),
            ),
        ];

        let checks: FxHashMap<&str, &dyn Check> = registry
            .iter()
            .map(|check| (check.name(), *check))
            .collect();
        let ids: FxHashMap<String, &str> = table
            .checks()
            .iter()
            .map(|name| (id_column(name), name.as_str()))
            .collect();

        for column in table.columns() {
            let description = if let Some(annotation) = annotations.get(column) {
                annotation.clone()
            } else if table.checks().contains(column) {
                checks
                    .get(column.as_str())
                    .map(|check| first_paragraph(check.description()))
                    .unwrap_or_default()
            } else if let Some(check) = ids.get(column) {
                format!("Test id for the `{check}` test of the given timeseries.")
            } else {
                metric_description(registry, column).unwrap_or_default()
            };
            entries.push((column.clone(), description));
        }
        Self { entries }
    }

    /// `(column, description)` pairs in report order.
    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Description of `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, description)| description.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn metric_description(registry: &[&dyn Check], column: &str) -> Option<String> {
    registry
        .iter()
        .flat_map(|check| check.metrics())
        .find(|(name, _)| *name == column)
        .map(|(_, description)| (*description).to_string())
}

/// First paragraph of `text`, lines joined with spaces.
fn first_paragraph(text: &str) -> String {
    text.trim()
        .split("\n\n")
        .next()
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
