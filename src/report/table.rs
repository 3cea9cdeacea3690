//! Result table: one row per identity

use super::{CellValue, Identity};
use rustc_hash::FxHashMap;

/// Column name to cell value for one identity.
pub type ResultRow = FxHashMap<String, CellValue>;

/// Rows indexed by [`Identity`], sorted by identity, plus the column order.
///
/// `columns` lists every column in first-recorded order; `checks` is the
/// subset of columns holding check outcomes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    columns: Vec<String>,
    checks: Vec<String>,
    rows: Vec<(Identity, ResultRow)>,
}

impl ResultTable {
    /// Assemble a table. Rows are sorted by identity.
    #[must_use]
    pub fn from_parts(
        columns: Vec<String>,
        checks: Vec<String>,
        mut rows: Vec<(Identity, ResultRow)>,
    ) -> Self {
        rows.sort_by(|(a, _), (b, _)| a.cmp(b));
        Self {
            columns,
            checks,
            rows,
        }
    }

    /// Split into `(columns, checks, rows)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<String>, Vec<String>, Vec<(Identity, ResultRow)>) {
        (self.columns, self.checks, self.rows)
    }

    /// Column names in first-recorded order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Names of the checks with an outcome column.
    #[must_use]
    pub fn checks(&self) -> &[String] {
        &self.checks
    }

    /// Rows in identity order.
    #[must_use]
    pub fn rows(&self) -> &[(Identity, ResultRow)] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row of `identity`.
    #[must_use]
    pub fn row(&self, identity: &Identity) -> Option<&ResultRow> {
        self.rows
            .binary_search_by(|(id, _)| id.cmp(identity))
            .ok()
            .map(|index| &self.rows[index].1)
    }

    /// Cell at `(identity, column)`.
    #[must_use]
    pub fn get(&self, identity: &Identity, column: &str) -> Option<&CellValue> {
        self.row(identity)?.get(column)
    }
}
