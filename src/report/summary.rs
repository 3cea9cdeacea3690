//! Summary aggregator: outcome counts per check

use super::{Outcome, ResultTable};

/// Label of the synthesized total row and column.
pub const TOTAL: &str = "Total";

/// Outcome counts per check.
///
/// Every row of the table is counted once per check. A row without an outcome
/// for a check counts as [`Outcome::Failed`]: a check that never ran for a
/// series cannot be told apart from one whose setup broke before recording.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    checks: Vec<String>,
    counts: Vec<[usize; Outcome::ALL.len()]>,
}

impl Summary {
    /// Count outcomes over the rows of `table`.
    #[must_use]
    pub fn from_table(table: &ResultTable) -> Self {
        let checks = table.checks().to_vec();
        let counts = checks
            .iter()
            .map(|check| {
                let mut counts = [0; Outcome::ALL.len()];
                for (_, row) in table.rows() {
                    let outcome = row
                        .get(check)
                        .and_then(|cell| cell.as_outcome())
                        .unwrap_or(Outcome::Failed);
                    counts[outcome.index()] += 1;
                }
                counts
            })
            .collect();
        Self { checks, counts }
    }

    /// Checks in report order.
    #[must_use]
    pub fn checks(&self) -> &[String] {
        &self.checks
    }

    /// Rows of `check` with `outcome`; 0 for unknown checks.
    #[must_use]
    pub fn count(&self, check: &str, outcome: Outcome) -> usize {
        self.position(check)
            .map_or(0, |index| self.counts[index][outcome.index()])
    }

    /// Rows counted for `check`, across outcomes.
    #[must_use]
    pub fn check_total(&self, check: &str) -> usize {
        self.position(check)
            .map_or(0, |index| self.counts[index].iter().sum())
    }

    /// Rows with `outcome`, across checks.
    #[must_use]
    pub fn outcome_total(&self, outcome: Outcome) -> usize {
        self.counts.iter().map(|c| c[outcome.index()]).sum()
    }

    /// Grand total.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    fn position(&self, check: &str) -> Option<usize> {
        self.checks.iter().position(|c| c == check)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CellValue, Identity, ResultRow};

    fn outcome_row(check: &str, outcome: Option<Outcome>) -> ResultRow {
        let mut row = ResultRow::default();
        if let Some(outcome) = outcome {
            row.insert(check.to_string(), CellValue::from(outcome));
        }
        row
    }

    #[test]
    fn test_counts_and_totals() {
        let table = ResultTable::from_parts(
            vec!["latlon".into(), "ages".into()],
            vec!["latlon".into(), "ages".into()],
            vec![
                (Identity::series("A", "1"), {
                    let mut row = outcome_row("latlon", Some(Outcome::Passed));
                    row.insert("ages".into(), CellValue::from(Outcome::Skipped));
                    row
                }),
                (Identity::series("A", "2"), outcome_row("latlon", Some(Outcome::Failed))),
                (Identity::series("B", "1"), outcome_row("latlon", Some(Outcome::Passed))),
            ],
        );
        let summary = Summary::from_table(&table);

        assert_eq!(summary.count("latlon", Outcome::Passed), 2);
        assert_eq!(summary.count("latlon", Outcome::Failed), 1);
        assert_eq!(summary.count("ages", Outcome::Skipped), 1);
        // Missing outcomes count as failed
        assert_eq!(summary.count("ages", Outcome::Failed), 2);
        assert_eq!(summary.check_total("latlon"), 3);
        assert_eq!(summary.outcome_total(Outcome::Failed), 3);
        assert_eq!(summary.total(), 6);
        assert_eq!(summary.count("unknown", Outcome::Passed), 0);
    }

    #[test]
    fn test_empty_table() {
        let summary = Summary::from_table(&ResultTable::default());
        assert!(summary.checks().is_empty());
        assert_eq!(summary.total(), 0);
    }
}
