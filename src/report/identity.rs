//! Identity resolution: which report row a check invocation belongs to

use crate::checks::Fixture;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite row key `(dataSetName, TSid)`.
///
/// `series_id == None` marks a dataset-level row. Identities order by dataset
/// name, then series id, with the dataset-level row first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identity {
    dataset: String,
    series_id: Option<String>,
}

impl Identity {
    /// Dataset-level identity.
    #[must_use]
    pub fn dataset(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            series_id: None,
        }
    }

    /// Series-level identity.
    #[must_use]
    pub fn series(dataset: impl Into<String>, series_id: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            series_id: Some(series_id.into()),
        }
    }

    /// Dataset name.
    #[must_use]
    pub fn dataset_name(&self) -> &str {
        &self.dataset
    }

    /// Series id, `None` for dataset-level rows.
    #[must_use]
    pub fn series_id(&self) -> Option<&str> {
        self.series_id.as_deref()
    }

    /// Whether this is a dataset-level identity.
    #[must_use]
    pub const fn is_dataset_level(&self) -> bool {
        self.series_id.is_none()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.series_id {
            Some(series_id) => write!(f, "{}.{series_id}", self.dataset),
            None => f.write_str(&self.dataset),
        }
    }
}

/// A resolved check invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Row the invocation reports into.
    pub identity: Identity,
    /// Invocation id `<check>[<param>]`, matched against accepted failures.
    pub id: String,
}

/// Resolve the identity and invocation id of `check` run on `fixture`.
///
/// Series fixtures resolve to `(dataSetName, paleoData_TSid)`, dataset
/// fixtures to `(dataSetName, None)` and file fixtures to
/// `(file stem, None)`. Returns `None` when the fixture lacks the fields
/// needed to name it; such invocations are left out of the report.
#[must_use]
pub fn resolve(check: &str, fixture: &Fixture<'_>) -> Option<Invocation> {
    let identity = match fixture {
        Fixture::File(path) => Identity::dataset(path.file_stem()?.to_str()?),
        Fixture::Dataset(dataset) => Identity::dataset(dataset.name()),
        Fixture::Series(series) | Fixture::SeriesCountry(series) => {
            Identity::series(series.dataset_name()?, series.ts_id()?)
        }
    };
    let id = format!("{check}[{identity}]");
    Some(Invocation { identity, id })
}
