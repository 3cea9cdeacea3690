//! Domain checks and their static registry
//!
//! Each check declares its name, description and the kind of fixture it runs
//! on. The runner invokes every check on every fixture of its kind; the
//! report's Help sheet is assembled from the same declarations.
//!
//! | Check | Fixture | Fails when |
//! |-------|---------|------------|
//! | `lipd_validity` | file | the archive cannot be read |
//! | `chronology_points` | dataset | no usable `age14C` chronology |
//! | `temperature_values` | series | a value is missing, ≤ -40 or ≥ 50 °C |
//! | `latlon` | series | coordinates out of range |
//! | `ages` | series | minimum age ≤ -70 BP |
//! | `duplicated_ages` | series | two samples share an age |
//! | `temperature_outliers` | series | a value lies beyond 5 scaled MADs |
//! | `elevation` | series | marine site above sea level |
//! | `country` | series + country | location country disagrees with metadata |

mod country;
mod dataset;
mod series;

pub use country::{
    inject_countries, BoundingBoxes, CountryBox, CountryCheck, CountryLookup, FOUND_COUNTRY_COLUMN,
};
pub use dataset::{ChronologyPoints, LipdValidity};
pub use series::{
    Ages, DuplicatedAges, Elevation, LatLon, Samples, TemperatureOutliers, TemperatureValues,
};

use crate::lipd::{Dataset, SeriesRecord};
use crate::report::Recorder;
use crate::Result;
use std::path::Path;

/// Kind of input a check runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureKind {
    /// Path of a `.lpd` file
    File,
    /// A loaded dataset
    Dataset,
    /// A Temp12k series
    Series,
    /// A Temp12k series with `geo_natEarth` injected by a country lookup
    SeriesCountry,
}

/// The input bound to one check invocation.
#[derive(Debug, Clone, Copy)]
pub enum Fixture<'a> {
    /// Path of a `.lpd` file
    File(&'a Path),
    /// A loaded dataset
    Dataset(&'a Dataset),
    /// A Temp12k series
    Series(&'a SeriesRecord),
    /// A Temp12k series, possibly carrying `geo_natEarth`
    SeriesCountry(&'a SeriesRecord),
}

impl Fixture<'_> {
    /// Kind of this fixture.
    #[must_use]
    pub const fn kind(&self) -> FixtureKind {
        match self {
            Self::File(_) => FixtureKind::File,
            Self::Dataset(_) => FixtureKind::Dataset,
            Self::Series(_) => FixtureKind::Series,
            Self::SeriesCountry(_) => FixtureKind::SeriesCountry,
        }
    }

    /// The series record, for series fixtures.
    #[must_use]
    pub const fn series(&self) -> Option<&SeriesRecord> {
        match *self {
            Self::Series(series) | Self::SeriesCountry(series) => Some(series),
            Self::File(_) | Self::Dataset(_) => None,
        }
    }
}

/// Verdict of a check on one fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The condition held.
    Passed,
    /// The condition was violated.
    Failed(String),
    /// Data needed by the check is unavailable.
    Skipped(String),
}

/// A domain check.
///
/// Checks record the values they inspect through the [`Recorder`] before
/// deciding, so the report shows the offending value of a failure.
pub trait Check: Sync {
    /// Column name of the check's outcome.
    fn name(&self) -> &'static str;

    /// Human-readable description; the first paragraph goes into the Help
    /// sheet.
    fn description(&self) -> &'static str;

    /// Fixture kind the check runs on.
    fn fixture(&self) -> FixtureKind;

    /// `(column, description)` of the metrics the check records.
    fn metrics(&self) -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Run the check.
    ///
    /// # Errors
    ///
    /// An error means the check itself broke; the invocation is reported as
    /// failed.
    fn run(&self, fixture: &Fixture<'_>, recorder: &mut Recorder<'_>) -> Result<Verdict>;
}

static REGISTRY: [&dyn Check; 9] = [
    &LipdValidity,
    &ChronologyPoints,
    &TemperatureValues,
    &LatLon,
    &Ages,
    &DuplicatedAges,
    &TemperatureOutliers,
    &Elevation,
    &CountryCheck,
];

/// All checks, in execution and report order.
#[must_use]
pub fn registry() -> &'static [&'static dyn Check] {
    &REGISTRY
}

/// Look up a check by name.
#[must_use]
pub fn find(name: &str) -> Option<&'static dyn Check> {
    REGISTRY.iter().copied().find(|check| check.name() == name)
}

/// Series fixture or an error for checks wired to the wrong fixture kind.
fn expect_series<'a>(check: &dyn Check, fixture: &Fixture<'a>) -> Result<&'a SeriesRecord> {
    match *fixture {
        Fixture::Series(series) | Fixture::SeriesCountry(series) => Ok(series),
        Fixture::File(_) | Fixture::Dataset(_) => Err(crate::Error::Other(format!(
            "{} expects a series fixture, got {:?}",
            check.name(),
            fixture.kind()
        ))),
    }
}
