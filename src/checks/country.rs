//! Country lookup by coordinate and the country consistency check

use super::{expect_series, Check, Fixture, FixtureKind, Verdict};
use crate::lipd::SeriesRecord;
use crate::report::Recorder;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Attribute the country lookup writes onto series.
pub const NAT_EARTH_KEY: &str = "geo_natEarth";

/// Column holding the country found at the site coordinates.
pub const FOUND_COUNTRY_COLUMN: &str = "natEarth_country";

/// Resolve the country containing a coordinate.
pub trait CountryLookup {
    /// Country at `(lat, lon)`, longitude in [-180, 360].
    fn country_at(&self, lat: f64, lon: f64) -> Option<String>;
}

/// A country's bounding box.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountryBox {
    /// Country name
    pub name: String,
    /// Southern edge
    pub min_lat: f64,
    /// Northern edge
    pub max_lat: f64,
    /// Western edge
    pub min_lon: f64,
    /// Eastern edge
    pub max_lon: f64,
}

impl CountryBox {
    fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    fn area(&self) -> f64 {
        (self.max_lat - self.min_lat) * (self.max_lon - self.min_lon)
    }
}

/// Country lookup over bounding boxes; the smallest containing box wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundingBoxes {
    boxes: Vec<CountryBox>,
}

impl BoundingBoxes {
    /// Create a lookup from boxes.
    #[must_use]
    pub const fn new(boxes: Vec<CountryBox>) -> Self {
        Self { boxes }
    }

    /// Load boxes from a CSV file with header
    /// `name,min_lat,max_lat,min_lon,max_lon`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or a row is malformed.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        let boxes = reader
            .deserialize()
            .collect::<std::result::Result<Vec<CountryBox>, _>>()
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Ok(Self::new(boxes))
    }

    /// Number of boxes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether there are no boxes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

impl CountryLookup for BoundingBoxes {
    fn country_at(&self, lat: f64, lon: f64) -> Option<String> {
        let lon = if lon > 180.0 { lon - 360.0 } else { lon };
        self.boxes
            .iter()
            .filter(|b| b.contains(lat, lon))
            .min_by(|a, b| a.area().total_cmp(&b.area()))
            .map(|b| b.name.clone())
    }
}

/// Write the country of every located series into `geo_natEarth`.
pub fn inject_countries(series: &mut [SeriesRecord], lookup: &dyn CountryLookup) {
    for record in series {
        let (Some(lat), Some(lon)) = (record.get_f64("geo_meanLat"), record.get_f64("geo_meanLon"))
        else {
            continue;
        };
        if let Some(country) = lookup.country_at(lat, lon) {
            record.insert(NAT_EARTH_KEY, country);
        }
    }
}

/// Compare the country found at the site location with `geo_country`.
pub struct CountryCheck;

impl Check for CountryCheck {
    fn name(&self) -> &'static str {
        "country"
    }

    fn description(&self) -> &'static str {
        "Test the country of the site.\n\n\
         The country found at the site coordinates must match the geo_country \
         metadata. Skipped without a country table (--countries) or without \
         geo_country."
    }

    fn fixture(&self) -> FixtureKind {
        FixtureKind::SeriesCountry
    }

    fn metrics(&self) -> &'static [(&'static str, &'static str)] {
        &[(FOUND_COUNTRY_COLUMN, "Country found at the site coordinates")]
    }

    fn run(&self, fixture: &Fixture<'_>, recorder: &mut Recorder<'_>) -> Result<Verdict> {
        let series = expect_series(self, fixture)?;
        let Some(found) = series.get_str(NAT_EARTH_KEY) else {
            return Ok(Verdict::Skipped("no country lookup available".into()));
        };
        recorder.record(FOUND_COUNTRY_COLUMN, found);

        let Some(declared) = series.get_str("geo_country") else {
            return Ok(Verdict::Skipped("no geo_country".into()));
        };
        if declared.trim().eq_ignore_ascii_case(found.trim()) {
            Ok(Verdict::Passed)
        } else {
            Ok(Verdict::Failed(format!(
                "Site lies in {found}, metadata says {declared}"
            )))
        }
    }
}
