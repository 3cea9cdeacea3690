//! Minimal LiPD reader
//!
//! A LiPD file (`.lpd`) is a zip archive holding one JSON-LD metadata document
//! and the CSV measurement tables it references. This module reads the archive
//! into a [`Dataset`], flattens its measurement tables into [`SeriesRecord`]s
//! and filters them with simple predicate strings.
//!
//! ```text
//! Dataset ──< paleoData/chronData section ──< measurementTable ──< column
//!                                                                   │
//!                                                        SeriesRecord (one per column)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lipd_qc::lipd::{self, Mode};
//!
//! # fn main() -> lipd_qc::Result<()> {
//! let dataset = lipd::read_lipd("data/LakeX.lpd")?;
//! let series = lipd::extract_ts(std::slice::from_ref(&dataset), Mode::Paleo);
//! let celsius = lipd::filter_ts(series, "paleoData_units == degC")?;
//! println!("{} temperature series", celsius.len());
//! # Ok(())
//! # }
//! ```

mod extract;
mod filter;
mod reader;

pub use extract::{extract_dataset, extract_ts};
pub use filter::{filter_ts, Comparison, Predicate};
pub use reader::read_lipd;

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Filters selecting the Temp12k temperature series, applied in order.
pub const TEMP12K_FILTERS: [&str; 3] = [
    "paleoData_inCompilation == Temp12k",
    "paleoData_useInGlobalTemperatureAnalysis == TRUE",
    "paleoData_units == degC",
];

/// Which data section of a dataset to extract series from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `paleoData` measurement tables
    Paleo,
    /// `chronData` measurement tables
    Chron,
}

impl Mode {
    /// Key of the section in the metadata document; also the attribute prefix
    /// of extracted series (`paleoData_TSid`, `chronData_variableName`, ...).
    #[must_use]
    pub const fn section_key(self) -> &'static str {
        match self {
            Self::Paleo => "paleoData",
            Self::Chron => "chronData",
        }
    }
}

/// One loaded LiPD file: the JSON-LD metadata with measurement values inlined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    name: String,
    metadata: Map<String, Value>,
}

impl Dataset {
    /// Wrap a metadata document. Returns `None` when it carries no
    /// `dataSetName`.
    #[must_use]
    pub fn from_metadata(metadata: Map<String, Value>) -> Option<Self> {
        let name = metadata.get("dataSetName")?.as_str()?.to_string();
        Some(Self { name, metadata })
    }

    /// The `dataSetName` of the dataset.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The full metadata document.
    #[must_use]
    pub const fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }
}

/// A flat time-series record: attribute name to JSON value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesRecord(Map<String, Value>);

impl SeriesRecord {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw attribute value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Attribute as a string slice.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Attribute as a finite number. Numeric strings are accepted.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(as_finite)
    }

    /// Attribute as a sequence of numbers; missing or non-numeric entries
    /// become `None`. Returns `None` if the attribute is not a sequence.
    #[must_use]
    pub fn numeric_values(&self, key: &str) -> Option<Vec<Option<f64>>> {
        let values = self.0.get(key)?.as_array()?;
        Some(values.iter().map(as_finite).collect())
    }

    /// Set an attribute, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// `dataSetName` attribute.
    #[must_use]
    pub fn dataset_name(&self) -> Option<&str> {
        self.get_str("dataSetName")
    }

    /// `paleoData_TSid` attribute.
    #[must_use]
    pub fn ts_id(&self) -> Option<&str> {
        self.get_str("paleoData_TSid")
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for SeriesRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for SeriesRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn as_finite(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Extract the paleo series of `datasets` and apply [`TEMP12K_FILTERS`].
///
/// # Errors
///
/// Returns error if a filter expression is malformed.
pub fn temp12k_series(datasets: &[Dataset]) -> Result<Vec<SeriesRecord>> {
    let mut series = extract_ts(datasets, Mode::Paleo);
    for expr in TEMP12K_FILTERS {
        series = filter_ts(series, expr)?;
    }
    Ok(series)
}
