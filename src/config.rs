//! Run configuration

use std::path::{Path, PathBuf};

/// Default directory of the `.lpd` files.
pub const DEFAULT_DATA_DIR: &str = "data";

/// File name of the report inside the data directory when no output path is
/// given.
pub const REPORT_FILE_NAME: &str = "results.xlsx";

/// Inputs and outputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    data_dir: PathBuf,
    output: Option<PathBuf>,
    accepted: Option<PathBuf>,
    cache: Option<PathBuf>,
    countries: Option<PathBuf>,
    skip_invalid: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl RunConfig {
    /// Configuration reading `data_dir` with every option off.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            output: None,
            accepted: None,
            cache: None,
            countries: None,
            skip_invalid: false,
        }
    }

    /// Create a builder over `data_dir`.
    #[must_use]
    pub fn builder(data_dir: impl Into<PathBuf>) -> RunConfigBuilder {
        RunConfigBuilder::new(data_dir)
    }

    /// Directory of the `.lpd` files.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Report path: the configured output, else `<data_dir>/results.xlsx`.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.data_dir.join(REPORT_FILE_NAME))
    }

    /// Accepted-failures file.
    #[must_use]
    pub fn accepted(&self) -> Option<&Path> {
        self.accepted.as_deref()
    }

    /// Dataset cache file.
    #[must_use]
    pub fn cache(&self) -> Option<&Path> {
        self.cache.as_deref()
    }

    /// Country bounding-box table.
    #[must_use]
    pub fn countries(&self) -> Option<&Path> {
        self.countries.as_deref()
    }

    /// Whether malformed files are excluded instead of aborting the run.
    #[must_use]
    pub const fn skip_invalid(&self) -> bool {
        self.skip_invalid
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug, Clone)]
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    /// Start from the defaults over `data_dir`.
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            config: RunConfig::new(data_dir),
        }
    }

    /// Report path.
    #[must_use]
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output = Some(path.into());
        self
    }

    /// Accepted-failures file.
    #[must_use]
    pub fn accepted(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.accepted = Some(path.into());
        self
    }

    /// Dataset cache file.
    #[must_use]
    pub fn cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.cache = Some(path.into());
        self
    }

    /// Country bounding-box table.
    #[must_use]
    pub fn countries(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.countries = Some(path.into());
        self
    }

    /// Exclude malformed files instead of aborting.
    #[must_use]
    pub const fn skip_invalid(mut self, skip: bool) -> Self {
        self.config.skip_invalid = skip;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> RunConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.data_dir(), Path::new("data"));
        assert_eq!(config.output_path(), Path::new("data/results.xlsx"));
        assert!(config.accepted().is_none());
        assert!(!config.skip_invalid());
    }

    #[test]
    fn test_builder() {
        let config = RunConfig::builder("/srv/lipd")
            .output("/tmp/report.xlsx")
            .accepted("accepted.txt")
            .cache("cache.json.zst")
            .countries("countries.csv")
            .skip_invalid(true)
            .build();

        assert_eq!(config.output_path(), Path::new("/tmp/report.xlsx"));
        assert_eq!(config.accepted(), Some(Path::new("accepted.txt")));
        assert_eq!(config.cache(), Some(Path::new("cache.json.zst")));
        assert_eq!(config.countries(), Some(Path::new("countries.csv")));
        assert!(config.skip_invalid());
    }
}
