//! Dataset catalog
//!
//! Lists the `.lpd` files of the data directory and loads them into
//! [`Dataset`]s at most once per run, through the snapshot cache when one is
//! configured.

use crate::cache::{DatasetCache, Sources};
use crate::lipd::{read_lipd, Dataset};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Extension of LiPD archives.
pub const LIPD_EXTENSION: &str = "lpd";

/// The data files of a run and, once loaded, their datasets.
#[derive(Debug)]
pub struct Catalog {
    data_dir: PathBuf,
    files: Vec<PathBuf>,
    skip_invalid: bool,
    cache: Option<DatasetCache>,
    datasets: Option<Vec<Dataset>>,
}

impl Catalog {
    /// List the `.lpd` files directly inside `data_dir`, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataDirNotFound`] if `data_dir` is not a directory, or
    /// an IO error if it cannot be listed.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        if !data_dir.is_dir() {
            return Err(Error::DataDirNotFound(data_dir));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&data_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(std::io::Error::from)?;
            if entry.file_type().is_file() && is_lipd_file(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort();
        debug!(dir = %data_dir.display(), files = files.len(), "data files listed");

        Ok(Self {
            data_dir,
            files,
            skip_invalid: false,
            cache: None,
            datasets: None,
        })
    }

    /// Exclude malformed files from the datasets instead of failing.
    #[must_use]
    pub const fn with_skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    /// Load through `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: DatasetCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The `.lpd` files, sorted.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Whether the datasets have been loaded.
    #[must_use]
    pub const fn is_loaded(&self) -> bool {
        self.datasets.is_some()
    }

    /// The datasets sorted by name, loading them on first call.
    ///
    /// # Errors
    ///
    /// Returns error if a file is malformed (unless skipping invalid files)
    /// or the cache is unusable.
    pub fn datasets(&mut self) -> Result<&[Dataset]> {
        if self.datasets.is_none() {
            let datasets = self.load()?;
            self.datasets = Some(datasets);
        }
        Ok(self.datasets.as_deref().unwrap_or_default())
    }

    fn load(&self) -> Result<Vec<Dataset>> {
        let Some(cache) = &self.cache else {
            return self.read_files();
        };

        let sources = Sources::scan(&self.files, self.skip_invalid)?;
        if let Some(datasets) = cache.load(&sources)? {
            info!(datasets = datasets.len(), cache = %cache.path().display(), "datasets loaded from cache");
            return Ok(datasets);
        }
        let datasets = self.read_files()?;
        cache.store(&datasets, &sources)?;
        Ok(datasets)
    }

    fn read_files(&self) -> Result<Vec<Dataset>> {
        let mut datasets = Vec::with_capacity(self.files.len());
        for file in &self.files {
            match read_lipd(file) {
                Ok(dataset) => datasets.push(dataset),
                Err(err) if self.skip_invalid => {
                    warn!(file = %file.display(), error = %err, "skipping invalid file");
                }
                Err(err) => return Err(err),
            }
        }
        datasets.sort_by(|a, b| a.name().cmp(b.name()));
        info!(
            datasets = datasets.len(),
            files = self.files.len(),
            "datasets loaded"
        );
        Ok(datasets)
    }
}

fn is_lipd_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(LIPD_EXTENSION))
}
