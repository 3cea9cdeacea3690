//! Whole-collection dataset cache
//!
//! Reading every `.lpd` archive is the slow part of a run. A snapshot of the
//! loaded collection can be kept next to the data. It records the [`Sources`]
//! it was built from (name, size and modification time of every data file,
//! and whether invalid files were skipped) and is reused only while they are
//! unchanged; otherwise it is rewritten.
//!
//! Snapshots are JSON, optionally compressed (see [`Compression`]).

mod compression;

pub use compression::Compression;

use crate::atomic::write_atomic;
use crate::lipd::Dataset;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Snapshot format version; snapshots of another version are rejected.
pub const SNAPSHOT_VERSION: u32 = 2;

/// Identity of one data file at snapshot time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// File name
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Modification time
    pub modified: DateTime<Utc>,
}

impl SourceFile {
    /// Read the name, size and modification time of `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the file metadata cannot be read.
    pub fn stat(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self {
            name,
            size: metadata.len(),
            modified: metadata.modified()?.into(),
        })
    }
}

/// Inputs a snapshot was built from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sources {
    /// Data files, in catalog order
    pub files: Vec<SourceFile>,
    /// Whether malformed files were left out
    pub skip_invalid: bool,
}

impl Sources {
    /// Stat every data file.
    ///
    /// # Errors
    ///
    /// Returns error if a file's metadata cannot be read.
    pub fn scan(files: &[PathBuf], skip_invalid: bool) -> Result<Self> {
        let files = files
            .iter()
            .map(|file| SourceFile::stat(file))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            files,
            skip_invalid,
        })
    }
}

/// Serialized form of a cached collection.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Snapshot {
    /// Format version
    pub version: u32,
    /// When the snapshot was written
    pub created_at: DateTime<Utc>,
    /// What the datasets were loaded from
    pub sources: Sources,
    /// The cached datasets
    pub datasets: Vec<Dataset>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    created_at: DateTime<Utc>,
    sources: &'a Sources,
    datasets: &'a [Dataset],
}

/// A snapshot file of the loaded collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetCache {
    path: PathBuf,
    compression: Compression,
}

impl DatasetCache {
    /// Cache stored at `path`; the extension selects the compression.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let compression = Compression::for_path(&path);
        Self { path, compression }
    }

    /// Snapshot location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot compression.
    #[must_use]
    pub const fn compression(&self) -> Compression {
        self.compression
    }

    /// Read the cached datasets if the snapshot was built from `sources`.
    ///
    /// Returns `None` when there is no snapshot or it is stale.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cache`] if the snapshot is unreadable, corrupt or of
    /// another format version.
    pub fn load(&self, sources: &Sources) -> Result<Option<Vec<Dataset>>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)
            .map_err(|e| Error::Cache(format!("{}: {e}", self.path.display())))?;
        let json = self.compression.decompress(&bytes)?;
        let snapshot: Snapshot = serde_json::from_slice(&json)
            .map_err(|e| Error::Cache(format!("{}: {e}", self.path.display())))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(Error::Cache(format!(
                "{}: snapshot version {} (expected {SNAPSHOT_VERSION})",
                self.path.display(),
                snapshot.version
            )));
        }
        if snapshot.sources != *sources {
            debug!(path = %self.path.display(), "data files changed since the cache was written");
            return Ok(None);
        }
        debug!(
            path = %self.path.display(),
            created_at = %snapshot.created_at,
            datasets = snapshot.datasets.len(),
            "cache loaded"
        );
        Ok(Some(snapshot.datasets))
    }

    /// Replace the snapshot with `datasets` loaded from `sources`.
    ///
    /// # Errors
    ///
    /// Returns error if the snapshot cannot be serialized or written.
    pub fn store(&self, datasets: &[Dataset], sources: &Sources) -> Result<()> {
        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            sources,
            datasets,
        };
        let json = serde_json::to_vec(&snapshot)?;
        let bytes = self.compression.compress(&json)?;
        write_atomic(&self.path, &bytes)?;
        debug!(
            path = %self.path.display(),
            compression = self.compression.as_str(),
            bytes = bytes.len(),
            "cache written"
        );
        Ok(())
    }
}
