//! Accepted-failures list
//!
//! A plain text file with one invocation id per line, e.g.
//!
//! ```text
//! # reviewed 2024-03
//! latlon[LakeX.TS1]
//! chronology_points[LakeY]
//! ```
//!
//! Blank lines and lines starting with `#` are ignored.

use crate::{Error, Result};
use rustc_hash::FxHashSet;
use std::path::Path;

/// Invocation ids whose failures were reviewed and accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptedFailures {
    ids: FxHashSet<String>,
}

impl AcceptedFailures {
    /// Parse the list from text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let ids = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { ids }
    }

    /// Read the list from `path`.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Ok(Self::parse(&text))
    }

    /// Whether `invocation_id` is accepted.
    #[must_use]
    pub fn contains(&self, invocation_id: &str) -> bool {
        self.ids.contains(invocation_id)
    }

    /// Number of accepted ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for AcceptedFailures {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
