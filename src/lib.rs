//! # lipd-qc: quality control of the Temp12k LiPD collection
//!
//! Runs a set of domain-sanity checks over a directory of LiPD archives and
//! writes a spreadsheet for reviewers: one row per time series with the
//! outcome and inspected values of every check, a per-check summary, and a
//! help sheet describing every column.
//!
//! ## Pipeline
//!
//! ```text
//! catalog ──> fixtures ──> checks ──> ResultCollector ──> merge ──> Summary
//!  (.lpd)   (file/dataset/series)     (Identity-keyed)      │
//!                                                           └──> workbook
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use lipd_qc::{RunConfig, Runner};
//!
//! let config = RunConfig::builder("data")
//!     .accepted("data/accepted.txt")
//!     .build();
//! let report = Runner::new(&config)?.run()?;
//! println!("{} rows", report.results().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod accepted;
pub mod atomic;
pub mod cache;
pub mod catalog;
pub mod checks;
pub mod config;
pub mod error;
pub mod lipd;
pub mod report;
pub mod runner;

pub use accepted::AcceptedFailures;
pub use config::{RunConfig, RunConfigBuilder};
pub use error::{Error, Result};
pub use report::Report;
pub use runner::Runner;
