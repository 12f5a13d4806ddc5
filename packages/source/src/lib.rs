#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Upstream data collaborators for the crime ETL pipeline.
//!
//! The transform core never fetches or reads anything itself; these
//! modules produce the flat incident partitions (from the CKAN Datastore
//! API) and the neighborhood boundary set (from a `GeoJSON` file) that the
//! pipeline consumes.

pub mod boundaries;
pub mod ckan;

use thiserror::Error;

/// Errors that can occur while producing pipeline inputs.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Boundary data could not be converted into polygons.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
