#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core transform pipeline for the Milwaukee crime ETL.
//!
//! Takes raw incident rows and neighborhood boundary polygons, assigns each
//! incident to a neighborhood by point-in-polygon containment, derives
//! temporal features from the report timestamp, and computes the summary
//! tables consumed by the dashboard. The pipeline is a pure, synchronous,
//! in-memory batch computation: every stage fully materializes its output
//! before the next stage begins, and identical inputs always produce
//! identical outputs.

pub mod aggregate;
pub mod geometry;
pub mod join;
pub mod loader;
pub mod pipeline;
pub mod temporal;

use mke_crime_models::Offense;
use thiserror::Error;

/// Structural errors that abort a pipeline run.
///
/// Per-record failures (bad offense flags, missing coordinates, malformed
/// timestamps) never abort the batch; they are handled at record
/// granularity and surface through
/// [`RunStats`](mke_crime_models::RunStats).
#[derive(Debug, Error)]
pub enum TransformError {
    /// Incident points and boundary polygons carry different coordinate
    /// reference systems. Joining across incompatible reference systems
    /// would corrupt every downstream aggregate, so there is no implicit
    /// reprojection.
    #[error(
        "coordinate reference system mismatch: incident points are tagged {points}, boundaries are tagged {boundaries}"
    )]
    CrsMismatch {
        /// Reference system tag on the incident point table.
        points: String,
        /// Reference system tag on the boundary set.
        boundaries: String,
    },

    /// The boundary set is empty; every join would be meaningless.
    #[error("no neighborhood boundaries loaded; refusing to join against an empty boundary set")]
    NoBoundaryData,
}

/// A single record failed offense-flag validation at load time.
///
/// Logged and counted by the loader; the record is dropped and the run
/// continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("record {row}: offense column {offense} has non-boolean value {value}")]
pub struct MalformedRecord {
    /// Row position within its source partition.
    pub row: usize,
    /// The offense column that failed validation.
    pub offense: Offense,
    /// The offending raw value, rendered as JSON.
    pub value: String,
}
