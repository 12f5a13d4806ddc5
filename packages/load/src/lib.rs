#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV sink for the pipeline's output tables.
//!
//! Accepts the name→table mapping the transform core produces and writes
//! one CSV file per table. Creating the output directory is an explicit
//! setup step ([`CsvSink::create`]) invoked once per run by the pipeline
//! driver, never a side effect of loading a module.

use std::path::{Path, PathBuf};

use mke_crime_models::{JoinedRecord, Offense, Summaries, weekday_name};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while writing output tables.
#[derive(Debug, Error)]
pub enum SinkError {
    /// I/O error (directory creation, file write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes output tables as CSV files into one output directory.
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    /// Creates the sink, creating the output directory (and parents) if
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the directory cannot be created.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The output directory this sink writes into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the CSV file for a named table.
    #[must_use]
    pub fn table_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.csv"))
    }

    /// Writes all six summary tables, one CSV per table, using the
    /// documented table names. Headers are written even for empty tables.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if any file cannot be written.
    pub fn write_summaries(&self, summaries: &Summaries) -> Result<(), SinkError> {
        self.write_table(
            Summaries::CRIMES_PER_MONTH,
            &["Year", "Month", "CrimeCount"],
            &summaries.crimes_per_month,
        )?;
        self.write_table(
            Summaries::CRIMES_BY_HOUR,
            &["Hour", "CrimeCount"],
            &summaries.crimes_by_hour,
        )?;
        self.write_table(
            Summaries::CRIMES_BY_WEEKDAY,
            &["Weekday", "CrimeCount"],
            &summaries.crimes_by_weekday,
        )?;
        self.write_table(
            Summaries::CRIME_TYPE_DISTRIBUTION,
            &["Offense", "CrimeCount"],
            &summaries.crime_type_distribution,
        )?;

        let mut neighborhood_headers = vec!["Neighborhood"];
        neighborhood_headers.extend(Offense::all().iter().map(AsRef::as_ref));
        neighborhood_headers.push("CrimeCount");
        self.write_table(
            Summaries::CRIMES_PER_NEIGHBORHOOD,
            &neighborhood_headers,
            &summaries.crimes_per_neighborhood,
        )?;

        self.write_table(
            Summaries::MOST_COMMON_OFFENSE_PER_NEIGHBORHOOD,
            &["Neighborhood", "Offense", "CrimeCount"],
            &summaries.most_common_offense_per_neighborhood,
        )?;

        Ok(())
    }

    /// Writes the full joined table as `crimes_joined.csv`. Null fields
    /// become empty cells; offense flags are written as 0/1.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError`] if the file cannot be written.
    pub fn write_joined(&self, joined: &[JoinedRecord]) -> Result<(), SinkError> {
        let path = self.table_path(Summaries::CRIMES_JOINED);
        let mut writer = csv::Writer::from_path(&path)?;

        let mut headers = vec!["Id", "RoughX", "RoughY", "ReportedDateTime"];
        headers.extend(Offense::all().iter().map(AsRef::as_ref));
        headers.extend(["Neighborhood", "Year", "Month", "Hour", "Weekday"]);
        writer.write_record(&headers)?;

        for record in joined {
            let mut row: Vec<String> = vec![
                record.incident.id.to_string(),
                record.incident.rough_x.map_or_else(String::new, |x| x.to_string()),
                record.incident.rough_y.map_or_else(String::new, |y| y.to_string()),
                record.incident.reported.clone().unwrap_or_default(),
            ];
            for offense in Offense::all() {
                row.push(if record.incident.offenses.get(*offense) {
                    "1".to_string()
                } else {
                    "0".to_string()
                });
            }
            row.push(record.neighborhood.clone().unwrap_or_default());
            row.push(record.year.map_or_else(String::new, |y| y.to_string()));
            row.push(record.month.map_or_else(String::new, |m| m.to_string()));
            row.push(record.hour.map_or_else(String::new, |h| h.to_string()));
            row.push(
                record
                    .weekday
                    .map_or_else(String::new, |w| weekday_name(w).to_string()),
            );
            writer.write_record(&row)?;
        }

        writer.flush()?;
        log::info!("Wrote {} rows to {}", joined.len(), path.display());
        Ok(())
    }

    fn write_table<T: Serialize>(
        &self,
        name: &str,
        headers: &[&str],
        rows: &[T],
    ) -> Result<(), SinkError> {
        let path = self.table_path(name);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)?;

        writer.write_record(headers)?;
        for row in rows {
            writer.serialize(row)?;
        }

        writer.flush()?;
        log::info!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mke_crime_models::{MonthlyCount, NeighborhoodCounts};

    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mke_crime_load_{label}_{}", std::process::id()))
    }

    #[test]
    fn writes_summary_tables_with_headers() {
        let dir = scratch_dir("summaries");
        let sink = CsvSink::create(&dir).unwrap();

        let summaries = Summaries {
            crimes_per_month: vec![MonthlyCount {
                year: 2023,
                month: 6,
                crime_count: 2,
            }],
            crimes_per_neighborhood: vec![NeighborhoodCounts::from_sums(
                "RIVERWEST".to_string(),
                [0, 0, 1, 0, 0, 0, 0, 0, 2, 0],
            )],
            ..Summaries::default()
        };
        sink.write_summaries(&summaries).unwrap();

        let months =
            std::fs::read_to_string(sink.table_path(Summaries::CRIMES_PER_MONTH)).unwrap();
        assert_eq!(months, "Year,Month,CrimeCount\n2023,6,2\n");

        let neighborhoods =
            std::fs::read_to_string(sink.table_path(Summaries::CRIMES_PER_NEIGHBORHOOD)).unwrap();
        let mut lines = neighborhoods.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Neighborhood,Arson,AssaultOffense,Burglary,CriminalDamage,Homicide,LockedVehicle,Robbery,SexOffense,Theft,VehicleTheft,CrimeCount"
        );
        assert_eq!(lines.next().unwrap(), "RIVERWEST,0,0,1,0,0,0,0,0,2,0,3");

        // Empty tables still get their header row.
        let hours = std::fs::read_to_string(sink.table_path(Summaries::CRIMES_BY_HOUR)).unwrap();
        assert_eq!(hours, "Hour,CrimeCount\n");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn writes_joined_table_with_empty_cells_for_nulls() {
        use chrono::Weekday;
        use mke_crime_models::{IncidentRecord, OffenseFlags};

        let dir = scratch_dir("joined");
        let sink = CsvSink::create(&dir).unwrap();

        let mut offenses = OffenseFlags::default();
        offenses.theft = true;
        let joined = vec![JoinedRecord {
            incident: IncidentRecord {
                id: 0,
                rough_x: Some(5.0),
                rough_y: None,
                reported: Some("2023-06-15 21:30:00".to_string()),
                offenses,
            },
            neighborhood: None,
            year: Some(2023),
            month: Some(6),
            hour: Some(21),
            weekday: Some(Weekday::Thu),
        }];
        sink.write_joined(&joined).unwrap();

        let contents =
            std::fs::read_to_string(sink.table_path(Summaries::CRIMES_JOINED)).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("Id,RoughX,RoughY,"));
        assert_eq!(
            lines.next().unwrap(),
            "0,5,,2023-06-15 21:30:00,0,0,0,0,0,0,0,0,1,0,,2023,6,21,Thursday"
        );

        std::fs::remove_dir_all(&dir).ok();
    }
}
