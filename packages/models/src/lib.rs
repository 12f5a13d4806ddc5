#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared data model for the Milwaukee crime ETL pipeline.
//!
//! Defines the fixed ten-offense taxonomy, the incident and neighborhood
//! boundary types produced by loading, the joined record produced by the
//! transform stages, and the summary-table row types consumed by the sink.

use chrono::Weekday;
use geo::MultiPolygon;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// The ten offense categories reported per incident.
///
/// The variant order is the canonical category order used everywhere a
/// deterministic ordering over offenses is needed (distribution rows,
/// most-common tie-breaks). Variant names match the source column names
/// exactly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Offense {
    /// Intentional destruction of property by fire
    Arson,
    /// Assault and battery offenses
    AssaultOffense,
    /// Unlawful entry to commit a felony or theft
    Burglary,
    /// Willful destruction or damage of property
    CriminalDamage,
    /// Murder and non-negligent manslaughter
    Homicide,
    /// Theft from a locked vehicle
    LockedVehicle,
    /// Taking property by force or threat
    Robbery,
    /// Forcible sexual offenses
    SexOffense,
    /// Unlawful taking of property
    Theft,
    /// Theft of a motor vehicle
    VehicleTheft,
}

impl Offense {
    /// Returns all variants in the canonical category order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Arson,
            Self::AssaultOffense,
            Self::Burglary,
            Self::CriminalDamage,
            Self::Homicide,
            Self::LockedVehicle,
            Self::Robbery,
            Self::SexOffense,
            Self::Theft,
            Self::VehicleTheft,
        ]
    }

    /// Position of this offense in the canonical order.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// The ten boolean offense flags carried by a single incident.
///
/// More than one flag may be true for the same incident; multi-offense
/// incidents are preserved as-is, never collapsed to a single label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OffenseFlags {
    pub arson: bool,
    pub assault_offense: bool,
    pub burglary: bool,
    pub criminal_damage: bool,
    pub homicide: bool,
    pub locked_vehicle: bool,
    pub robbery: bool,
    pub sex_offense: bool,
    pub theft: bool,
    pub vehicle_theft: bool,
}

impl OffenseFlags {
    /// Returns the flag for the given offense.
    #[must_use]
    pub const fn get(self, offense: Offense) -> bool {
        match offense {
            Offense::Arson => self.arson,
            Offense::AssaultOffense => self.assault_offense,
            Offense::Burglary => self.burglary,
            Offense::CriminalDamage => self.criminal_damage,
            Offense::Homicide => self.homicide,
            Offense::LockedVehicle => self.locked_vehicle,
            Offense::Robbery => self.robbery,
            Offense::SexOffense => self.sex_offense,
            Offense::Theft => self.theft,
            Offense::VehicleTheft => self.vehicle_theft,
        }
    }

    /// Sets the flag for the given offense.
    pub const fn set(&mut self, offense: Offense, value: bool) {
        match offense {
            Offense::Arson => self.arson = value,
            Offense::AssaultOffense => self.assault_offense = value,
            Offense::Burglary => self.burglary = value,
            Offense::CriminalDamage => self.criminal_damage = value,
            Offense::Homicide => self.homicide = value,
            Offense::LockedVehicle => self.locked_vehicle = value,
            Offense::Robbery => self.robbery = value,
            Offense::SexOffense => self.sex_offense = value,
            Offense::Theft => self.theft = value,
            Offense::VehicleTheft => self.vehicle_theft = value,
        }
    }

    /// Row-wise sum across the ten flags.
    #[must_use]
    pub fn count_true(self) -> u64 {
        Offense::all()
            .iter()
            .filter(|offense| self.get(**offense))
            .count() as u64
    }
}

/// One reported crime as produced by the record loader.
///
/// Immutable after load; the join and feature-extraction stages produce a
/// derived [`JoinedRecord`] rather than mutating this in place.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    /// Sequential identifier spanning the full (possibly concatenated)
    /// input set. No reuse, no gaps.
    pub id: u64,
    /// Raw X coordinate, `None` when missing or non-numeric in the source.
    pub rough_x: Option<f64>,
    /// Raw Y coordinate, `None` when missing or non-numeric in the source.
    pub rough_y: Option<f64>,
    /// Raw report timestamp, kept verbatim; may be malformed.
    pub reported: Option<String>,
    /// The ten offense category flags.
    pub offenses: OffenseFlags,
}

/// A named neighborhood boundary polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodBoundary {
    /// Neighborhood name, the join key (`NEIGHBORHD` in the source data).
    pub name: String,
    /// Boundary geometry.
    pub polygon: MultiPolygon<f64>,
}

/// The full neighborhood boundary set, tagged with its coordinate
/// reference system.
///
/// Boundary order is load order, which is also the deterministic
/// first-match tie-break order used by the spatial join.
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborhoodSet {
    /// Coordinate reference system tag (e.g., `"EPSG:32054"`).
    pub crs: String,
    /// Boundaries in load order.
    pub boundaries: Vec<NeighborhoodBoundary>,
}

impl NeighborhoodSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }
}

/// An [`IncidentRecord`] extended with its neighborhood assignment and
/// derived temporal features. One-to-one with the incident set.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedRecord {
    /// The underlying incident.
    pub incident: IncidentRecord,
    /// Assigned neighborhood name; `None` means no containing polygon was
    /// found or the incident had no coordinates.
    pub neighborhood: Option<String>,
    /// Report year, `None` when the timestamp did not parse.
    pub year: Option<i32>,
    /// Report month (1-12), `None` when the timestamp did not parse.
    pub month: Option<u32>,
    /// Report hour (0-23), `None` when the timestamp did not parse.
    pub hour: Option<u32>,
    /// Report weekday, `None` when the timestamp did not parse.
    pub weekday: Option<Weekday>,
}

/// Full English day name for a weekday, locale-independent.
#[must_use]
pub const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// One row of the `crimes_per_month` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub crime_count: u64,
}

/// One row of the `crimes_by_hour` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HourlyCount {
    pub hour: u32,
    pub crime_count: u64,
}

/// One row of the `crimes_by_weekday` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeekdayCount {
    /// Full English day name.
    pub weekday: String,
    pub crime_count: u64,
}

/// One row of the `crime_type_distribution` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OffenseTotal {
    pub offense: Offense,
    pub crime_count: u64,
}

/// One row of the `crimes_per_neighborhood` table: per-offense sums over
/// the neighborhood group plus the row-wise total across all ten flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NeighborhoodCounts {
    pub neighborhood: String,
    pub arson: u64,
    pub assault_offense: u64,
    pub burglary: u64,
    pub criminal_damage: u64,
    pub homicide: u64,
    pub locked_vehicle: u64,
    pub robbery: u64,
    pub sex_offense: u64,
    pub theft: u64,
    pub vehicle_theft: u64,
    /// Sum of the ten offense columns for this neighborhood.
    pub crime_count: u64,
}

impl NeighborhoodCounts {
    /// Builds a row from per-offense sums in canonical category order.
    #[must_use]
    pub fn from_sums(neighborhood: String, sums: [u64; 10]) -> Self {
        Self {
            neighborhood,
            arson: sums[Offense::Arson.index()],
            assault_offense: sums[Offense::AssaultOffense.index()],
            burglary: sums[Offense::Burglary.index()],
            criminal_damage: sums[Offense::CriminalDamage.index()],
            homicide: sums[Offense::Homicide.index()],
            locked_vehicle: sums[Offense::LockedVehicle.index()],
            robbery: sums[Offense::Robbery.index()],
            sex_offense: sums[Offense::SexOffense.index()],
            theft: sums[Offense::Theft.index()],
            vehicle_theft: sums[Offense::VehicleTheft.index()],
            crime_count: sums.iter().sum(),
        }
    }

    /// Returns the summed count for the given offense.
    #[must_use]
    pub const fn offense_count(&self, offense: Offense) -> u64 {
        match offense {
            Offense::Arson => self.arson,
            Offense::AssaultOffense => self.assault_offense,
            Offense::Burglary => self.burglary,
            Offense::CriminalDamage => self.criminal_damage,
            Offense::Homicide => self.homicide,
            Offense::LockedVehicle => self.locked_vehicle,
            Offense::Robbery => self.robbery,
            Offense::SexOffense => self.sex_offense,
            Offense::Theft => self.theft,
            Offense::VehicleTheft => self.vehicle_theft,
        }
    }
}

/// One row of the `most_common_offense_per_neighborhood` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MostCommonOffense {
    pub neighborhood: String,
    /// The offense with the maximum summed count in this neighborhood;
    /// ties resolve to the first offense in canonical category order.
    pub offense: Offense,
    pub crime_count: u64,
}

/// The six summary tables produced by one pipeline run.
///
/// Derived, read-only outputs; row orders are deterministic and documented
/// per table on the aggregation functions that produce them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Summaries {
    pub crimes_per_month: Vec<MonthlyCount>,
    pub crimes_by_hour: Vec<HourlyCount>,
    pub crimes_by_weekday: Vec<WeekdayCount>,
    pub crime_type_distribution: Vec<OffenseTotal>,
    pub crimes_per_neighborhood: Vec<NeighborhoodCounts>,
    pub most_common_offense_per_neighborhood: Vec<MostCommonOffense>,
}

impl Summaries {
    /// Sink table name for [`Self::crimes_per_month`].
    pub const CRIMES_PER_MONTH: &'static str = "crimes_per_month";
    /// Sink table name for [`Self::crimes_by_hour`].
    pub const CRIMES_BY_HOUR: &'static str = "crimes_by_hour";
    /// Sink table name for [`Self::crimes_by_weekday`].
    pub const CRIMES_BY_WEEKDAY: &'static str = "crimes_by_weekday";
    /// Sink table name for [`Self::crime_type_distribution`].
    pub const CRIME_TYPE_DISTRIBUTION: &'static str = "crime_type_distribution";
    /// Sink table name for [`Self::crimes_per_neighborhood`].
    pub const CRIMES_PER_NEIGHBORHOOD: &'static str = "crimes_per_neighborhood";
    /// Sink table name for [`Self::most_common_offense_per_neighborhood`].
    pub const MOST_COMMON_OFFENSE_PER_NEIGHBORHOOD: &'static str =
        "most_common_offense_per_neighborhood";
    /// Sink table name for the full joined table.
    pub const CRIMES_JOINED: &'static str = "crimes_joined";
}

/// Per-record drop and null-outcome counters for one pipeline run.
///
/// Recoverable failures never abort the batch; these counters make them
/// observable instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Records dropped at load time for non-boolean offense flag values.
    pub malformed_records: u64,
    /// Records with a missing coordinate component (kept, null geometry).
    pub missing_coordinates: u64,
    /// Records whose timestamp failed to parse (kept, null features).
    pub unparseable_timestamps: u64,
    /// Records with no containing neighborhood polygon (kept, null
    /// assignment), including all records without geometry.
    pub unassigned: u64,
}
