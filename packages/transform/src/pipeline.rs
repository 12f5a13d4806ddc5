//! The canonical pipeline driver: load → geometry → join → temporal
//! features → aggregation.
//!
//! One configurable path replaces the per-dataset script variants of the
//! original pipeline: single-source runs pass an empty second partition,
//! and partition precedence is an explicit parameter rather than a code
//! path.

use mke_crime_models::{JoinedRecord, NeighborhoodSet, RunStats, Summaries};
use serde_json::Value;

use crate::{TransformError, aggregate, geometry, join, loader, temporal};

/// Which partition leads the concatenated record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PartitionPrecedence {
    /// Historical rows first, then current (chronological layout, the
    /// default).
    #[default]
    HistoricalFirst,
    /// Current rows first, then historical.
    CurrentFirst,
}

/// Explicit pipeline parameters.
///
/// The coordinate reference system tag describes the incident coordinates
/// as documented by the upstream source; it is applied to the point table,
/// never inferred, and must match the boundary set's tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Reference system tag for incident coordinates (e.g., `"EPSG:32054"`).
    pub crs: String,
    /// Partition concatenation order.
    pub precedence: PartitionPrecedence,
}

impl PipelineConfig {
    /// Config with the given reference system tag and default precedence.
    #[must_use]
    pub fn new(crs: impl Into<String>) -> Self {
        Self {
            crs: crs.into(),
            precedence: PartitionPrecedence::default(),
        }
    }
}

/// Everything one pipeline run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// The full joined, feature-enriched record set, one row per surviving
    /// incident.
    pub joined: Vec<JoinedRecord>,
    /// The six summary tables.
    pub summaries: Summaries,
    /// Per-record drop and null-outcome counters.
    pub stats: RunStats,
}

/// Runs the full transform pipeline over two raw incident partitions and a
/// neighborhood boundary set.
///
/// Single-source callers pass an empty `historical` partition. Zero
/// incident records is a successful run producing empty tables; recoverable
/// per-record failures are counted in [`RunStats`] and never abort the
/// batch. The computation is pure and synchronous: identical inputs yield
/// identical outputs, including row order.
///
/// # Errors
///
/// Returns [`TransformError::NoBoundaryData`] when the boundary set is
/// empty and [`TransformError::CrsMismatch`] when the configured incident
/// reference system does not match the boundary set's.
pub fn run(
    current: Vec<Value>,
    historical: Vec<Value>,
    boundaries: &NeighborhoodSet,
    config: &PipelineConfig,
) -> Result<PipelineOutput, TransformError> {
    let partitions = match config.precedence {
        PartitionPrecedence::HistoricalFirst => [historical, current],
        PartitionPrecedence::CurrentFirst => [current, historical],
    };

    let loader::LoadOutcome { records, malformed } = loader::load_incidents(&partitions);

    let points = geometry::build_points(&records, &config.crs);
    let missing_coordinates = (records.len() - points.points.len()) as u64;

    let assignments = join::assign_neighborhoods(&points, boundaries)?;

    let mut unparseable_timestamps: u64 = 0;
    let mut unassigned: u64 = 0;
    let mut joined = Vec::with_capacity(records.len());

    for incident in records {
        let neighborhood = assignments.get(&incident.id).cloned();
        if neighborhood.is_none() {
            unassigned += 1;
        }

        let features = temporal::features(incident.reported.as_deref());
        if features.is_none() {
            unparseable_timestamps += 1;
        }

        joined.push(JoinedRecord {
            incident,
            neighborhood,
            year: features.map(|f| f.year),
            month: features.map(|f| f.month),
            hour: features.map(|f| f.hour),
            weekday: features.map(|f| f.weekday),
        });
    }

    let summaries = aggregate::summarize(&joined);

    let stats = RunStats {
        malformed_records: malformed,
        missing_coordinates,
        unparseable_timestamps,
        unassigned,
    };
    log::info!(
        "Pipeline complete: {} joined records, {} malformed dropped, {} without coordinates, {} without parseable timestamps, {} unassigned",
        joined.len(),
        stats.malformed_records,
        stats.missing_coordinates,
        stats.unparseable_timestamps,
        stats.unassigned
    );

    Ok(PipelineOutput {
        joined,
        summaries,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use geo::{LineString, MultiPolygon, Polygon};
    use mke_crime_models::{NeighborhoodBoundary, Offense};
    use serde_json::json;

    use super::*;

    const CRS: &str = "EPSG:32054";

    fn boundaries() -> NeighborhoodSet {
        let square = |name: &str, x0: f64, y0: f64, x1: f64, y1: f64| NeighborhoodBoundary {
            name: name.to_string(),
            polygon: MultiPolygon(vec![Polygon::new(
                LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]),
                vec![],
            )]),
        };
        NeighborhoodSet {
            crs: CRS.to_string(),
            boundaries: vec![
                square("RIVERWEST", 0.0, 0.0, 10.0, 10.0),
                square("BAY VIEW", 20.0, 0.0, 30.0, 10.0),
            ],
        }
    }

    fn row(x: Value, y: Value, reported: &str, offenses: &[Offense]) -> Value {
        let mut value = json!({
            "RoughX": x,
            "RoughY": y,
            "ReportedDateTime": reported,
        });
        for offense in Offense::all() {
            value[offense.as_ref()] = json!(0);
        }
        for offense in offenses {
            value[offense.as_ref()] = json!(1);
        }
        value
    }

    fn config() -> PipelineConfig {
        PipelineConfig::new(CRS)
    }

    #[test]
    fn end_to_end_run_produces_all_tables() {
        let current = vec![
            row(
                json!(5.0),
                json!(5.0),
                "2023-06-15 21:30:00",
                &[Offense::Theft],
            ),
            row(
                json!(25.0),
                json!(5.0),
                "2023-06-16 03:00:00",
                &[Offense::Burglary],
            ),
        ];
        let historical = vec![row(
            json!(5.0),
            json!(6.0),
            "2007-01-01 00:00:00",
            &[Offense::Homicide],
        )];

        let output = run(current, historical, &boundaries(), &config()).unwrap();

        assert_eq!(output.joined.len(), 3);
        // HistoricalFirst precedence: the 2007 record gets id 0.
        assert_eq!(output.joined[0].year, Some(2007));

        assert_eq!(output.summaries.crimes_per_month.len(), 3);
        assert_eq!(output.summaries.crimes_per_neighborhood.len(), 2);
        assert_eq!(
            output.summaries.most_common_offense_per_neighborhood[1].neighborhood,
            "RIVERWEST"
        );
        assert_eq!(output.stats, RunStats::default());
    }

    #[test]
    fn identical_inputs_produce_identical_outputs() {
        let make_inputs = || {
            (
                vec![
                    row(
                        json!(5.0),
                        json!(5.0),
                        "2023-06-15 21:30:00",
                        &[Offense::Theft, Offense::Burglary],
                    ),
                    row(json!(null), json!(5.0), "bad timestamp", &[Offense::Arson]),
                ],
                vec![row(
                    json!(25.0),
                    json!(5.0),
                    "2019-02-03 12:00:00",
                    &[Offense::Robbery],
                )],
            )
        };

        let (current, historical) = make_inputs();
        let first = run(current, historical, &boundaries(), &config()).unwrap();
        let (current, historical) = make_inputs();
        let second = run(current, historical, &boundaries(), &config()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn crs_mismatch_aborts_with_no_output() {
        let current = vec![row(
            json!(5.0),
            json!(5.0),
            "2023-06-15 21:30:00",
            &[Offense::Theft],
        )];

        let result = run(
            current,
            vec![],
            &boundaries(),
            &PipelineConfig::new("EPSG:4326"),
        );
        assert!(matches!(result, Err(TransformError::CrsMismatch { .. })));
    }

    #[test]
    fn zero_boundaries_is_fatal_even_with_zero_records() {
        let empty = NeighborhoodSet {
            crs: CRS.to_string(),
            boundaries: vec![],
        };
        let result = run(vec![], vec![], &empty, &config());
        assert!(matches!(result, Err(TransformError::NoBoundaryData)));
    }

    #[test]
    fn zero_records_is_a_successful_empty_run() {
        let output = run(vec![], vec![], &boundaries(), &config()).unwrap();
        assert!(output.joined.is_empty());
        assert!(output.summaries.crimes_per_month.is_empty());
        assert_eq!(output.stats, RunStats::default());
    }

    #[test]
    fn missing_coordinates_keep_temporal_counts_but_not_neighborhood() {
        let current = vec![row(
            json!(null),
            json!(null),
            "2023-06-15 21:30:00",
            &[Offense::Theft],
        )];

        let output = run(current, vec![], &boundaries(), &config()).unwrap();

        assert_eq!(output.joined[0].neighborhood, None);
        assert_eq!(output.joined[0].month, Some(6));
        assert_eq!(output.summaries.crimes_per_month[0].crime_count, 1);
        assert_eq!(output.summaries.crimes_by_hour[0].crime_count, 1);
        assert!(output.summaries.crimes_per_neighborhood.is_empty());
        assert_eq!(output.stats.missing_coordinates, 1);
        assert_eq!(output.stats.unassigned, 1);
    }

    #[test]
    fn unparseable_timestamp_keeps_neighborhood_counts() {
        let current = vec![row(json!(5.0), json!(5.0), "??", &[Offense::Theft])];

        let output = run(current, vec![], &boundaries(), &config()).unwrap();

        assert_eq!(
            output.joined[0].neighborhood.as_deref(),
            Some("RIVERWEST")
        );
        assert_eq!(output.joined[0].year, None);
        assert!(output.summaries.crimes_per_month.is_empty());
        assert_eq!(output.summaries.crimes_per_neighborhood[0].theft, 1);
        assert_eq!(output.stats.unparseable_timestamps, 1);
    }

    #[test]
    fn current_first_precedence_reverses_concatenation() {
        let current = vec![row(
            json!(5.0),
            json!(5.0),
            "2023-06-15 21:30:00",
            &[Offense::Theft],
        )];
        let historical = vec![row(
            json!(5.0),
            json!(5.0),
            "2007-01-01 00:00:00",
            &[Offense::Theft],
        )];

        let config = PipelineConfig {
            crs: CRS.to_string(),
            precedence: PartitionPrecedence::CurrentFirst,
        };
        let output = run(current, historical, &boundaries(), &config).unwrap();

        assert_eq!(output.joined[0].incident.id, 0);
        assert_eq!(output.joined[0].year, Some(2023));
        assert_eq!(output.joined[1].year, Some(2007));
    }

    #[test]
    fn malformed_records_are_dropped_and_counted() {
        let mut bad = row(
            json!(5.0),
            json!(5.0),
            "2023-06-15 21:30:00",
            &[Offense::Theft],
        );
        bad["Arson"] = json!("not a flag");
        let good = row(
            json!(5.0),
            json!(5.0),
            "2023-06-15 22:00:00",
            &[Offense::Theft],
        );

        let output = run(vec![bad, good], vec![], &boundaries(), &config()).unwrap();

        assert_eq!(output.joined.len(), 1);
        assert_eq!(output.stats.malformed_records, 1);
    }
}
