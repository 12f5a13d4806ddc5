//! Builds point geometries for incidents with complete coordinate pairs.

use geo::Point;
use mke_crime_models::IncidentRecord;

/// Point geometries keyed by record identifier, tagged with the coordinate
/// reference system the points are expressed in.
///
/// The tag is supplied by the caller (it describes the upstream data, it is
/// never inferred from the coordinates) and must match the boundary set's
/// tag before the spatial join will run.
#[derive(Debug, Clone, PartialEq)]
pub struct PointTable {
    /// Coordinate reference system tag (e.g., `"EPSG:32054"`).
    pub crs: String,
    /// One point per record with a complete coordinate pair, in record
    /// order.
    pub points: Vec<(u64, Point<f64>)>,
}

/// Emits one point per record whose coordinate pair is fully present.
///
/// Records with a missing component are excluded from the point table but
/// stay in the wider pipeline; they receive a null neighborhood assignment
/// downstream rather than a fabricated one.
#[must_use]
pub fn build_points(records: &[IncidentRecord], crs: &str) -> PointTable {
    let mut points = Vec::new();

    for record in records {
        if let (Some(x), Some(y)) = (record.rough_x, record.rough_y) {
            points.push((record.id, Point::new(x, y)));
        }
    }

    log::debug!(
        "Built {} point geometries from {} records",
        points.len(),
        records.len()
    );

    PointTable {
        crs: crs.to_string(),
        points,
    }
}
