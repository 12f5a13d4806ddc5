//! Assigns incident points to neighborhood polygons.
//!
//! Builds an R-tree over boundary envelopes for candidate lookup, then
//! tests containment per point. Containment is boundary-inclusive: a point
//! lying exactly on a polygon edge is inside.

use std::collections::BTreeMap;

use geo::{BoundingRect, Intersects, MultiPolygon, Point};
use mke_crime_models::NeighborhoodSet;
use rstar::{AABB, RTree, RTreeObject};

use crate::TransformError;
use crate::geometry::PointTable;

/// A boundary polygon stored in the R-tree with its metadata.
struct BoundaryEntry {
    /// Position in the boundary set's load order; the tie-break key when
    /// overlapping polygons both contain a point.
    index: usize,
    name: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl RTreeObject for BoundaryEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Pre-built spatial index over one neighborhood boundary set.
pub struct BoundaryIndex {
    tree: RTree<BoundaryEntry>,
}

impl BoundaryIndex {
    /// Builds an R-tree index from the boundary set, preserving load order
    /// as the tie-break order.
    #[must_use]
    pub fn build(boundaries: &NeighborhoodSet) -> Self {
        let entries = boundaries
            .boundaries
            .iter()
            .enumerate()
            .map(|(index, boundary)| BoundaryEntry {
                index,
                name: boundary.name.clone(),
                envelope: compute_envelope(&boundary.polygon),
                polygon: boundary.polygon.clone(),
            })
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Looks up the neighborhood containing a point.
    ///
    /// Neighborhood polygons are not supposed to overlap; when they do, the
    /// polygon with the lowest load index wins so that repeated runs always
    /// assign the same neighborhood. This is a documented tie-break, not a
    /// data-quality guarantee.
    #[must_use]
    pub fn locate(&self, point: Point<f64>) -> Option<&str> {
        let query_env = AABB::from_point([point.x(), point.y()]);
        let mut best: Option<&BoundaryEntry> = None;

        for entry in self.tree.locate_in_envelope_intersecting(&query_env) {
            if entry.polygon.intersects(&point) {
                match best {
                    None => best = Some(entry),
                    Some(current) if entry.index < current.index => best = Some(entry),
                    _ => {}
                }
            }
        }

        best.map(|entry| entry.name.as_str())
    }
}

/// Assigns each incident point to at most one containing neighborhood.
///
/// Returns a map from record identifier to neighborhood name. Points with
/// no containing polygon are simply absent; records with no geometry never
/// reach this function and get a null assignment by construction.
///
/// # Errors
///
/// Returns [`TransformError::NoBoundaryData`] if the boundary set is empty
/// and [`TransformError::CrsMismatch`] if the point table and boundary set
/// carry different coordinate reference systems. There is no implicit
/// reprojection.
pub fn assign_neighborhoods(
    points: &PointTable,
    boundaries: &NeighborhoodSet,
) -> Result<BTreeMap<u64, String>, TransformError> {
    if boundaries.is_empty() {
        return Err(TransformError::NoBoundaryData);
    }

    if !crs_matches(&points.crs, &boundaries.crs) {
        return Err(TransformError::CrsMismatch {
            points: points.crs.clone(),
            boundaries: boundaries.crs.clone(),
        });
    }

    let index = BoundaryIndex::build(boundaries);
    let mut assignments = BTreeMap::new();

    for (id, point) in &points.points {
        if let Some(name) = index.locate(*point) {
            assignments.insert(*id, name.to_string());
        }
    }

    log::info!(
        "Assigned {} of {} incident points to a neighborhood",
        assignments.len(),
        points.points.len()
    );

    Ok(assignments)
}

/// Reference system tags match when equal after trimming, ignoring ASCII
/// case (`"epsg:32054"` and `"EPSG:32054"` are the same system).
fn crs_matches(points: &str, boundaries: &str) -> bool {
    points.trim().eq_ignore_ascii_case(boundaries.trim())
}

/// Bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(polygon: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    polygon.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};
    use mke_crime_models::NeighborhoodBoundary;

    use super::*;

    fn square(name: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> NeighborhoodBoundary {
        let exterior = LineString::from(vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]);
        NeighborhoodBoundary {
            name: name.to_string(),
            polygon: MultiPolygon(vec![Polygon::new(exterior, vec![])]),
        }
    }

    fn set(boundaries: Vec<NeighborhoodBoundary>) -> NeighborhoodSet {
        NeighborhoodSet {
            crs: "EPSG:32054".to_string(),
            boundaries,
        }
    }

    fn points(pairs: &[(u64, f64, f64)]) -> PointTable {
        PointTable {
            crs: "EPSG:32054".to_string(),
            points: pairs
                .iter()
                .map(|(id, x, y)| (*id, Point::new(*x, *y)))
                .collect(),
        }
    }

    #[test]
    fn assigns_contained_points_and_skips_outsiders() {
        let boundaries = set(vec![
            square("RIVERWEST", 0.0, 0.0, 4.0, 4.0),
            square("BAY VIEW", 10.0, 10.0, 14.0, 14.0),
        ]);
        let table = points(&[(0, 1.0, 1.0), (1, 11.0, 13.0), (2, 50.0, 50.0)]);

        let assignments = assign_neighborhoods(&table, &boundaries).unwrap();
        assert_eq!(assignments.get(&0).map(String::as_str), Some("RIVERWEST"));
        assert_eq!(assignments.get(&1).map(String::as_str), Some("BAY VIEW"));
        assert!(!assignments.contains_key(&2));
    }

    #[test]
    fn containment_is_boundary_inclusive() {
        let boundaries = set(vec![square("RIVERWEST", 0.0, 0.0, 4.0, 4.0)]);
        let table = points(&[(0, 4.0, 2.0), (1, 0.0, 0.0)]);

        let assignments = assign_neighborhoods(&table, &boundaries).unwrap();
        assert_eq!(assignments.len(), 2);
    }

    #[test]
    fn overlap_resolves_to_first_boundary_in_load_order() {
        // Both squares contain (3, 3).
        let first = set(vec![
            square("HARAMBEE", 0.0, 0.0, 4.0, 4.0),
            square("RIVERWEST", 2.0, 2.0, 6.0, 6.0),
        ]);
        let reversed = set(vec![
            square("RIVERWEST", 2.0, 2.0, 6.0, 6.0),
            square("HARAMBEE", 0.0, 0.0, 4.0, 4.0),
        ]);
        let table = points(&[(0, 3.0, 3.0)]);

        let assignments = assign_neighborhoods(&table, &first).unwrap();
        assert_eq!(assignments.get(&0).map(String::as_str), Some("HARAMBEE"));

        let assignments = assign_neighborhoods(&table, &reversed).unwrap();
        assert_eq!(assignments.get(&0).map(String::as_str), Some("RIVERWEST"));
    }

    #[test]
    fn crs_mismatch_is_fatal() {
        let mut boundaries = set(vec![square("RIVERWEST", 0.0, 0.0, 4.0, 4.0)]);
        boundaries.crs = "EPSG:4326".to_string();
        let table = points(&[(0, 1.0, 1.0)]);

        let err = assign_neighborhoods(&table, &boundaries).unwrap_err();
        assert!(matches!(err, TransformError::CrsMismatch { .. }));
    }

    #[test]
    fn crs_comparison_ignores_case_and_whitespace() {
        let mut boundaries = set(vec![square("RIVERWEST", 0.0, 0.0, 4.0, 4.0)]);
        boundaries.crs = " epsg:32054 ".to_string();
        let table = points(&[(0, 1.0, 1.0)]);

        assert!(assign_neighborhoods(&table, &boundaries).is_ok());
    }

    #[test]
    fn empty_boundary_set_is_fatal() {
        let boundaries = set(vec![]);
        let table = points(&[]);

        let err = assign_neighborhoods(&table, &boundaries).unwrap_err();
        assert!(matches!(err, TransformError::NoBoundaryData));
    }
}
