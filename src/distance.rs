use crate::error::TrailError;
use crate::trail_types::{Path, Point};

type Result<T> = std::result::Result<T, TrailError>;

/// Mean earth radius used by [`haversine_distance`], in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in metres. Elevation is ignored.
pub fn haversine_distance(p1: &Point, p2: &Point) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let dlat = (p2.lat - p1.lat).to_radians();
    let dlon = (p2.lon - p1.lon).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Sum `distance` over every consecutive vertex pair between `idx1` and `idx2`.
///
/// The result does not depend on argument order. Indices outside the path
/// yield [`TrailError::InvalidIndex`].
pub fn checked_distance_on_path<F>(distance: F, path: &Path, idx1: usize, idx2: usize) -> Result<f64>
where
    F: Fn(&Point, &Point) -> f64,
{
    for index in [idx1, idx2] {
        if index >= path.len() {
            return Err(TrailError::InvalidIndex {
                index,
                len: path.len(),
            });
        }
    }

    let start = idx1.min(idx2);
    let end = idx1.max(idx2);

    Ok(path.points[start..=end]
        .windows(2)
        .fold(0.0, |total, pair| total + distance(&pair[0], &pair[1])))
}

/// Walking distance along `path` between two vertex indices.
///
/// # Panics
///
/// Panics if either index is not a vertex of `path`. Callers are expected to
/// pass indices produced by snapping stamps onto this same path.
pub fn distance_on_path<F>(distance: F, path: &Path, idx1: usize, idx2: usize) -> f64
where
    F: Fn(&Point, &Point) -> f64,
{
    match checked_distance_on_path(distance, path, idx1, idx2) {
        Ok(d) => d,
        Err(e) => panic!("{e}"),
    }
}
