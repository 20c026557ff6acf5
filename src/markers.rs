use log::debug;

use crate::distance::distance_on_path;
use crate::error::TrailError;
use crate::trail_types::*;

type Result<T> = std::result::Result<T, TrailError>;

/// Snap every stamp to its nearest path vertex and sort them in trail order.
///
/// The nearest vertex is the first one, scanning from the start of the path,
/// with the smallest `distance` to the stamp. The sort is stable, so stamps
/// sharing a vertex keep their input order.
pub fn order_markers<F>(distance: F, raw: RawTrailData) -> Result<FittedTrailData>
where
    F: Fn(&Point, &Point) -> f64,
{
    let RawTrailData { path, raw_markers } = raw;

    if path.is_empty() && !raw_markers.is_empty() {
        return Err(TrailError::EmptyPath {
            markers: raw_markers.len(),
        });
    }

    let mut markers: Vec<FittedMarker> = raw_markers
        .into_iter()
        .map(|marker| {
            let idx = nearest_point_idx(&distance, &path, &marker.position);
            marker.fit(idx)
        })
        .collect();
    markers.sort_by_key(|m| m.point_idx);

    debug!(
        "fitted {} stamps onto a path of {} points",
        markers.len(),
        path.len()
    );

    Ok(FittedTrailData { path, markers })
}

/// Index of the vertex closest to `position`. Ties go to the lowest index.
fn nearest_point_idx<F>(distance: &F, path: &Path, position: &Point) -> usize
where
    F: Fn(&Point, &Point) -> f64,
{
    let mut min_distance = f64::INFINITY;
    let mut nearest_idx = 0;

    for (idx, point) in path.points.iter().enumerate() {
        let d = distance(point, position);
        if d < min_distance {
            min_distance = d;
            nearest_idx = idx;
        }
    }

    nearest_idx
}

/// Annotate ordered stamps with the along-path distance to the next stamp.
///
/// `path_distance` receives the path and the vertex indices of two
/// neighbouring stamps. The last stamp gets `None`.
pub fn measure_markers<D>(path_distance: D, data: FittedTrailData) -> MeasuredTrailData
where
    D: Fn(&Path, usize, usize) -> f64,
{
    let FittedTrailData { path, markers } = data;

    let next_indices: Vec<Option<usize>> = markers
        .iter()
        .skip(1)
        .map(|m| Some(m.point_idx))
        .chain(std::iter::once(None))
        .collect();

    let markers: Vec<MeasuredMarker> = markers
        .into_iter()
        .zip(next_indices)
        .map(|(marker, next_idx)| {
            let distance_from_next =
                next_idx.map(|next| path_distance(&path, marker.point_idx, next));
            marker.measured(distance_from_next)
        })
        .collect();

    debug!("measured {} stamps", markers.len());

    MeasuredTrailData { path, markers }
}

/// [`order_markers`] followed by [`measure_markers`] using
/// [`distance_on_path`] over the same `distance` function.
pub fn order_and_measure_markers<F>(distance: F, raw: RawTrailData) -> Result<MeasuredTrailData>
where
    F: Fn(&Point, &Point) -> f64,
{
    let fitted = order_markers(&distance, raw)?;
    Ok(measure_markers(
        |path, idx1, idx2| distance_on_path(&distance, path, idx1, idx2),
        fitted,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::haversine_distance;

    fn lat_path(count: usize) -> Path {
        Path::new(
            (0..count)
                .map(|i| Point::new(i as f64, 0.0, 0.0))
                .collect(),
        )
    }

    fn at_lat(name: &str, lat: f64) -> RawMarker {
        RawMarker::new(name, "", Point::new(lat, 0.0, 0.0))
    }

    fn abs_lat(p1: &Point, p2: &Point) -> f64 {
        (p1.lat - p2.lat).abs()
    }

    fn sample_raw() -> RawTrailData {
        RawTrailData {
            path: lat_path(5),
            raw_markers: vec![at_lat("test1", 0.0), at_lat("test2", 3.1), at_lat("test3", 1.1)],
        }
    }

    #[test]
    fn test_order_markers() {
        let raw = sample_raw();
        let expected = FittedTrailData {
            path: raw.path.clone(),
            markers: vec![
                raw.raw_markers[0].clone().fit(0),
                raw.raw_markers[2].clone().fit(1),
                raw.raw_markers[1].clone().fit(3),
            ],
        };

        let result = order_markers(abs_lat, raw).unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn test_tie_resolves_to_lowest_index() {
        // 0.5 is equally far from vertex 0 and vertex 1
        let raw = RawTrailData {
            path: lat_path(3),
            raw_markers: vec![at_lat("mid", 0.5)],
        };
        let result = order_markers(abs_lat, raw).unwrap();
        assert_eq!(result.markers[0].point_idx, 0);
    }

    #[test]
    fn test_revisited_vertex_picks_first_occurrence() {
        // Out-and-back trail passing the same coordinates twice
        let path = Path::new(vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(2.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 0.0, 0.0),
        ]);
        let raw = RawTrailData {
            path,
            raw_markers: vec![at_lat("hut", 1.0)],
        };
        let result = order_markers(abs_lat, raw).unwrap();
        assert_eq!(result.markers[0].point_idx, 1);
    }

    #[test]
    fn test_sort_is_stable() {
        let raw = RawTrailData {
            path: lat_path(4),
            raw_markers: vec![
                at_lat("late", 3.0),
                at_lat("a", 1.1),
                at_lat("b", 0.9),
                at_lat("c", 1.0),
            ],
        };
        let result = order_markers(abs_lat, raw).unwrap();
        let names: Vec<&str> = result.markers.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "late"]);
        assert!(result
            .markers
            .windows(2)
            .all(|w| w[0].point_idx <= w[1].point_idx));
    }

    #[test]
    fn test_order_without_markers() {
        let result = order_markers(abs_lat, RawTrailData::default()).unwrap();
        assert!(result.markers.is_empty());
        assert!(result.path.is_empty());
    }

    #[test]
    fn test_order_markers_on_empty_path() {
        let raw = RawTrailData {
            path: Path::default(),
            raw_markers: vec![at_lat("lost", 1.0)],
        };
        let err = order_markers(abs_lat, raw).unwrap_err();
        assert!(matches!(err, TrailError::EmptyPath { markers: 1 }));
    }

    #[test]
    fn test_measure_markers() {
        let origin = Point::new(0.0, 0.0, 0.0);
        let fitted = FittedTrailData {
            path: Path::default(),
            markers: vec![
                RawMarker::new("test1", "", origin).fit(1),
                RawMarker::new("test2", "", origin).fit(3),
                RawMarker::new("test3", "", origin).fit(10),
            ],
        };

        let result = measure_markers(
            |_, idx1, idx2| idx1.abs_diff(idx2) as f64,
            fitted.clone(),
        );

        assert_eq!(result.path, fitted.path);
        assert_eq!(
            result.markers,
            vec![
                fitted.markers[0].clone().measured(Some(2.0)),
                fitted.markers[1].clone().measured(Some(7.0)),
                fitted.markers[2].clone().measured(None),
            ]
        );
    }

    #[test]
    fn test_measure_empty() {
        let fitted = FittedTrailData {
            path: lat_path(2),
            markers: Vec::new(),
        };
        let result = measure_markers(|_, _, _| panic!("no pairs to measure"), fitted);
        assert!(result.markers.is_empty());
    }

    #[test]
    fn test_measure_single_marker() {
        let fitted = FittedTrailData {
            path: lat_path(2),
            markers: vec![at_lat("only", 1.0).fit(1)],
        };
        let result = measure_markers(|_, _, _| panic!("no pairs to measure"), fitted);
        assert_eq!(result.markers.len(), 1);
        assert_eq!(result.markers[0].distance_from_next, None);
    }

    #[test]
    fn test_order_and_measure() {
        let raw = sample_raw();
        let expected = vec![
            raw.raw_markers[0].clone().fit(0).measured(Some(1.0)),
            raw.raw_markers[2].clone().fit(1).measured(Some(2.0)),
            raw.raw_markers[1].clone().fit(3).measured(None),
        ];

        let result = order_and_measure_markers(abs_lat, raw.clone()).unwrap();
        assert_eq!(result.path, raw.path);
        assert_eq!(result.markers, expected);
    }

    #[test]
    fn test_composition_matches_separate_stages() {
        let raw = RawTrailData {
            path: Path::new(vec![
                Point::new(46.55, 7.95, 1200.0),
                Point::new(46.56, 7.96, 1350.0),
                Point::new(46.57, 7.98, 1500.0),
                Point::new(46.58, 7.97, 1700.0),
            ]),
            raw_markers: vec![
                RawMarker::new("summit", "", Point::new(46.581, 7.971, 0.0)),
                RawMarker::new("start", "", Point::new(46.549, 7.951, 0.0)),
                RawMarker::new("spring", "", Point::new(46.566, 7.97, 0.0)),
            ],
        };

        let composed = order_and_measure_markers(haversine_distance, raw.clone()).unwrap();
        let manual = measure_markers(
            |path, a, b| distance_on_path(haversine_distance, path, a, b),
            order_markers(haversine_distance, raw).unwrap(),
        );
        assert_eq!(composed, manual);
    }
}
