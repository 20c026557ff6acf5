use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::distance::{distance_on_path, haversine_distance};
use crate::options::TrailOptions;
use crate::trail_types::*;

/// Convert a hiking trail to a GeoJSON FeatureCollection.
///
/// The trail LineString comes first (unless disabled), followed by one Point
/// per stamp in trail order.
pub fn to_feature_collection(trail: &HikingTrail, opts: &TrailOptions) -> FeatureCollection {
    let mut features = Vec::new();

    if opts.include_path && trail.path.len() >= 2 {
        features.push(path_to_feature(trail, opts));
    }

    for (section_idx, section) in trail.section_endpoints.iter().enumerate() {
        for marker in &section.markers {
            features.push(marker_to_feature(marker, section_idx, opts));
        }
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn path_to_feature(trail: &HikingTrail, opts: &TrailOptions) -> Feature {
    let coords: Vec<Vec<f64>> = trail
        .path
        .points
        .iter()
        .map(|pt| point_coords(pt, opts.include_elevation))
        .collect();

    let geometry = Geometry::new(Value::LineString(coords));

    let mut props = Map::new();
    props.insert(
        "featureType".to_string(),
        JsonValue::String("trail".to_string()),
    );
    props.insert("name".to_string(), JsonValue::String(trail.name.clone()));
    props.insert(
        "pointCount".to_string(),
        JsonValue::Number(trail.path.len().into()),
    );
    let length = distance_on_path(haversine_distance, &trail.path, 0, trail.path.len() - 1);
    props.insert("length".to_string(), number(length));

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

fn marker_to_feature(marker: &MeasuredMarker, section_idx: usize, opts: &TrailOptions) -> Feature {
    let coords = point_coords(&marker.position, opts.include_elevation);
    let geometry = Geometry::new(Value::Point(coords));

    let mut props = Map::new();
    props.insert(
        "featureType".to_string(),
        JsonValue::String("stamp".to_string()),
    );
    props.insert("name".to_string(), JsonValue::String(marker.name.clone()));
    if opts.include_description && !marker.description.is_empty() {
        props.insert(
            "description".to_string(),
            JsonValue::String(marker.description.clone()),
        );
    }
    props.insert(
        "sectionIndex".to_string(),
        JsonValue::Number(section_idx.into()),
    );
    props.insert(
        "pointIdx".to_string(),
        JsonValue::Number(marker.point_idx.into()),
    );
    let distance = match marker.distance_from_next {
        Some(d) => number(d),
        None => JsonValue::Null,
    };
    props.insert("distanceFromNext".to_string(), distance);

    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// Build [lon, lat] or [lon, lat, ele] coordinate array.
fn point_coords(pt: &Point, include_elevation: bool) -> Vec<f64> {
    if include_elevation {
        vec![pt.lon, pt.lat, pt.elevation]
    } else {
        vec![pt.lon, pt.lat]
    }
}

fn number(value: f64) -> JsonValue {
    serde_json::Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}
