use serde::{Deserialize, Serialize};

/// A geographic point on the trail or a stamp position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub elevation: f64,
}

impl Point {
    pub fn new(lat: f64, lon: f64, elevation: f64) -> Self {
        Self {
            lat,
            lon,
            elevation,
        }
    }
}

/// The trail polyline. Point order is the walking direction.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<Point>,
}

impl Path {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A stamp as delivered by the loader, not yet located on the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMarker {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub position: Point,
}

impl RawMarker {
    pub fn new(name: impl Into<String>, description: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            position,
        }
    }

    /// Attach the index of the nearest path vertex.
    pub fn fit(self, point_idx: usize) -> FittedMarker {
        FittedMarker {
            name: self.name,
            description: self.description,
            position: self.position,
            point_idx,
        }
    }
}

/// A stamp snapped to its nearest path vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FittedMarker {
    pub name: String,
    pub description: String,
    pub position: Point,
    pub point_idx: usize,
}

impl FittedMarker {
    pub fn measured(self, distance_from_next: Option<f64>) -> MeasuredMarker {
        MeasuredMarker {
            name: self.name,
            description: self.description,
            position: self.position,
            point_idx: self.point_idx,
            distance_from_next,
        }
    }
}

/// A snapped stamp with the along-path distance to the following stamp.
///
/// `distance_from_next` is `None` for the last stamp of a trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasuredMarker {
    pub name: String,
    pub description: String,
    pub position: Point,
    pub point_idx: usize,
    pub distance_from_next: Option<f64>,
}

/// Consecutive same-named stamps treated as one place on the trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionEndpoint {
    pub name: String,
    #[serde(rename = "stamps")]
    pub markers: Vec<MeasuredMarker>,
}

/// The assembled trail: geometry plus its grouped stamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HikingTrail {
    pub name: String,
    pub path: Path,
    pub section_endpoints: Vec<SectionEndpoint>,
}

/// Loader output: the path and stamps in arbitrary order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTrailData {
    pub path: Path,
    #[serde(rename = "rawStampData")]
    pub raw_markers: Vec<RawMarker>,
}

/// Stamps snapped to the path and sorted in trail order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedTrailData {
    pub path: Path,
    #[serde(rename = "stampsOnPath")]
    pub markers: Vec<FittedMarker>,
}

/// Stamps in trail order with their distances to the next stamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredTrailData {
    pub path: Path,
    #[serde(rename = "stamps")]
    pub markers: Vec<MeasuredMarker>,
}
