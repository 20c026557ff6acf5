use log::debug;

use crate::trail_types::*;

/// Merge neighbouring same-named stamps into section endpoints.
///
/// A stamp joins the open group only when it has the group's name and the
/// group's last member has a `distance_from_next` below `distance_threshold`.
/// The decision reads the distance stored on that last member rather than
/// measuring between the two stamps, and a missing distance never merges.
pub fn group_section_endpoints<I>(markers: I, distance_threshold: f64) -> Vec<SectionEndpoint>
where
    I: IntoIterator<Item = MeasuredMarker>,
{
    let mut result: Vec<SectionEndpoint> = Vec::new();

    for marker in markers {
        if let Some(open) = result.last_mut() {
            if continues_section(open, &marker, distance_threshold) {
                open.markers.push(marker);
                continue;
            }
        }
        result.push(SectionEndpoint {
            name: marker.name.clone(),
            markers: vec![marker],
        });
    }

    debug!(
        "grouped stamps into {} section endpoints (threshold {distance_threshold})",
        result.len()
    );

    result
}

fn continues_section(open: &SectionEndpoint, marker: &MeasuredMarker, distance_threshold: f64) -> bool {
    let close_enough = open
        .markers
        .last()
        .and_then(|last| last.distance_from_next)
        .is_some_and(|d| d < distance_threshold);

    close_enough && open.name == marker.name
}

/// Group the measured stamps and package them with the path as a trail.
pub fn build_hiking_trail(
    name: impl Into<String>,
    data: MeasuredTrailData,
    distance_threshold: f64,
) -> HikingTrail {
    let MeasuredTrailData { path, markers } = data;

    HikingTrail {
        name: name.into(),
        path,
        section_endpoints: group_section_endpoints(markers, distance_threshold),
    }
}
