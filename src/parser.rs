use log::warn;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::TrailError;
use crate::trail_types::*;

type Result<T> = std::result::Result<T, TrailError>;

/// Trail geometry and stamps loaded from a GPX document.
#[derive(Debug)]
pub struct GpxTrail {
    pub name: Option<String>,
    pub data: RawTrailData,
}

/// A wpt/trkpt/rtept with the children this crate cares about.
#[derive(Debug)]
struct GpxPoint {
    point: Point,
    name: Option<String>,
    desc: Option<String>,
    cmt: Option<String>,
}

impl GpxPoint {
    fn new(lat: f64, lon: f64) -> Self {
        Self {
            point: Point::new(lat, lon, 0.0),
            name: None,
            desc: None,
            cmt: None,
        }
    }

    fn into_marker(self) -> RawMarker {
        let description = self.desc.or(self.cmt).unwrap_or_default();
        RawMarker::new(self.name.unwrap_or_default(), description, self.point)
    }
}

#[derive(Default)]
struct Collected {
    metadata_name: Option<String>,
    track_name: Option<String>,
    route_name: Option<String>,
    track_points: Vec<Point>,
    route_points: Vec<Point>,
    markers: Vec<RawMarker>,
}

/// Parse a GPX XML string into a trail path and its stamps.
///
/// Track points of all tracks and segments form the path, in document order.
/// Route points are used only when the document has no track points.
/// Every waypoint becomes a stamp.
pub fn parse_gpx(xml: &str) -> Result<GpxTrail> {
    let mut reader = Reader::from_str(xml);
    let mut collected = Collected::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"metadata" => collected.metadata_name = parse_metadata(&mut reader)?,
                // GPX 1.0 keeps the document name at the top level
                b"name" => collected.metadata_name = Some(read_text_owned(&mut reader, &e)?),
                b"wpt" => {
                    if let Some(pt) = parse_point(&e, &mut reader)? {
                        collected.markers.push(pt.into_marker());
                    }
                }
                b"rte" => {
                    let name = parse_route(&mut reader, &mut collected.route_points)?;
                    if collected.route_name.is_none() {
                        collected.route_name = name;
                    }
                }
                b"trk" => {
                    let name = parse_track(&mut reader, &mut collected.track_points)?;
                    if collected.track_name.is_none() {
                        collected.track_name = name;
                    }
                }
                b"gpx" => {}
                _ => {
                    // extensions and vendor elements
                    reader
                        .read_to_end(e.name())
                        .map_err(TrailError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"wpt" {
                    if let Some(pt) = empty_point(&e) {
                        collected.markers.push(pt.into_marker());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(TrailError::XmlParse(e)),
            _ => {}
        }
    }

    let Collected {
        metadata_name,
        track_name,
        route_name,
        track_points,
        route_points,
        markers,
    } = collected;

    let points = if track_points.is_empty() {
        route_points
    } else {
        track_points
    };

    Ok(GpxTrail {
        name: metadata_name.or(track_name).or(route_name),
        data: RawTrailData {
            path: Path::new(points),
            raw_markers: markers,
        },
    })
}

/// Parse lat/lon attributes from a point element's start tag.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<(f64, f64)> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| TrailError::XmlParse(e.into()))?;
        let key = attr.key.local_name();
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        match key.as_ref() {
            b"lat" => {
                lat = Some(val.trim().parse::<f64>().map_err(|_| {
                    TrailError::InvalidAttribute {
                        element: "point",
                        attribute: "lat",
                        value: val.to_string(),
                    }
                })?);
            }
            b"lon" => {
                lon = Some(val.trim().parse::<f64>().map_err(|_| {
                    TrailError::InvalidAttribute {
                        element: "point",
                        attribute: "lon",
                        value: val.to_string(),
                    }
                })?);
            }
            _ => {}
        }
    }

    let lat = lat.ok_or(TrailError::MissingAttribute {
        element: "point",
        attribute: "lat",
    })?;
    let lon = lon.ok_or(TrailError::MissingAttribute {
        element: "point",
        attribute: "lon",
    })?;

    Ok((lat, lon))
}

/// A self-closing point element, or `None` if its coordinates are unusable.
fn empty_point(e: &BytesStart<'_>) -> Option<GpxPoint> {
    match parse_lat_lon(e) {
        Ok((lat, lon)) => Some(GpxPoint::new(lat, lon)),
        Err(err) => {
            warn!("skipping GPX point: {err}");
            None
        }
    }
}

/// Parse a point element (wpt, rtept, trkpt) and its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
) -> Result<Option<GpxPoint>> {
    let (lat, lon) = match parse_lat_lon(start) {
        Ok(coords) => coords,
        Err(err) => {
            warn!("skipping GPX point: {err}");
            reader
                .read_to_end(start.name())
                .map_err(TrailError::XmlParse)?;
            return Ok(None);
        }
    };

    let mut pt = GpxPoint::new(lat, lon);
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => {
                    let text = read_text_owned(reader, &e)?;
                    if let Ok(ele) = text.trim().parse::<f64>() {
                        pt.point.elevation = ele;
                    }
                }
                b"name" => pt.name = Some(read_text_owned(reader, &e)?),
                b"desc" => pt.desc = Some(read_text_owned(reader, &e)?),
                b"cmt" => pt.cmt = Some(read_text_owned(reader, &e)?),
                _ => {
                    // time, sym, link, extensions, ...
                    reader
                        .read_to_end(e.name())
                        .map_err(TrailError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TrailError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(Some(pt))
}

/// Parse a <metadata> element, returning its <name>.
fn parse_metadata<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Option<String>> {
    let mut name = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => name = Some(read_text_owned(reader, &e)?),
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(TrailError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"metadata" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TrailError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(name)
}

/// Parse a <rte> element, appending its points. Returns the route name.
fn parse_route<'a>(
    reader: &mut Reader<&'a [u8]>,
    points: &mut Vec<Point>,
) -> Result<Option<String>> {
    let mut name = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => name = Some(read_text_owned(reader, &e)?),
                b"rtept" => {
                    if let Some(pt) = parse_point(&e, reader)? {
                        points.push(pt.point);
                    }
                }
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(TrailError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"rtept" {
                    if let Some(pt) = empty_point(&e) {
                        points.push(pt.point);
                    }
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"rte" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TrailError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(name)
}

/// Parse a <trk> element, appending the points of all its segments.
/// Returns the track name.
fn parse_track<'a>(
    reader: &mut Reader<&'a [u8]>,
    points: &mut Vec<Point>,
) -> Result<Option<String>> {
    let mut name = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => name = Some(read_text_owned(reader, &e)?),
                b"trkseg" => parse_segment(reader, points)?,
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(TrailError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TrailError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(name)
}

/// Parse a <trkseg> element.
fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>, points: &mut Vec<Point>) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    if let Some(pt) = parse_point(&e, reader)? {
                        points.push(pt.point);
                    }
                }
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(TrailError::XmlParse)?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    if let Some(pt) = empty_point(&e) {
                        points.push(pt.point);
                    }
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TrailError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(())
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, and entity references (Event::GeneralRef).
fn read_text_owned<'a>(
    reader: &mut Reader<&'a [u8]>,
    start: &BytesStart<'_>,
) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let raw = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                text.push_str(raw);
            }
            Ok(Event::CData(e)) => {
                let s = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                text.push_str(s);
            }
            Ok(Event::GeneralRef(e)) => {
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    let name = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                    match name {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(TrailError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(text)
}
