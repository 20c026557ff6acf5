pub mod converter;
pub mod distance;
pub mod error;
pub mod markers;
pub mod options;
pub mod parser;
pub mod sections;
pub mod trail_types;

use std::cell::RefCell;

use js_sys::Function;
use log::debug;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::distance::haversine_distance;
use crate::error::TrailError;
use crate::options::TrailOptions;
use crate::trail_types::{HikingTrail, MeasuredMarker, Point, RawTrailData};

/// Parse a GPX document and run the full stamp pipeline on it, measuring
/// with the haversine distance.
pub fn hiking_trail_from_gpx(gpx: &str, opts: &TrailOptions) -> Result<HikingTrail, TrailError> {
    let parsed = parser::parse_gpx(gpx)?;
    if parsed.data.path.is_empty() {
        return Err(TrailError::NoTrackPoints);
    }

    let name = opts.resolve_name(parsed.name.as_deref());
    debug!(
        "building trail '{name}' from {} points and {} stamps",
        parsed.data.path.len(),
        parsed.data.raw_markers.len()
    );

    let measured = markers::order_and_measure_markers(haversine_distance, parsed.data)?;
    Ok(sections::build_hiking_trail(name, measured, opts.distance_threshold))
}

/// Convert a GPX string to a hiking trail GeoJSON, returned as a JS object.
#[wasm_bindgen(js_name = hikingTrailFromGpx)]
pub fn hiking_trail_from_gpx_js(gpx_string: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let trail = hiking_trail_from_gpx(gpx_string, &opts)?;
    let fc = converter::to_feature_collection(&trail, &opts);
    to_js(&fc)
}

/// Convert a GPX string to a hiking trail GeoJSON, returned as a JSON string.
#[wasm_bindgen(js_name = hikingTrailFromGpxString)]
pub fn hiking_trail_from_gpx_string(gpx_string: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let opts = parse_options(options)?;
    let trail = hiking_trail_from_gpx(gpx_string, &opts)?;
    let fc = converter::to_feature_collection(&trail, &opts);
    serde_json::to_string(&fc).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Snap, order and measure `{ path, rawStampData }`.
///
/// `distance_fn` is an optional `(p1, p2) => number`; haversine metres
/// are used when it is absent.
#[wasm_bindgen(js_name = orderAndMeasureStamps)]
pub fn order_and_measure_stamps(
    raw_data: JsValue,
    distance_fn: Option<Function>,
) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let raw: RawTrailData =
        serde_wasm_bindgen::from_value(raw_data).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let measured = match distance_fn {
        None => markers::order_and_measure_markers(haversine_distance, raw)?,
        Some(callback) => {
            let failure: RefCell<Option<JsValue>> = RefCell::new(None);
            let distance = |p1: &Point, p2: &Point| js_distance(&callback, p1, p2, &failure);
            let measured = markers::order_and_measure_markers(distance, raw)?;
            if let Some(err) = failure.into_inner() {
                return Err(err);
            }
            measured
        }
    };

    to_js(&measured)
}

/// Group measured stamps into section endpoints.
#[wasm_bindgen(js_name = groupSectionEndpoints)]
pub fn group_section_endpoints_js(stamps: JsValue, distance_threshold: f64) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let stamps: Vec<MeasuredMarker> =
        serde_wasm_bindgen::from_value(stamps).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let sections = sections::group_section_endpoints(stamps, distance_threshold);
    to_js(&sections)
}

fn parse_options(options: JsValue) -> Result<TrailOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(TrailOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Serialize as plain JS objects, with `None` as `null`.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Call a JS distance callback. The first failure is kept in `failure` and
/// later calls return NaN without invoking the callback again.
fn js_distance(
    callback: &Function,
    p1: &Point,
    p2: &Point,
    failure: &RefCell<Option<JsValue>>,
) -> f64 {
    if failure.borrow().is_some() {
        return f64::NAN;
    }

    let result = to_js(p1)
        .and_then(|a| to_js(p2).map(|b| (a, b)))
        .and_then(|(a, b)| callback.call2(&JsValue::NULL, &a, &b));

    match result.map(|value| value.as_f64()) {
        Ok(Some(d)) => d,
        Ok(None) => {
            *failure.borrow_mut() = Some(JsValue::from_str(
                "distance function must return a number",
            ));
            f64::NAN
        }
        Err(err) => {
            *failure.borrow_mut() = Some(err);
            f64::NAN
        }
    }
}
