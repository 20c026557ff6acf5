use hiking_trail_wasm::distance::haversine_distance;
use hiking_trail_wasm::markers::{measure_markers, order_markers};
use hiking_trail_wasm::parser::parse_gpx;
use hiking_trail_wasm::sections::build_hiking_trail;
use std::path::Path;

fn load_fixture(path: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{path}")).unwrap()
}

/// Run the pipeline, counting path vertices between stamps instead of metres
/// so the snapshot holds exact values.
fn trail_by_vertex_count(gpx: &str, distance_threshold: f64) -> serde_json::Value {
    let parsed = parse_gpx(gpx).unwrap();
    let name = parsed.name.unwrap_or_default();
    let fitted = order_markers(haversine_distance, parsed.data).unwrap();
    let measured = measure_markers(|_, a, b| a.abs_diff(b) as f64, fitted);
    let trail = build_hiking_trail(name, measured, distance_threshold);
    serde_json::to_value(&trail).unwrap()
}

/// Compare actual output against the expected snapshot file.
/// When `UPDATE_SNAPSHOTS=1` is set, write/overwrite the expected file instead.
fn assert_snapshot(actual: &serde_json::Value, expected_path: &str) {
    let path = format!("tests/fixtures/expected/{expected_path}");

    if matches!(std::env::var("UPDATE_SNAPSHOTS").as_deref(), Ok("1")) {
        let dir = Path::new(&path).parent().unwrap();
        std::fs::create_dir_all(dir).unwrap();
        let pretty = serde_json::to_string_pretty(actual).unwrap();
        std::fs::write(&path, pretty.as_bytes()).unwrap();
        eprintln!("Updated snapshot: {path}");
        return;
    }

    let expected_str = std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Expected file not found: {path}. Run with UPDATE_SNAPSHOTS=1 to generate."));
    let expected: serde_json::Value = serde_json::from_str(&expected_str)
        .unwrap_or_else(|e| panic!("Failed to parse {path}: {e}"));

    assert_eq!(
        *actual, expected,
        "Snapshot mismatch for {path}.\nRun with UPDATE_SNAPSHOTS=1 to update."
    );
}

// ---- trails/ ----

#[test]
fn snapshot_01_stamp_trail() {
    let actual = trail_by_vertex_count(&load_fixture("trails/01_stamp_trail.gpx"), 2.0);
    assert_snapshot(&actual, "trails/01_stamp_trail.json");
}
