use serde::Deserialize;

/// Options for turning a GPX document into a hiking trail.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrailOptions {
    /// Stamps with the same name closer than this along the path, in metres,
    /// form one section endpoint (default: 500)
    #[serde(default = "default_distance_threshold")]
    pub distance_threshold: f64,

    /// Trail name, overriding the one found in the GPX (default: none)
    #[serde(default)]
    pub name: Option<String>,

    /// Include elevation as the 3rd coordinate value (default: true)
    #[serde(default = "default_true")]
    pub include_elevation: bool,

    /// Emit the trail itself as a LineString feature (default: true)
    #[serde(default = "default_true")]
    pub include_path: bool,

    /// Include stamp descriptions in properties (default: true)
    #[serde(default = "default_true")]
    pub include_description: bool,
}

impl Default for TrailOptions {
    fn default() -> Self {
        Self {
            distance_threshold: default_distance_threshold(),
            name: None,
            include_elevation: true,
            include_path: true,
            include_description: true,
        }
    }
}

impl TrailOptions {
    /// Pick the trail name: explicit option first, then the GPX name.
    pub fn resolve_name(&self, gpx_name: Option<&str>) -> String {
        self.name
            .as_deref()
            .or(gpx_name)
            .unwrap_or_default()
            .to_string()
    }
}

fn default_distance_threshold() -> f64 {
    500.0
}

fn default_true() -> bool {
    true
}
