use serde::{Deserialize, Serialize};

/// Route state carried by a bikerouter.de share link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteData {
    /// Map overlays in rendering order. Duplicates are kept.
    pub layers: Vec<String>,
    /// Travel-ordered route points.
    pub waypoints: Vec<Waypoint>,
    /// Routing engine profile, empty when the link carries none.
    pub profile: String,
    pub pois: Vec<Poi>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lon: f64,
    pub lat: f64,
}

impl Waypoint {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub lon: f64,
    pub lat: f64,
    pub description: String,
}

impl Poi {
    pub fn new(lon: f64, lat: f64, description: impl Into<String>) -> Self {
        Self {
            lon,
            lat,
            description: description.into(),
        }
    }
}
