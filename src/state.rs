//! Application state and the domain records it is built from

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Title given to locations synthesized from a geolocation fix
pub const CURRENT_LOCATION_TITLE: &str = "Mín staðsetning";

/// A named point a forecast can be searched for
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    pub title: String,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub fn new(title: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            title: title.into(),
            lat,
            lng,
        }
    }

    /// Location for the device's own position
    pub fn current(lat: f64, lng: f64) -> Self {
        Self::new(CURRENT_LOCATION_TITLE, lat, lng)
    }
}

/// One timestamped forecast entry, in source order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ForecastPoint {
    pub time: String,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
}

/// What is currently mounted in the output region
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Error(String),
    Results {
        location: Location,
        points: Vec<ForecastPoint>,
    },
}

/// Locations offered when no list is configured
pub fn default_locations() -> Vec<Location> {
    vec![
        Location::new("Reykjavík", 64.1355, -21.8954),
        Location::new("Akureyri", 65.6835, -18.0878),
        Location::new("New York", 40.7128, -74.006),
        Location::new("Tokyo", 35.6764, 139.65),
        Location::new("Sydney", 33.8688, 151.2093),
    ]
}

/// Parse a JSON array of `{title, lat, lng}` records
pub fn locations_from_json(json: &str) -> Result<Vec<Location>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Terminal host state: which location button has focus
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppState {
    /// Index of the focused button, in document order
    pub focused: usize,
    /// Number of buttons on the page
    pub buttons: usize,
}

impl AppState {
    pub fn new(buttons: usize) -> Self {
        Self {
            focused: 0,
            buttons,
        }
    }
}
