use serde::Deserialize;
use serde_json::Value;

use crate::sdk::routing::error::RoutingError;

// --- Wire views of provider payloads ---
//
// Each view only names the fields one extraction step needs, so a malformed
// summary never prevents reading the points and vice versa.

/// Deserializes a top-level payload object, reporting failures as structural errors.
///
/// Derived struct views would also accept arrays by field position, so
/// anything but an object is rejected up front.
pub fn decode<'a, T: Deserialize<'a>>(value: &'a Value, what: &str) -> Result<T, RoutingError> {
    if !value.is_object() {
        return Err(RoutingError::Structural(format!("{}: payload is not an object", what)));
    }
    T::deserialize(value).map_err(|e| RoutingError::Structural(format!("{}: {}", what, e)))
}

// TomTom calculateRoute

#[derive(Deserialize)]
pub struct TomTomLegsResponse {
    pub routes: Option<Vec<TomTomRouteLegs>>,
}
#[derive(Deserialize)]
pub struct TomTomRouteLegs {
    pub legs: Vec<TomTomLeg>,
}
#[derive(Deserialize)]
pub struct TomTomLeg {
    pub points: Vec<TomTomPoint>,
}
#[derive(Deserialize, Clone, Copy)]
pub struct TomTomPoint {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
pub struct TomTomSummaryResponse {
    pub routes: Vec<TomTomRouteSummary>,
}
#[derive(Deserialize)]
pub struct TomTomRouteSummary {
    pub summary: TomTomSummary,
}
#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct TomTomSummary {
    pub length_in_meters: f64,
    pub travel_time_in_seconds: f64,
}

// OpenRouteService GeoJSON

#[derive(Deserialize)]
pub struct OrsGeometryResponse {
    pub features: Option<Vec<OrsGeometryFeature>>,
}
#[derive(Deserialize)]
pub struct OrsGeometryFeature {
    pub geometry: OrsGeometry,
}
#[derive(Deserialize)]
pub struct OrsGeometry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub coordinates: OrsCoordinates,
}

/// `[lon, lat(, alt)]` positions of a line, or the rings of a polygon.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum OrsCoordinates {
    Line(Vec<Vec<f64>>),
    Rings(Vec<Vec<Vec<f64>>>),
}

#[derive(Deserialize)]
pub struct OrsPropertiesResponse<P> {
    pub features: Vec<OrsPropertiesFeature<P>>,
}
#[derive(Deserialize)]
pub struct OrsPropertiesFeature<P> {
    pub properties: P,
}

/// `api.openrouteservice.org`: elevation totals sit beside the summary.
#[derive(Deserialize)]
pub struct OrsHostedProperties {
    pub summary: OrsSummary,
    pub ascent: Option<f64>,
    pub descent: Option<f64>,
}

/// Self-hosted v2 servers nest everything in the summary object.
#[derive(Deserialize)]
pub struct OrsSelfHostedProperties {
    pub summary: OrsSummary,
}

/// Legacy self-hosted servers wrap the summary in a one-element array.
#[derive(Deserialize)]
pub struct OrsLegacyProperties {
    pub summary: Vec<OrsSummary>,
}

#[derive(Deserialize, Clone, Copy, Default)]
pub struct OrsSummary {
    pub distance: Option<f64>,
    pub duration: Option<f64>,
    pub ascent: Option<f64>,
    pub descent: Option<f64>,
}
