use chrono::{Local, NaiveDateTime};
use serde_json::{json, Value};

use super::error::RoutingError;
use crate::sdk::config::{DeploymentVariant, Provider, RunConfig};
use crate::sdk::input::{InputRow, LatLon, RouteQuery};

const ORS_ACCEPT: &str =
    "application/json, application/geo+json, application/gpx+xml, img/png; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// A fully built provider call for one input row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<Value>,
}

impl ProviderRequest {
    fn get(url: String) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    fn post_ors(url: String, api_key: &str, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            headers: vec![("Accept", ORS_ACCEPT.to_string()), ("Authorization", api_key.to_string())],
            body: Some(body),
        }
    }

    /// Method and URL without the query string, safe to log.
    pub fn describe(&self) -> String {
        let endpoint = self.url.split('?').next().unwrap_or_default();
        format!("{} {}", self.method.as_str(), endpoint)
    }
}

/// TomTom plans departures at 02:00 the next day, outside traffic peaks.
pub fn next_departure(now: NaiveDateTime) -> NaiveDateTime {
    let tomorrow = now.date().succ_opt().unwrap_or(now.date());
    tomorrow.and_hms_opt(2, 0, 0).unwrap_or(now)
}

/// Turns input rows into provider requests for one run configuration.
#[derive(Debug)]
pub struct RequestFactory<'a> {
    config: &'a RunConfig,
    depart_at: NaiveDateTime,
}

impl<'a> RequestFactory<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            depart_at: next_departure(Local::now().naive_local()),
        }
    }

    pub fn with_departure(mut self, depart_at: NaiveDateTime) -> Self {
        self.depart_at = depart_at;
        self
    }

    pub fn build(&self, row: &InputRow) -> Result<ProviderRequest, RoutingError> {
        match (&row.query, self.config.provider) {
            (RouteQuery::Directions { start, end }, Provider::TomTom) => {
                Ok(self.tomtom_directions(*start, *end))
            }
            (RouteQuery::Directions { start, end }, Provider::OpenRouteService) => {
                Ok(self.ors_directions(&row.id, *start, *end))
            }
            (RouteQuery::Isochrone { center, ranges }, Provider::OpenRouteService) => {
                Ok(self.ors_isochrones(&row.id, *center, ranges))
            }
            (RouteQuery::Isochrone { .. }, Provider::TomTom) => Err(RoutingError::Unsupported(
                "isochrones are not available from tomtom".to_string(),
            )),
        }
    }

    fn tomtom_directions(&self, start: LatLon, end: LatLon) -> ProviderRequest {
        let config = self.config;
        ProviderRequest::get(format!(
            "{}/{},{}:{},{}/json?avoid=unpavedRoads&routeType={}&traffic=true&travelMode={}&key={}&departAt={}",
            config.base_url(),
            start.lat,
            start.lon,
            end.lat,
            end.lon,
            config.weighting.as_str(),
            config.travel_mode.tomtom_name(),
            config.api_key,
            self.depart_at.format("%Y-%m-%dT%H:%M:%S"),
        ))
    }

    fn ors_directions(&self, id: &str, start: LatLon, end: LatLon) -> ProviderRequest {
        let config = self.config;
        let profile = config.travel_mode.ors_profile();
        match config.variant {
            DeploymentVariant::SelfHostedLegacy => ProviderRequest::get(format!(
                "{}?coordinates={},{}|{},{}&profile={}&format=geojson&elevation=true&preference={}",
                config.base_url(),
                start.lon,
                start.lat,
                end.lon,
                end.lat,
                profile,
                config.weighting.as_str(),
            )),
            DeploymentVariant::HostedV2 | DeploymentVariant::SelfHostedV2 => {
                let body = json!({
                    "coordinates": [[start.lon, start.lat], [end.lon, end.lat]],
                    "elevation": "true",
                    "id": id,
                    "instructions": "false",
                    "maneuvers": "false",
                    "preference": config.weighting.as_str(),
                    "units": "m",
                });
                ProviderRequest::post_ors(
                    format!("{}/{}/geojson", config.base_url(), profile),
                    &config.api_key,
                    body,
                )
            }
        }
    }

    fn ors_isochrones(&self, id: &str, center: LatLon, ranges: &[f64]) -> ProviderRequest {
        let config = self.config;
        let profile = config.travel_mode.ors_profile();
        match config.variant {
            DeploymentVariant::SelfHostedLegacy => {
                let range = ranges.iter().map(f64::to_string).collect::<Vec<_>>().join(",");
                ProviderRequest::get(format!(
                    "{}?locations={},{}&profile={}&range={}&range_type={}&format=geojson&preference={}",
                    config.base_url(),
                    center.lon,
                    center.lat,
                    profile,
                    range,
                    config.range_type.as_str(),
                    config.weighting.as_str(),
                ))
            }
            DeploymentVariant::HostedV2 | DeploymentVariant::SelfHostedV2 => {
                let body = json!({
                    "locations": [[center.lon, center.lat]],
                    "range": ranges,
                    "id": id,
                    "range_type": config.range_type.as_str(),
                    "units": "m",
                });
                ProviderRequest::post_ors(
                    format!("{}/{}", config.base_url(), profile),
                    &config.api_key,
                    body,
                )
            }
        }
    }
}
