use super::types::{
    decode, OrsCoordinates, OrsGeometryResponse, OrsHostedProperties, OrsLegacyProperties,
    OrsPropertiesResponse, OrsSelfHostedProperties, OrsSummary,
};
use crate::sdk::config::DeploymentVariant;
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::route::{PointSequence, RawResponse, RouteMetrics};
use crate::sdk::routing::service::{ResponseSchema, SummaryLookup};
use serde_json::Value;

/// OpenRouteService directions in GeoJSON format.
#[derive(Debug)]
pub struct OrsDirections {
    variant: DeploymentVariant,
}

impl OrsDirections {
    pub fn new(variant: DeploymentVariant) -> Self {
        Self { variant }
    }
}

impl ResponseSchema for OrsDirections {
    fn name(&self) -> &'static str {
        match self.variant {
            DeploymentVariant::HostedV2 => "ors directions (hosted v2)",
            DeploymentVariant::SelfHostedLegacy => "ors directions (self-hosted legacy)",
            DeploymentVariant::SelfHostedV2 => "ors directions (self-hosted v2)",
        }
    }

    fn extract_points(&self, id: &str, raw: &RawResponse) -> Result<PointSequence, RoutingError> {
        feature_points(id, raw)
    }

    fn summary_metrics(&self, body: &Value) -> Result<SummaryLookup, RoutingError> {
        let metrics = match self.variant {
            DeploymentVariant::HostedV2 => {
                let response: OrsPropertiesResponse<OrsHostedProperties> =
                    decode(body, "ors summary")?;
                let properties = &first_feature(&response)?.properties;
                let summary = properties.summary;
                RouteMetrics {
                    length_in_meters: required(summary.distance, "distance")?,
                    travel_time_in_seconds: required(summary.duration, "duration")?,
                    ascent: properties.ascent,
                    descent: properties.descent,
                }
            }
            DeploymentVariant::SelfHostedV2 => {
                let response: OrsPropertiesResponse<OrsSelfHostedProperties> =
                    decode(body, "ors summary")?;
                self_hosted_metrics(first_feature(&response)?.properties.summary)
            }
            DeploymentVariant::SelfHostedLegacy => {
                let response: OrsPropertiesResponse<OrsLegacyProperties> =
                    decode(body, "ors legacy summary")?;
                let summary = first_feature(&response)?
                    .properties
                    .summary
                    .first()
                    .copied()
                    .ok_or_else(|| {
                        RoutingError::Structural("ors legacy summary: empty summary array".to_string())
                    })?;
                self_hosted_metrics(summary)
            }
        };
        Ok(SummaryLookup::Found(metrics))
    }
}

/// OpenRouteService isochrones. Summary figures are not part of the payload,
/// so summary rows carry the id and the outline only.
#[derive(Debug)]
pub struct OrsIsochrones {
    variant: DeploymentVariant,
}

impl OrsIsochrones {
    pub fn new(variant: DeploymentVariant) -> Self {
        Self { variant }
    }
}

impl ResponseSchema for OrsIsochrones {
    fn name(&self) -> &'static str {
        "ors isochrones"
    }

    fn extract_points(&self, id: &str, raw: &RawResponse) -> Result<PointSequence, RoutingError> {
        if self.variant == DeploymentVariant::SelfHostedLegacy {
            log::warn!("\t{}: isochrone points are not read from legacy ors servers", id);
            return Ok(PointSequence::empty(id));
        }
        feature_points(id, raw)
    }
}

/// Reads `features[0].geometry.coordinates`. A polygon contributes its exterior ring.
fn feature_points(id: &str, raw: &RawResponse) -> Result<PointSequence, RoutingError> {
    let Some(body) = raw.body() else {
        return Ok(PointSequence::empty(id));
    };
    let response: OrsGeometryResponse = decode(body, "ors features")?;
    let Some(feature) = response.features.as_ref().and_then(|f| f.first()) else {
        log::debug!("\t{}: no features in ors response", id);
        return Ok(PointSequence::empty(id));
    };

    let positions: &[Vec<f64>] = match &feature.geometry.coordinates {
        OrsCoordinates::Line(line) => line,
        OrsCoordinates::Rings(rings) => {
            log::debug!(
                "\t{}: reading exterior ring of {} geometry",
                id,
                feature.geometry.kind.as_deref().unwrap_or("polygon")
            );
            rings.first().map(Vec::as_slice).unwrap_or_default()
        }
    };

    let mut coordinates = Vec::with_capacity(positions.len());
    for (i, position) in positions.iter().enumerate() {
        match position.as_slice() {
            [lon, lat] => coordinates.push((*lat, *lon, None)),
            [lon, lat, alt, ..] => coordinates.push((*lat, *lon, Some(*alt))),
            _ => {
                return Err(RoutingError::Structural(format!(
                    "ors features: coordinate {} has {} values",
                    i,
                    position.len()
                )))
            }
        }
    }

    let points = PointSequence::from_coordinates(id, coordinates);
    log::info!("\t{}: points count: {}", id, points.len());
    Ok(points)
}

fn first_feature<P>(
    response: &OrsPropertiesResponse<P>,
) -> Result<&super::types::OrsPropertiesFeature<P>, RoutingError> {
    response
        .features
        .first()
        .ok_or_else(|| RoutingError::Structural("ors summary: empty features".to_string()))
}

fn required(value: Option<f64>, field: &str) -> Result<f64, RoutingError> {
    value.ok_or_else(|| RoutingError::Structural(format!("ors summary: missing {}", field)))
}

// Self-hosted servers drop zero distance/duration from the summary
fn self_hosted_metrics(summary: OrsSummary) -> RouteMetrics {
    RouteMetrics {
        length_in_meters: summary.distance.unwrap_or(0.0),
        travel_time_in_seconds: summary.duration.unwrap_or(0.0),
        ascent: summary.ascent,
        descent: summary.descent,
    }
}
