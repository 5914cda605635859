use super::types::{decode, TomTomLegsResponse, TomTomSummaryResponse};
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::route::{PointSequence, RawResponse, RouteMetrics};
use crate::sdk::routing::service::{ResponseSchema, SummaryLookup};
use serde_json::Value;

/// TomTom `calculateRoute` JSON: `routes[0].legs[*].points[*]`.
#[derive(Debug, Default)]
pub struct TomTomRoutes;

impl ResponseSchema for TomTomRoutes {
    fn name(&self) -> &'static str {
        "tomtom directions"
    }

    fn extract_points(&self, id: &str, raw: &RawResponse) -> Result<PointSequence, RoutingError> {
        let Some(body) = raw.body() else {
            return Ok(PointSequence::empty(id));
        };
        let response: TomTomLegsResponse = decode(body, "tomtom routes")?;
        let Some(route) = response.routes.as_ref().and_then(|routes| routes.first()) else {
            log::debug!("\t{}: no routes in tomtom response", id);
            return Ok(PointSequence::empty(id));
        };

        // Legs are concatenated, numbering continues across leg boundaries
        let points = PointSequence::from_coordinates(
            id,
            route
                .legs
                .iter()
                .flat_map(|leg| leg.points.iter())
                .map(|p| (p.latitude, p.longitude, None)),
        );
        log::info!("\t{}: points count: {}", id, points.len());
        Ok(points)
    }

    fn summary_metrics(&self, body: &Value) -> Result<SummaryLookup, RoutingError> {
        let response: TomTomSummaryResponse = decode(body, "tomtom summary")?;
        let summary = response
            .routes
            .first()
            .ok_or_else(|| RoutingError::Structural("tomtom summary: empty routes".to_string()))?
            .summary;
        Ok(SummaryLookup::Found(RouteMetrics {
            length_in_meters: summary.length_in_meters,
            travel_time_in_seconds: summary.travel_time_in_seconds,
            ascent: None,
            descent: None,
        }))
    }
}
