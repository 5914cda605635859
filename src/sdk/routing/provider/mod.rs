//! Response normalization: maps each provider payload layout onto
//! [`PointSequence`] and [`RouteSummary`].

pub mod ors;
pub mod tomtom;
pub mod types;
pub mod unsupported;

pub use ors::{OrsDirections, OrsIsochrones};
pub use tomtom::TomTomRoutes;
pub use unsupported::Unsupported;

use super::error::RoutingError;
use super::route::{PointSequence, RawResponse, RouteSummary};
use super::service::ResponseSchema;
use crate::sdk::config::{DeploymentVariant, Provider, RequestMode};

/// Picks the normalization strategy once per run.
pub fn resolve_schema(
    provider: Provider,
    variant: DeploymentVariant,
    mode: RequestMode,
) -> Box<dyn ResponseSchema> {
    match (provider, mode) {
        (Provider::TomTom, RequestMode::Directions) => Box::new(TomTomRoutes),
        (Provider::OpenRouteService, RequestMode::Directions) => Box::new(OrsDirections::new(variant)),
        (Provider::OpenRouteService, RequestMode::Isochrone) => Box::new(OrsIsochrones::new(variant)),
        (provider, mode) => Box::new(Unsupported::new(provider, mode)),
    }
}

pub fn extract_points(
    provider: Provider,
    variant: DeploymentVariant,
    mode: RequestMode,
    id: &str,
    raw: &RawResponse,
) -> Result<PointSequence, RoutingError> {
    resolve_schema(provider, variant, mode).extract_points(id, raw)
}

pub fn extract_summary(
    provider: Provider,
    variant: DeploymentVariant,
    mode: RequestMode,
    id: &str,
    raw: &RawResponse,
    want_geometry: bool,
) -> Result<Option<RouteSummary>, RoutingError> {
    resolve_schema(provider, variant, mode).extract_summary(id, raw, want_geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VARIANTS: [DeploymentVariant; 3] = [
        DeploymentVariant::HostedV2,
        DeploymentVariant::SelfHostedLegacy,
        DeploymentVariant::SelfHostedV2,
    ];

    #[test]
    fn test_dispatch_names() {
        let v = DeploymentVariant::HostedV2;
        assert_eq!(
            resolve_schema(Provider::TomTom, v, RequestMode::Directions).name(),
            "tomtom directions"
        );
        assert_eq!(
            resolve_schema(Provider::OpenRouteService, v, RequestMode::Isochrone).name(),
            "ors isochrones"
        );
        assert_eq!(
            resolve_schema(Provider::TomTom, v, RequestMode::Isochrone).name(),
            "unsupported"
        );
    }

    #[test]
    fn test_no_points_means_no_summary_for_every_schema() {
        let payloads = [
            RawResponse::absent(),
            RawResponse::from_json(Some(200), json!({})),
            RawResponse::from_json(Some(200), json!({"routes": [], "features": []})),
        ];
        for provider in [Provider::TomTom, Provider::OpenRouteService] {
            for mode in [RequestMode::Directions, RequestMode::Isochrone] {
                for variant in VARIANTS {
                    for raw in &payloads {
                        let summary =
                            extract_summary(provider, variant, mode, "x", raw, true).unwrap();
                        assert!(summary.is_none(), "{provider:?} {variant:?} {mode:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_tomtom_ignores_deployment_variant() {
        let raw = RawResponse::from_json(
            Some(200),
            json!({"routes":[{"legs":[{"points":[{"latitude":1.0,"longitude":2.0}]}]}]}),
        );
        for variant in VARIANTS {
            let points =
                extract_points(Provider::TomTom, variant, RequestMode::Directions, "t", &raw).unwrap();
            assert_eq!(points.len(), 1);
        }
    }

    #[test]
    fn test_single_point_summary_has_no_geometry() {
        let raw = RawResponse::from_json(
            Some(200),
            json!({"routes":[{"summary":{"lengthInMeters":0,"travelTimeInSeconds":0},
                "legs":[{"points":[{"latitude":1.0,"longitude":2.0}]}]}]}),
        );
        let summary = extract_summary(
            Provider::TomTom,
            DeploymentVariant::HostedV2,
            RequestMode::Directions,
            "t",
            &raw,
            true,
        )
        .unwrap()
        .unwrap();
        assert!(summary.geometry.is_none());
        assert_eq!(summary.metrics.unwrap().length_in_meters, 0.0);
    }

    #[test]
    fn test_unsupported_payload_is_never_read() {
        let raw = RawResponse::from_json(Some(200), json!({"features": [{"geometry": {"coordinates": [[1.0, 2.0]]}}]}));
        let points = extract_points(
            Provider::TomTom,
            DeploymentVariant::HostedV2,
            RequestMode::Isochrone,
            "u",
            &raw,
        )
        .unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn test_array_payload_is_structural() {
        let payloads = [
            json!([]),
            json!([null]),
            json!([[]]),
            json!([[{"legs":[{"points":[{"latitude":1.0,"longitude":2.0}]}]}]]),
        ];
        for provider in [Provider::TomTom, Provider::OpenRouteService] {
            for payload in &payloads {
                let raw = RawResponse::from_json(Some(200), payload.clone());
                let err = extract_points(
                    provider,
                    DeploymentVariant::HostedV2,
                    RequestMode::Directions,
                    "a",
                    &raw,
                )
                .unwrap_err();
                assert!(matches!(err, RoutingError::Structural(_)), "{provider:?} {payload}");
            }
        }
    }
}
