use super::error::RoutingError;
use super::route::{PointSequence, RawResponse, RouteMetrics, RouteSummary};
use serde_json::Value;

/// Outcome of looking up distance/duration figures in a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryLookup {
    Found(RouteMetrics),
    /// The schema has no summary location for this provider/mode.
    Unrecognized,
}

/// Normalization strategy for one provider, deployment variant and request mode.
pub trait ResponseSchema: Send + Sync {
    /// Short label used in log lines.
    fn name(&self) -> &'static str;

    /// Reads the ordered points of a payload. Missing top-level keys give an
    /// empty sequence; a payload of the wrong shape is a `Structural` error.
    fn extract_points(&self, id: &str, raw: &RawResponse) -> Result<PointSequence, RoutingError>;

    /// Reads the scalar summary figures of a non-empty payload.
    fn summary_metrics(&self, _body: &Value) -> Result<SummaryLookup, RoutingError> {
        Ok(SummaryLookup::Unrecognized)
    }

    /// Builds the summary row of a payload, `None` when it holds no points.
    fn extract_summary(
        &self,
        id: &str,
        raw: &RawResponse,
        want_geometry: bool,
    ) -> Result<Option<RouteSummary>, RoutingError> {
        let points = self.extract_points(id, raw)?;
        if points.is_empty() {
            return Ok(None);
        }

        let geometry = if want_geometry {
            points.line_string()
        } else {
            None
        };

        let lookup = match raw.body() {
            Some(body) => self.summary_metrics(body)?,
            None => SummaryLookup::Unrecognized,
        };
        let metrics = match lookup {
            SummaryLookup::Found(metrics) => Some(metrics),
            SummaryLookup::Unrecognized => {
                log::warn!("\t{}: no summary available for {}, keeping the id only", id, self.name());
                None
            }
        };

        Ok(Some(RouteSummary {
            id: id.to_string(),
            metrics,
            geometry,
        }))
    }
}
