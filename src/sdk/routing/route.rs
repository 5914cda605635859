use geo_types::{Coord, LineString};
use serde_json::Value;

/// One vertex of a route or isochrone outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// 1-based position in the traversal order of the provider payload.
    pub sequence: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
}

/// The ordered points of one request. Empty means "no result".
#[derive(Debug, Clone, PartialEq)]
pub struct PointSequence {
    id: String,
    points: Vec<GeoPoint>,
}

impl PointSequence {
    pub fn empty(id: &str) -> Self {
        Self {
            id: id.to_string(),
            points: Vec::new(),
        }
    }

    /// Numbers `(latitude, longitude, altitude)` triples 1..=n in iteration order.
    pub fn from_coordinates<I>(id: &str, coordinates: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64, Option<f64>)>,
    {
        let points = coordinates
            .into_iter()
            .enumerate()
            .map(|(i, (latitude, longitude, altitude))| GeoPoint {
                sequence: i + 1,
                latitude,
                longitude,
                altitude,
            })
            .collect();
        Self {
            id: id.to_string(),
            points,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Connects the points in sequence order. `None` below two points.
    pub fn line_string(&self) -> Option<LineString<f64>> {
        if self.points.len() < 2 {
            return None;
        }
        Some(LineString::new(
            self.points
                .iter()
                .map(|p| Coord {
                    x: p.longitude,
                    y: p.latitude,
                })
                .collect(),
        ))
    }
}

/// Distance and duration figures read from a provider payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMetrics {
    pub length_in_meters: f64,
    pub travel_time_in_seconds: f64,
    pub ascent: Option<f64>,
    pub descent: Option<f64>,
}

/// Per-request summary row. `metrics` is `None` when the payload had no
/// known summary location, leaving an id-only record.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteSummary {
    pub id: String,
    pub metrics: Option<RouteMetrics>,
    pub geometry: Option<LineString<f64>>,
}

/// Decoded provider payload. `body` is `None` for the cached `null` sentinel
/// or a response that produced nothing usable.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawResponse {
    pub status: Option<u16>,
    pub body: Option<Value>,
}

impl RawResponse {
    pub fn absent() -> Self {
        Self::default()
    }

    /// A JSON `null` is folded into the absent response.
    pub fn from_json(status: Option<u16>, value: Value) -> Self {
        let body = match value {
            Value::Null => None,
            other => Some(other),
        };
        Self { status, body }
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn is_absent(&self) -> bool {
        self.body.is_none()
    }
}

/// Accumulated rows of a batch run, in input order.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchResult {
    Points(Vec<PointSequence>),
    Summaries(Vec<RouteSummary>),
}

impl BatchResult {
    pub fn len(&self) -> usize {
        match self {
            BatchResult::Points(rows) => rows.len(),
            BatchResult::Summaries(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
