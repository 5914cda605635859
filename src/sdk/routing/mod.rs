pub mod cache;
pub mod error;
pub mod fetch;
pub mod provider;
pub mod request;
pub mod route;
pub mod service;

pub use cache::JsonCache;
pub use error::RoutingError;
pub use fetch::{Fetcher, FixtureFetcher, HttpFetcher};
pub use provider::{extract_points, extract_summary, resolve_schema};
pub use request::{ProviderRequest, RequestFactory};
pub use route::{BatchResult, GeoPoint, PointSequence, RawResponse, RouteMetrics, RouteSummary};
pub use service::{ResponseSchema, SummaryLookup};
