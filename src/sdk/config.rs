use clap::ValueEnum;
use std::{env, fmt, fs, path::Path, path::PathBuf, time::Duration};

use super::routing::error::RoutingError;

pub const TOMTOM_ROUTING_URL: &str = "https://api.tomtom.com/routing/1/calculateRoute";
pub const ORS_DIRECTIONS_URL: &str = "https://api.openrouteservice.org/v2/directions";
pub const ORS_ISOCHRONES_URL: &str = "https://api.openrouteservice.org/v2/isochrones";

/// Environment variable that takes precedence over the key file.
pub const API_KEY_ENV: &str = "ROUTING_API_KEY";

/// OpenRouteService asks for at most 40 requests a minute on the hosted API.
const ORS_HOSTED_REQUEST_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Provider {
    #[value(name = "tomtom")]
    TomTom,
    #[value(name = "ors")]
    OpenRouteService,
}

/// Hosting flavour of an OpenRouteService endpoint. Ignored for TomTom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeploymentVariant {
    HostedV2,
    SelfHostedLegacy,
    SelfHostedV2,
}

impl DeploymentVariant {
    /// Guesses the variant from a base URL override: local servers without
    /// `v2` in their path speak the legacy API.
    pub fn infer(base_url: Option<&str>) -> Self {
        match base_url {
            Some(url) if url.contains("localhost") || url.contains("127.0.0.1") => {
                if url.contains("v2") {
                    DeploymentVariant::SelfHostedV2
                } else {
                    DeploymentVariant::SelfHostedLegacy
                }
            }
            _ => DeploymentVariant::HostedV2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RequestMode {
    Directions,
    Isochrone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Points,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TravelMode {
    Car,
    Pedestrian,
}

impl TravelMode {
    /// Value of TomTom's `travelMode` parameter.
    pub fn tomtom_name(self) -> &'static str {
        match self {
            TravelMode::Car => "car",
            TravelMode::Pedestrian => "pedestrian",
        }
    }

    /// OpenRouteService profile.
    pub fn ors_profile(self) -> &'static str {
        match self {
            TravelMode::Car => "driving-car",
            TravelMode::Pedestrian => "foot-walking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Weighting {
    Shortest,
    Fastest,
}

impl Weighting {
    pub fn as_str(self) -> &'static str {
        match self {
            Weighting::Shortest => "shortest",
            Weighting::Fastest => "fastest",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangeType {
    Distance,
    Time,
}

impl RangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            RangeType::Distance => "distance",
            RangeType::Time => "time",
        }
    }
}

/// Fully resolved settings for one run. Built by the command line layer.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub provider: Provider,
    pub variant: DeploymentVariant,
    pub travel_mode: TravelMode,
    pub weighting: Weighting,
    pub request_mode: RequestMode,
    pub output_mode: OutputMode,
    pub include_geometry: bool,
    pub use_cache: bool,
    pub cache_dir: PathBuf,
    pub api_key: String,
    pub base_url: Option<String>,
    pub range_type: RangeType,
    /// Default isochrone ranges, in metres or seconds depending on `range_type`.
    pub ranges: Vec<f64>,
    /// Minimum spacing between live requests; `None` means the provider default.
    pub request_interval: Option<Duration>,
    pub timeout: Option<Duration>,
    /// Serve every request from this file instead of the network.
    pub fixture: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            provider: Provider::TomTom,
            variant: DeploymentVariant::HostedV2,
            travel_mode: TravelMode::Car,
            weighting: Weighting::Shortest,
            request_mode: RequestMode::Directions,
            output_mode: OutputMode::Points,
            include_geometry: false,
            use_cache: false,
            cache_dir: PathBuf::from("../data/out/json"),
            api_key: String::new(),
            base_url: None,
            range_type: RangeType::Distance,
            ranges: Vec::new(),
            request_interval: None,
            timeout: None,
            fixture: None,
        }
    }
}

impl RunConfig {
    /// The override URL when set, the provider's public endpoint otherwise.
    pub fn base_url(&self) -> &str {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.is_empty()) {
            return url.trim_end_matches('/');
        }
        match (self.provider, self.request_mode) {
            (Provider::TomTom, _) => TOMTOM_ROUTING_URL,
            (Provider::OpenRouteService, RequestMode::Directions) => ORS_DIRECTIONS_URL,
            (Provider::OpenRouteService, RequestMode::Isochrone) => ORS_ISOCHRONES_URL,
        }
    }

    /// Interval between two live requests.
    pub fn effective_request_interval(&self) -> Option<Duration> {
        if self.request_interval.is_some() {
            return self.request_interval.filter(|d| !d.is_zero());
        }
        match (self.provider, self.variant) {
            (Provider::OpenRouteService, DeploymentVariant::HostedV2) => {
                Some(ORS_HOSTED_REQUEST_INTERVAL)
            }
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), RoutingError> {
        if self.provider == Provider::TomTom && self.request_mode == RequestMode::Isochrone {
            return Err(RoutingError::Config(
                "isochrones are only available with the ors router".to_string(),
            ));
        }
        if self.request_mode == RequestMode::Isochrone
            && (self.ranges.is_empty() || self.ranges.iter().any(|r| *r <= 0.0))
        {
            return Err(RoutingError::Config(
                "isochrone requests need at least one positive range".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tprovider : {:?}", self.provider)?;
        writeln!(f, "\tdeployment : {:?}", self.variant)?;
        writeln!(f, "\tbase url : {}", self.base_url())?;
        writeln!(f, "\trequest mode : {:?}", self.request_mode)?;
        writeln!(f, "\toutput mode : {:?}", self.output_mode)?;
        writeln!(f, "\ttravel mode : {:?}", self.travel_mode)?;
        writeln!(f, "\tweighting : {}", self.weighting.as_str())?;
        writeln!(f, "\tgeometry : {}", self.include_geometry)?;
        writeln!(f, "\tjson cache : {} ({})", self.use_cache, self.cache_dir.display())?;
        writeln!(f, "\tapi key : {}", if self.api_key.is_empty() { "<none>" } else { "<set>" })?;
        if self.request_mode == RequestMode::Isochrone {
            writeln!(f, "\tranges : {:?} ({})", self.ranges, self.range_type.as_str())?;
        }
        if let Some(fixture) = &self.fixture {
            writeln!(f, "\tfixture : {}", fixture.display())?;
        }
        Ok(())
    }
}

/// Reads the API key from a text file, stripping line breaks and surrounding blanks.
///
/// A missing or unreadable file is logged and yields an empty key so that
/// unauthenticated servers can still be queried.
pub fn read_api_key<P: AsRef<Path>>(path: P) -> String {
    match fs::read_to_string(path.as_ref()) {
        Ok(data) => data.replace(['\r', '\n'], "").trim().to_string(),
        Err(err) => {
            log::error!("Could not read API key file {}: {}", path.as_ref().display(), err);
            String::new()
        }
    }
}

/// The key from `ROUTING_API_KEY` when set, from the key file otherwise.
pub fn resolve_api_key<P: AsRef<Path>>(key_file: P) -> String {
    match env::var(API_KEY_ENV) {
        Ok(key) if !key.trim().is_empty() => key.trim().to_string(),
        _ => read_api_key(key_file),
    }
}
