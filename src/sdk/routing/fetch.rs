use reqwest::blocking::Client;
use std::{fs, path::PathBuf, time::Duration};

use super::error::RoutingError;
use super::request::{HttpMethod, ProviderRequest};
use super::route::RawResponse;
use crate::sdk::util::rate_limit::Limiter;

/// Source of raw provider payloads.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, request: &ProviderRequest) -> Result<RawResponse, RoutingError>;
}

/// Live HTTP calls with the blocking reqwest client.
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
    limiter: Limiter,
}

impl HttpFetcher {
    /// `timeout` of `None` keeps the client's default behaviour.
    pub fn new(limiter: Limiter, timeout: Option<Duration>) -> Result<Self, RoutingError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            limiter,
        })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, request: &ProviderRequest) -> Result<RawResponse, RoutingError> {
        self.limiter.wait();
        log::debug!("[FETCH] {}", request.describe());

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = match builder.send() {
            Ok(resp) => resp,
            Err(e) => {
                log::error!("Failed to send request {}\nError: {}", request.describe(), e);
                return Err(RoutingError::Request(e));
            }
        };

        let status = response.status();
        log::info!(
            "\t{} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        );
        let text = response.text()?;

        if !status.is_success() {
            let err = RoutingError::from_api_response(status.as_u16(), &text);
            log::error!("{} failed: {}", request.describe(), err);
            return Err(err);
        }

        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            log::error!(
                "Failed to parse response of {}\nError: {}. Body: {}",
                request.describe(),
                e,
                text
            );
            e
        })?;
        Ok(RawResponse::from_json(Some(status.as_u16()), value))
    }
}

/// Answers every request with the same JSON file. Used for offline runs and tests.
#[derive(Debug, Clone)]
pub struct FixtureFetcher {
    path: PathBuf,
}

impl FixtureFetcher {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl Fetcher for FixtureFetcher {
    fn fetch(&self, request: &ProviderRequest) -> Result<RawResponse, RoutingError> {
        log::debug!("[FIXTURE] {} served from {}", request.describe(), self.path.display());
        let data = fs::read_to_string(&self.path)?;
        let value: serde_json::Value = serde_json::from_str(data.trim())?;
        Ok(RawResponse::from_json(None, value))
    }
}
