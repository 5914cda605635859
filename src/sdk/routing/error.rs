use serde::Deserialize;
use thiserror::Error;

// Helper structs to parse the JSON error body returned by ORS and TomTom
#[derive(Deserialize, Debug)]
pub struct ApiErrorDetail {
    pub code: Option<serde_json::Value>,
    pub message: Option<String>,
    pub description: Option<String>,
}
#[derive(Deserialize, Debug)]
pub struct ApiErrorPayload {
    pub error: ApiErrorDetail,
}

#[derive(Error, Debug)]
pub enum RoutingError {
    // Non-2xx answer from the provider
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Underlying request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    // The payload exists but has a shape we cannot read as "no data"
    #[error("Unexpected response structure: {0}")]
    Structural(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported request: {0}")]
    Unsupported(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RoutingError {
    /// Builds an `Http` error from a non-success status and its body.
    ///
    /// The provider's structured error message is used when the body parses,
    /// the raw body otherwise.
    pub fn from_api_response(status: u16, body: &str) -> Self {
        let message = match serde_json::from_str::<ApiErrorPayload>(body) {
            Ok(payload) => {
                let detail = payload.error;
                let text = detail
                    .message
                    .or(detail.description)
                    .unwrap_or_else(|| body.trim().to_string());
                match detail.code {
                    Some(code) => format!("{} (code {})", text, code),
                    None => text,
                }
            }
            Err(_) => body.trim().to_string(),
        };
        RoutingError::Http { status, message }
    }

    /// True for HTTP and network level failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, RoutingError::Http { .. } | RoutingError::Request(_))
    }
}
