use crate::sdk::config::{Provider, RequestMode};
use crate::sdk::routing::error::RoutingError;
use crate::sdk::routing::route::{PointSequence, RawResponse};
use crate::sdk::routing::service::ResponseSchema;

/// Provider/mode pairs without a known payload layout. Every payload reads as "no data".
#[derive(Debug)]
pub struct Unsupported {
    provider: Provider,
    mode: RequestMode,
}

impl Unsupported {
    pub fn new(provider: Provider, mode: RequestMode) -> Self {
        Self { provider, mode }
    }
}

impl ResponseSchema for Unsupported {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn extract_points(&self, id: &str, raw: &RawResponse) -> Result<PointSequence, RoutingError> {
        if !raw.is_absent() {
            log::warn!(
                "\t{}: {:?} responses are not read for {:?} requests",
                id,
                self.provider,
                self.mode
            );
        }
        Ok(PointSequence::empty(id))
    }
}
