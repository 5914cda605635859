use super::config::{OutputMode, RunConfig};
use super::input::InputRow;
use super::routing::cache::JsonCache;
use super::routing::error::RoutingError;
use super::routing::fetch::Fetcher;
use super::routing::provider::resolve_schema;
use super::routing::request::RequestFactory;
use super::routing::route::{BatchResult, RawResponse};
use super::routing::service::ResponseSchema;

/// Drives fetch and normalization over the input rows, one row at a time.
pub struct BatchRunner<'a> {
    config: &'a RunConfig,
    fetcher: &'a dyn Fetcher,
    schema: Box<dyn ResponseSchema>,
    requests: RequestFactory<'a>,
    cache: Option<JsonCache>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub kept: usize,
    pub empty: usize,
    pub failed: usize,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: &'a RunConfig, fetcher: &'a dyn Fetcher) -> Self {
        let cache = config.use_cache.then(|| JsonCache::new(&config.cache_dir));
        Self {
            config,
            fetcher,
            schema: resolve_schema(config.provider, config.variant, config.request_mode),
            requests: RequestFactory::new(config),
            cache,
        }
    }

    /// Processes every row in order. Rows without a result are skipped and a
    /// failing row never stops the batch.
    pub fn run(&self, rows: &[InputRow]) -> (BatchResult, BatchStats) {
        log::info!("Processing {} rows with {}", rows.len(), self.schema.name());
        let mut stats = BatchStats::default();
        let result = match self.config.output_mode {
            OutputMode::Points => BatchResult::Points(self.collect(rows, &mut stats, |id, raw| {
                let points = self.schema.extract_points(id, raw)?;
                Ok((!points.is_empty()).then_some(points))
            })),
            OutputMode::Summary => {
                BatchResult::Summaries(self.collect(rows, &mut stats, |id, raw| {
                    self.schema
                        .extract_summary(id, raw, self.config.include_geometry)
                }))
            }
        };
        log::info!(
            "Batch done: {} kept, {} without result, {} failed",
            stats.kept,
            stats.empty,
            stats.failed
        );
        (result, stats)
    }

    fn collect<T, F>(&self, rows: &[InputRow], stats: &mut BatchStats, normalize: F) -> Vec<T>
    where
        F: Fn(&str, &RawResponse) -> Result<Option<T>, RoutingError>,
    {
        let mut out = Vec::new();
        for row in rows {
            log::info!("row id {}", row.id);
            let outcome = self
                .raw_response(row)
                .and_then(|raw| normalize(&row.id, &raw));
            match outcome {
                Ok(Some(item)) => {
                    stats.kept += 1;
                    out.push(item);
                }
                Ok(None) => {
                    stats.empty += 1;
                    log::warn!("\t{}: no result", row.id);
                }
                Err(err) => {
                    stats.failed += 1;
                    log::error!("\t{}: skipped: {}", row.id, err);
                }
            }
        }
        out
    }

    fn raw_response(&self, row: &InputRow) -> Result<RawResponse, RoutingError> {
        let request = self.requests.build(row)?;
        match &self.cache {
            Some(cache) => cache.load_or_fetch(&row.id, self.fetcher, &request),
            None => self.fetcher.fetch(&request),
        }
    }
}
