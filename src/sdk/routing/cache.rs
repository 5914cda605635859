use super::error::RoutingError;
use super::fetch::Fetcher;
use super::request::ProviderRequest;
use super::route::RawResponse;
use serde_json::Value;
use std::{fs, path::PathBuf};

/// Write-once directory of raw provider payloads, one `{id}.json` per row.
///
/// A file holding `null` records a request that produced nothing usable.
#[derive(Debug, Clone)]
pub struct JsonCache {
    dir: PathBuf,
}

impl JsonCache {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    /// `Ok(None)` when no file exists for `id`.
    pub fn load(&self, id: &str) -> Result<Option<RawResponse>, RoutingError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        let value: Value = serde_json::from_str(data.trim())?;
        Ok(Some(RawResponse::from_json(None, value)))
    }

    pub fn store(&self, id: &str, raw: &RawResponse) -> Result<(), RoutingError> {
        fs::create_dir_all(&self.dir)?;
        let data = match raw.body() {
            Some(body) => serde_json::to_string(body)?,
            None => "null".to_string(),
        };
        fs::write(self.path_for(id), data)?;
        Ok(())
    }

    /// Returns the cached payload for `id`, or fetches it and caches the result.
    ///
    /// An HTTP error status is cached as `null` before the error is returned;
    /// network failures leave the cache untouched. Failing to write the cache
    /// is only logged.
    pub fn load_or_fetch(
        &self,
        id: &str,
        fetcher: &dyn Fetcher,
        request: &ProviderRequest,
    ) -> Result<RawResponse, RoutingError> {
        if let Some(raw) = self.load(id)? {
            log::info!("\tread {}", self.path_for(id).display());
            return Ok(raw);
        }

        match fetcher.fetch(request) {
            Ok(raw) => {
                match self.store(id, &raw) {
                    Ok(()) => log::info!("\tsave {}", self.path_for(id).display()),
                    Err(store_err) => log::warn!("\t{}: could not cache response: {}", id, store_err),
                }
                Ok(raw)
            }
            Err(err @ RoutingError::Http { .. }) => {
                if let Err(store_err) = self.store(id, &RawResponse::absent()) {
                    log::warn!("\t{}: could not cache failed request: {}", id, store_err);
                }
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::routing::request::HttpMethod;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher {
        calls: AtomicUsize,
        answer: fn() -> Result<RawResponse, RoutingError>,
    }

    impl CountingFetcher {
        fn new(answer: fn() -> Result<RawResponse, RoutingError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                answer,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Fetcher for CountingFetcher {
        fn fetch(&self, _request: &ProviderRequest) -> Result<RawResponse, RoutingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)()
        }
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            method: HttpMethod::Get,
            url: "http://localhost/route".to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    fn route_payload() -> Result<RawResponse, RoutingError> {
        Ok(RawResponse::from_json(Some(200), json!({"routes": [{"legs": []}]})))
    }

    #[test]
    fn test_cache_hit_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let cached = r#"{"features":[{"geometry":{"coordinates":[[6.1,49.1,300.0]]}}]}"#;
        fs::write(dir.path().join("0042.json"), format!("{}\n", cached)).unwrap();

        let cache = JsonCache::new(dir.path());
        let fetcher = CountingFetcher::new(route_payload);
        let raw = cache.load_or_fetch("0042", &fetcher, &request()).unwrap();

        assert_eq!(fetcher.calls(), 0);
        let expected: Value = serde_json::from_str(cached).unwrap();
        assert_eq!(raw.body(), Some(&expected));
    }

    #[test]
    fn test_cached_null_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("7.json"), "null").unwrap();

        let cache = JsonCache::new(dir.path());
        let fetcher = CountingFetcher::new(route_payload);
        let raw = cache.load_or_fetch("7", &fetcher, &request()).unwrap();

        assert_eq!(fetcher.calls(), 0);
        assert!(raw.is_absent());
    }

    #[test]
    fn test_cached_empty_object_is_not_absent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("e.json"), "{}").unwrap();
        let raw = JsonCache::new(dir.path()).load("e").unwrap().unwrap();
        assert_eq!(raw.body(), Some(&json!({})));
    }

    #[test]
    fn test_miss_fetches_once_and_stores() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(dir.path().join("json"));
        let fetcher = CountingFetcher::new(route_payload);

        let first = cache.load_or_fetch("r1", &fetcher, &request()).unwrap();
        let second = cache.load_or_fetch("r1", &fetcher, &request()).unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(first.body(), second.body());
        let stored = fs::read_to_string(cache.path_for("r1")).unwrap();
        assert_eq!(stored, r#"{"routes":[{"legs":[]}]}"#);
    }

    #[test]
    fn test_http_error_caches_null_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(dir.path());
        let fetcher = CountingFetcher::new(|| {
            Err(RoutingError::Http {
                status: 404,
                message: "Route not found".to_string(),
            })
        });

        let err = cache.load_or_fetch("404", &fetcher, &request()).unwrap_err();
        assert!(matches!(err, RoutingError::Http { status: 404, .. }));
        assert_eq!(fs::read_to_string(cache.path_for("404")).unwrap(), "null");

        let again = cache.load_or_fetch("404", &fetcher, &request()).unwrap();
        assert!(again.is_absent());
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_other_errors_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(dir.path());
        let fetcher =
            CountingFetcher::new(|| Err(RoutingError::Structural("bad".to_string())));

        assert!(cache.load_or_fetch("x", &fetcher, &request()).is_err());
        assert!(!cache.path_for("x").exists());
    }

    #[test]
    fn test_corrupt_cache_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("c.json"), "{not json").unwrap();
        let err = JsonCache::new(dir.path()).load("c").unwrap_err();
        assert!(matches!(err, RoutingError::Parse(_)));
    }

    #[test]
    fn test_unwritable_cache_keeps_fetched_payload() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let cache = JsonCache::new(file.path());
        let fetcher = CountingFetcher::new(route_payload);

        let raw = cache.load_or_fetch("r1", &fetcher, &request()).unwrap();

        assert_eq!(fetcher.calls(), 1);
        assert_eq!(raw.body(), Some(&json!({"routes": [{"legs": []}]})));
    }
}
