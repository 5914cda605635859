use env_logger::{Builder, Env};
use std::env;

/// Loads `.env`, then installs the process logger. `RUST_LOG`, from the
/// environment or the `.env` file, overrides the `info` default.
pub fn init_logging() {
    dotenvy::dotenv().ok();
    logger_builder().init();
}

fn logger_builder() -> Builder {
    let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let mut builder = Builder::from_env(Env::default().default_filter_or(level));
    builder.format_timestamp_secs().format_module_path(false);
    builder
}

/// Like [`init_logging`] but safe to call more than once, for tests.
pub fn try_init_test_logging() {
    let _ = Builder::from_env(Env::default().default_filter_or("debug"))
        .is_test(true)
        .try_init();
}
