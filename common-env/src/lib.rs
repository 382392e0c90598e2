//! Common environment variables and constants shared by the responder and the generator

use once_cell::sync::OnceCell;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Path served by the randomized responder and targeted by the generator.
pub const RANDO_PATH: &str = "/rando";
/// Path of the prometheus exporter.
pub const METRICS_PATH: &str = "/metrics";

static LISTEN_ADDR: OnceCell<String> = OnceCell::new();
pub const ENV_NAME_LISTEN_ADDR: &str = "LISTEN_ADDR";
pub const DEFAULT_LISTEN_ADDR: &str = "localhost:8089";

/// host:port the responder binds to and the generator sends requests to
pub fn listen_addr() -> &'static str {
    LISTEN_ADDR.get_or_init(|| {
        env::var(ENV_NAME_LISTEN_ADDR)
            .ok()
            .filter(|addr| !addr.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
    })
}

pub const ENV_NAME_SHUTDOWN_TIMEOUT: &str = "SHUTDOWN_TIMEOUT_SECS";
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 60;
pub fn shutdown_timeout() -> Duration {
    let secs = env::var(ENV_NAME_SHUTDOWN_TIMEOUT)
        .map_err(|_| ())
        .and_then(|val| u64::from_str(&val).map_err(|_| ()))
        .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

pub const ENV_NAME_CONCURRENT_REQUESTS: &str = "CONCURRENT_REQUESTS";
pub const DEFAULT_CONCURRENT_REQUESTS: usize = 2;
pub fn concurrent_requests() -> usize {
    env::var(ENV_NAME_CONCURRENT_REQUESTS)
        .map_err(|_| ())
        .and_then(|val| usize::from_str(&val).map_err(|_| ()))
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_CONCURRENT_REQUESTS)
}
