//! HTTP client configuration, retry classification and backoff.

use reqwest::Client;
use std::time::Duration;

/// Sample request used to probe whether the API connection works.
pub const DEFAULT_PROBE_URL: &str = "https://api.ercot.com/api/public-reports/np4-190-cd/dam_stlmnt_pnt_prices?deliveryDateFrom=2024-01-01&deliveryDateTo=2024-01-01&settlementPoint=HB_WEST";

/// Configuration for report requests.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout (separate from request timeout).
    pub connect_timeout: Duration,
    /// Maximum retry attempts per discovery or page step.
    pub max_retries: u32,
    /// Base delay for exponential backoff (in milliseconds).
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds).
    pub max_delay_ms: u64,
    /// Fixed delay before each page request.
    pub page_delay: Duration,
    /// User agent string.
    pub user_agent: String,
    /// URL requested by the connection probe.
    pub probe_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            max_retries: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            page_delay: Duration::from_millis(500), // upstream rate limit
            user_agent: format!("ercot/{}", env!("CARGO_PKG_VERSION")),
            probe_url: DEFAULT_PROBE_URL.to_string(),
        }
    }
}

/// Builds the shared HTTP client for the given configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn http_client(config: &ClientConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_nodelay(true)
        .tcp_keepalive(Duration::from_secs(60))
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .user_agent(&config.user_agent)
        .gzip(true)
        .build()
}

/// Calculates the backoff delay with exponential backoff and jitter.
pub(crate) fn backoff_delay(config: &ClientConfig, attempt: u32) -> Duration {
    // base_delay * 2^attempt
    let exp_delay = config
        .base_delay_ms
        .saturating_mul(1u64 << attempt.min(10));

    let capped_delay = exp_delay.min(config.max_delay_ms);

    // Deterministic jitter (±25%) keyed on the attempt number
    let jitter_range = capped_delay / 4;
    let jitter = if jitter_range > 0 {
        let jitter_offset = (u64::from(attempt) * 17) % (jitter_range * 2);
        jitter_offset as i64 - jitter_range as i64
    } else {
        0
    };

    let final_delay = (capped_delay as i64 + jitter).max(100) as u64;
    Duration::from_millis(final_delay)
}

/// Determines if a transport error is worth retrying.
pub(crate) fn is_retryable_error(error: &reqwest::Error) -> bool {
    if error.is_builder() {
        return false;
    }
    error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
}
