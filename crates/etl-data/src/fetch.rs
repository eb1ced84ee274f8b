//! Remote JSON source.
//!
//! One blocking GET with a fixed timeout. Transport failures, non-2xx
//! statuses and invalid JSON bodies are returned as errors; nothing retries.

use std::time::Duration;

use etl_core::error::Result;
use etl_core::models::RawPayload;
use etl_core::time_utils::{format_fetch_timestamp, Clock};
use tracing::{debug, info};

/// Something that can produce a JSON document from a URL.
pub trait Fetcher {
    fn fetch_json(&self, url: &str) -> Result<serde_json::Value>;
}

/// [`Fetcher`] backed by a blocking `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("data-automation-service/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, timeout })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
        info!("GET {} (timeout {}s)", url, self.timeout.as_secs());
        let response = self.client.get(url).send()?.error_for_status()?;
        let status = response.status();
        let body: serde_json::Value = response.json()?;
        debug!("GET {} -> {}", url, status);
        Ok(body)
    }
}

/// Fetch `url` and wrap the body with the fetch time from `clock`.
pub fn fetch_payload<F, C>(fetcher: &F, url: &str, clock: &C) -> Result<RawPayload>
where
    F: Fetcher + ?Sized,
    C: Clock + ?Sized,
{
    let data = fetcher.fetch_json(url)?;
    Ok(RawPayload {
        fetched_at: format_fetch_timestamp(&clock.now_utc()),
        data,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use etl_core::error::EtlError;
    use etl_core::time_utils::FixedClock;
    use serde_json::json;

    struct StubFetcher(serde_json::Value);

    impl Fetcher for StubFetcher {
        fn fetch_json(&self, _url: &str) -> Result<serde_json::Value> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    impl Fetcher for FailingFetcher {
        fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
            Err(EtlError::Config(format!("unreachable: {url}")))
        }
    }

    fn clock() -> FixedClock {
        FixedClock::new(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 15, 6, 30, 0).unwrap(),
        )
    }

    #[test]
    fn test_fetch_payload_wraps_body() {
        let fetcher = StubFetcher(json!([{"id": 1}, {"id": 2}]));
        let payload = fetch_payload(&fetcher, "https://example.org/posts", &clock()).unwrap();

        assert_eq!(payload.fetched_at, "2024-01-15T06:30:00.000000");
        assert_eq!(payload.record_count(), 2);
    }

    #[test]
    fn test_fetch_payload_propagates_error() {
        let err = fetch_payload(&FailingFetcher, "https://example.org/posts", &clock()).unwrap_err();
        assert!(err.to_string().contains("unreachable"));
    }

    #[test]
    fn test_http_fetcher_builds_client() {
        assert!(HttpFetcher::new(Duration::from_secs(10)).is_ok());
    }
}
