//! Rate provider port and its HTTP adapter.
//!
//! The fetcher keeps no state between calls: every call goes to the
//! network. Freshness and deduplication belong to [`crate::RateCache`].

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::currency::CurrencyCode;
use crate::error::RateFetchError;
use crate::snapshot::{RateSnapshot, RateTable};

/// Port trait for exchange rate providers.
#[async_trait]
pub trait RateFetcher: Send + Sync + 'static {
    /// Fetches the full rate table for the canonical currency.
    async fn fetch(&self) -> Result<RateSnapshot, RateFetchError>;
}

/// Fetches rates from a Fixer-compatible JSON endpoint.
pub struct HttpRateFetcher {
    client: Client,
    url: String,
    base: CurrencyCode,
    timeout: Duration,
}

impl HttpRateFetcher {
    /// Creates a fetcher whose every request is bounded by `timeout`.
    pub fn new(
        url: impl Into<String>,
        base: CurrencyCode,
        timeout: Duration,
    ) -> Result<Self, RateFetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RateFetchError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            base,
            timeout,
        })
    }

    fn classify(&self, err: reqwest::Error) -> RateFetchError {
        if err.is_timeout() {
            RateFetchError::Timeout(self.timeout)
        } else {
            RateFetchError::Unreachable(err.to_string())
        }
    }
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    #[instrument(skip(self), fields(url = %redact_query(&self.url)))]
    async fn fetch(&self) -> Result<RateSnapshot, RateFetchError> {
        debug!("Requesting currency rates");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                body = %truncate(&body, 256),
                "Failed to fetch currency rates"
            );
            return Err(RateFetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        let snapshot = parse_snapshot(&body, &self.base)?;

        info!(
            base = %snapshot.base(),
            currencies = snapshot.rates().len(),
            "Successfully fetched currency rates"
        );
        Ok(snapshot)
    }
}

/// Wire format of the provider response. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    rates: Option<HashMap<String, Value>>,
    #[serde(default)]
    error: Option<ProviderError>,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    info: Option<String>,
}

impl ProviderError {
    fn describe(&self) -> String {
        let kind = self.kind.as_deref().unwrap_or("unknown_error");
        match (self.code, &self.info) {
            (Some(code), Some(info)) => format!("{} ({}): {}", kind, code, info),
            (Some(code), None) => format!("{} ({})", kind, code),
            (None, Some(info)) => format!("{}: {}", kind, info),
            (None, None) => kind.to_string(),
        }
    }
}

/// Validates a provider body and turns it into a snapshot for `expected_base`.
pub(crate) fn parse_snapshot(
    body: &[u8],
    expected_base: &CurrencyCode,
) -> Result<RateSnapshot, RateFetchError> {
    let response: ProviderResponse =
        serde_json::from_slice(body).map_err(|e| RateFetchError::Malformed(e.to_string()))?;

    if !response.success {
        let reason = response
            .error
            .as_ref()
            .map(ProviderError::describe)
            .unwrap_or_else(|| "success=false".to_string());
        warn!(%reason, "Rate provider reported failure");
        return Err(RateFetchError::Rejected(reason));
    }

    if let Some(base) = response.base.as_deref() {
        let base: CurrencyCode = base.parse().map_err(RateFetchError::Malformed)?;
        if &base != expected_base {
            return Err(RateFetchError::Malformed(format!(
                "expected base {}, got {}",
                expected_base, base
            )));
        }
    }

    let raw = response
        .rates
        .ok_or_else(|| RateFetchError::Malformed("missing `rates`".into()))?;

    let mut rates = RateTable::new();
    for (code, value) in raw {
        let Ok(currency) = code.parse::<CurrencyCode>() else {
            warn!(%code, "Skipping rate with invalid currency code");
            continue;
        };
        match to_rate(&value) {
            Some(rate) => {
                rates.insert(currency, rate);
            }
            None => warn!(%currency, %value, "Skipping non-numeric, non-positive or unrepresentable rate"),
        }
    }

    debug!(
        timestamp = response.timestamp,
        date = response.date.as_deref(),
        currencies = rates.len(),
        "Parsed rate payload"
    );

    Ok(RateSnapshot::new(expected_base.clone(), Utc::now(), rates))
}

/// Goes through the shortest round-trip text form so 1.1 stays exactly 1.1.
fn to_rate(value: &Value) -> Option<Decimal> {
    let value = value.as_f64()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .filter(|d| *d > Decimal::ZERO)
}

fn redact_query(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, http::StatusCode as AxumStatus, routing::get};
    use rust_decimal_macros::dec;

    fn eur() -> CurrencyCode {
        CurrencyCode::canonical()
    }

    #[test]
    fn test_parse_valid_payload() {
        let body = br#"{
            "success": true,
            "timestamp": 1700000000,
            "base": "EUR",
            "date": "2023-11-14",
            "rates": {"USD": 1.1, "UAH": 36.0}
        }"#;

        let snapshot = parse_snapshot(body, &eur()).unwrap();

        assert!(snapshot.success());
        assert_eq!(snapshot.base().as_str(), "EUR");
        assert_eq!(snapshot.rate(&"USD".parse().unwrap()), Some(dec!(1.1)));
        assert_eq!(snapshot.rate(&"UAH".parse().unwrap()), Some(dec!(36)));
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let body = br#"{"success": true, "historical": false, "rates": {"USD": 1.2}, "extra": {"a": 1}}"#;
        let snapshot = parse_snapshot(body, &eur()).unwrap();
        assert_eq!(snapshot.rates().len(), 1);
    }

    #[test]
    fn test_parse_success_false_is_rejected() {
        let body = br#"{
            "success": false,
            "error": {"code": 101, "type": "invalid_access_key", "info": "You have not supplied a valid API Access Key."}
        }"#;

        let err = parse_snapshot(body, &eur()).unwrap_err();

        match err {
            RateFetchError::Rejected(reason) => assert!(reason.contains("invalid_access_key")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_missing_rates_is_malformed() {
        let body = br#"{"success": true, "base": "EUR"}"#;
        assert!(matches!(
            parse_snapshot(body, &eur()),
            Err(RateFetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_wrong_base_is_malformed() {
        let body = br#"{"success": true, "base": "USD", "rates": {"EUR": 0.9}}"#;
        assert!(matches!(
            parse_snapshot(body, &eur()),
            Err(RateFetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_not_json_is_malformed() {
        assert!(matches!(
            parse_snapshot(b"<html>oops</html>", &eur()),
            Err(RateFetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_drops_invalid_entries() {
        let body = br#"{
            "success": true,
            "base": "EUR",
            "rates": {"USD": 1.1, "XXX": 0.0, "BAD1": 2.0, "JPY": -3.0, "XAG": null, "BTC": "n/a", "GBP": {"mid": 0.85}}
        }"#;

        let snapshot = parse_snapshot(body, &eur()).unwrap();

        assert_eq!(snapshot.rates().len(), 1);
        assert!(snapshot.rate(&"USD".parse().unwrap()).is_some());
    }

    #[test]
    fn test_redact_query() {
        assert_eq!(
            redact_query("http://data.fixer.io/api/latest?access_key=secret"),
            "http://data.fixer.io/api/latest"
        );
    }

    /// Serves `app` on an ephemeral port and returns its base URL.
    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_http_fetch_success() {
        let app = Router::new().route(
            "/latest",
            get(|| async {
                Json(serde_json::json!({
                    "success": true,
                    "timestamp": 1700000000,
                    "base": "EUR",
                    "date": "2023-11-14",
                    "rates": {"USD": 1.1, "UAH": 36.0}
                }))
            }),
        );
        let url = format!("{}/latest?access_key=test", serve(app).await);
        let fetcher = HttpRateFetcher::new(url, eur(), Duration::from_secs(5)).unwrap();

        let snapshot = fetcher.fetch().await.unwrap();

        assert_eq!(snapshot.rates().len(), 2);
        assert_eq!(snapshot.rate(&"USD".parse().unwrap()), Some(dec!(1.1)));
    }

    #[tokio::test]
    async fn test_http_fetch_non_200_fails() {
        let app = Router::new().route(
            "/latest",
            get(|| async { (AxumStatus::TOO_MANY_REQUESTS, "quota exceeded") }),
        );
        let url = format!("{}/latest", serve(app).await);
        let fetcher = HttpRateFetcher::new(url, eur(), Duration::from_secs(5)).unwrap();

        let err = fetcher.fetch().await.unwrap_err();

        assert_eq!(err, RateFetchError::Status(429));
    }

    #[tokio::test]
    async fn test_http_fetch_success_false_fails() {
        let app = Router::new().route(
            "/latest",
            get(|| async { Json(serde_json::json!({"success": false})) }),
        );
        let url = format!("{}/latest", serve(app).await);
        let fetcher = HttpRateFetcher::new(url, eur(), Duration::from_secs(5)).unwrap();

        assert!(matches!(
            fetcher.fetch().await,
            Err(RateFetchError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_http_fetch_times_out() {
        let app = Router::new().route(
            "/latest",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(serde_json::json!({"success": true, "rates": {}}))
            }),
        );
        let url = format!("{}/latest", serve(app).await);
        let timeout = Duration::from_millis(100);
        let fetcher = HttpRateFetcher::new(url, eur(), timeout).unwrap();

        let err = fetcher.fetch().await.unwrap_err();

        assert_eq!(err, RateFetchError::Timeout(timeout));
    }

    #[tokio::test]
    async fn test_http_fetch_unreachable() {
        // bind then drop so nothing is listening on the port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let fetcher =
            HttpRateFetcher::new(format!("http://{}/latest", addr), eur(), Duration::from_secs(2))
                .unwrap();

        assert!(matches!(
            fetcher.fetch().await,
            Err(RateFetchError::Unreachable(_))
        ));
    }
}
