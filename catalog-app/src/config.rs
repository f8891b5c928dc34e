//! Configuration loading from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use catalog_repo::ApiKeyStore;
use catalog_types::CurrencyCode;
use exchange_rates::{MAX_RATES_TTL, RateCacheConfig};

/// Application configuration.
pub struct Config {
    pub port: u16,
    pub rates_api_url: String,
    pub rates_timeout: Duration,
    pub cache: RateCacheConfig,
    pub base_currency: CurrencyCode,
    pub display_currencies: Vec<CurrencyCode>,
    pub api_keys: ApiKeyStore,
    pub log_format: LogFormat,
}

/// Shape of the log lines written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be `pretty` or `json`, got `{other}`"),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = var("PORT", "3000")
            .parse::<u16>()
            .context("PORT must be a port number")?;

        let rates_api_url = lookup("RATES_API_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("RATES_API_URL environment variable is required"))?;

        let ttl_secs: u64 = var("RATES_TTL_SECS", "1800")
            .parse::<u64>()
            .context("RATES_TTL_SECS must be a number of seconds")?;
        let timeout_secs: u64 = var("RATES_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .context("RATES_TIMEOUT_SECS must be a number of seconds")?;
        if ttl_secs == 0 || timeout_secs == 0 {
            anyhow::bail!("RATES_TTL_SECS and RATES_TIMEOUT_SECS must be positive");
        }
        if ttl_secs > MAX_RATES_TTL.as_secs() {
            anyhow::bail!(
                "RATES_TTL_SECS must be at most {} seconds",
                MAX_RATES_TTL.as_secs()
            );
        }

        let cache = RateCacheConfig {
            ttl: Duration::from_secs(ttl_secs),
            max_entries: var("RATES_CACHE_MAX_ENTRIES", "1")
                .parse::<usize>()
                .context("RATES_CACHE_MAX_ENTRIES must be a number")?,
            serve_stale_on_error: var("RATES_SERVE_STALE", "false")
                .parse::<bool>()
                .context("RATES_SERVE_STALE must be `true` or `false`")?,
            ..Default::default()
        };

        let base_currency = var("CATALOG_BASE_CURRENCY", CurrencyCode::CANONICAL)
            .parse::<CurrencyCode>()
            .map_err(|e| anyhow::anyhow!("CATALOG_BASE_CURRENCY: {e}"))?;
        let display_currencies =
            CurrencyCode::parse_list(&var("CATALOG_DISPLAY_CURRENCIES", "USD,UAH"))
                .map_err(|e| anyhow::anyhow!("CATALOG_DISPLAY_CURRENCIES: {e}"))?;

        let api_keys = ApiKeyStore::parse(&var("CATALOG_API_KEYS", ""))
            .context("CATALOG_API_KEYS must be `key:role` pairs")?;

        let log_format = var("LOG_FORMAT", "pretty").parse::<LogFormat>()?;

        Ok(Self {
            port,
            rates_api_url,
            rates_timeout: Duration::from_secs(timeout_secs),
            cache,
            base_currency,
            display_currencies,
            api_keys,
            log_format,
        })
    }
}
