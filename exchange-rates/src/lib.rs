//! Exchange rates for the book catalog.
//!
//! The pipeline is: a [`RateFetcher`] reads the provider's rate table, a
//! [`RateCache`] keeps the latest [`RateSnapshot`] for a fixed TTL and
//! collapses concurrent refreshes into one fetch, and a [`PriceAssembler`]
//! turns canonical prices into multi-currency [`PriceView`]s.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use exchange_rates::{CurrencyCode, HttpRateFetcher, Money, PriceAssembler, RateCache};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpRateFetcher::new(
//!     "http://data.fixer.io/api/latest?access_key=KEY",
//!     CurrencyCode::canonical(),
//!     Duration::from_secs(10),
//! )?;
//! let cache = RateCache::new(Arc::new(fetcher));
//! let assembler = PriceAssembler::new(
//!     cache,
//!     CurrencyCode::canonical(),
//!     CurrencyCode::parse_list("USD,UAH")?,
//! );
//!
//! let price: Money = "45.0".parse()?;
//! let view = assembler.assemble(&price, assembler.default_targets()).await?;
//! println!("{}", serde_json::to_string(&view)?);
//! # Ok(())
//! # }
//! ```

mod assembler;
mod cache;
mod convert;
mod currency;
mod error;
mod fetcher;
mod snapshot;

pub use assembler::{PriceAssembler, Priced};
pub use cache::{CacheEvent, MAX_RATES_TTL, RATES_CACHE_KEY, RateCache, RateCacheConfig, log_cache_events};
pub use convert::{PRICE_SCALE, PriceView, convert, price_view, round_half_up};
pub use currency::{CurrencyCode, Money};
pub use error::{MoneyError, RateFetchError};
pub use fetcher::{HttpRateFetcher, RateFetcher};
pub use snapshot::{RateSnapshot, RateTable};
