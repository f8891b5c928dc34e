//! Multi-currency price views backed by the rate cache.

use crate::cache::RateCache;
use crate::convert::{PriceView, price_view};
use crate::currency::{CurrencyCode, Money};
use crate::error::RateFetchError;

/// Anything carrying a canonical price.
pub trait Priced {
    fn price(&self) -> Money;
}

impl Priced for Money {
    fn price(&self) -> Money {
        *self
    }
}

/// Turns canonical prices into [`PriceView`]s.
///
/// Every call reads the cache exactly once, so all views built by one call
/// come from the same snapshot.
#[derive(Clone)]
pub struct PriceAssembler {
    cache: RateCache,
    base: CurrencyCode,
    targets: Vec<CurrencyCode>,
}

impl PriceAssembler {
    pub fn new(cache: RateCache, base: CurrencyCode, targets: Vec<CurrencyCode>) -> Self {
        Self {
            cache,
            base,
            targets,
        }
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Display currencies used when a caller does not ask for specific ones.
    pub fn default_targets(&self) -> &[CurrencyCode] {
        &self.targets
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }

    #[tracing::instrument(skip(self, item), fields(targets = targets.len()))]
    pub async fn assemble<T: Priced>(
        &self,
        item: &T,
        targets: &[CurrencyCode],
    ) -> Result<PriceView, RateFetchError> {
        let snapshot = self.cache.get().await?;
        Ok(price_view(&self.base, item.price(), targets, Some(snapshot.rates())))
    }

    /// Builds one view per item from a single snapshot.
    ///
    /// An empty batch does not touch the cache. A failed lookup fails the
    /// whole batch.
    #[tracing::instrument(skip(self, items), fields(items = items.len(), targets = targets.len()))]
    pub async fn assemble_batch<T: Priced>(
        &self,
        items: &[T],
        targets: &[CurrencyCode],
    ) -> Result<Vec<PriceView>, RateFetchError> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let snapshot = self.cache.get().await?;
        let rates = snapshot.rates();

        Ok(items
            .iter()
            .map(|item| price_view(&self.base, item.price(), targets, Some(rates)))
            .collect())
    }
}
