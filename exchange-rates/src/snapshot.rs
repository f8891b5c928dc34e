//! Immutable exchange-rate snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::currency::CurrencyCode;

/// Target currency → units of target per one unit of base.
pub type RateTable = BTreeMap<CurrencyCode, Decimal>;

/// One successful read of the provider's rate table.
///
/// Fields are private: a snapshot is never patched, only replaced.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RateSnapshot {
    #[schema(value_type = String, example = "EUR")]
    base: CurrencyCode,
    fetched_at: DateTime<Utc>,
    #[schema(value_type = HashMap<String, f64>)]
    rates: RateTable,
    success: bool,
}

impl RateSnapshot {
    pub fn new(base: CurrencyCode, fetched_at: DateTime<Utc>, rates: RateTable) -> Self {
        Self {
            base,
            fetched_at,
            rates,
            success: true,
        }
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn success(&self) -> bool {
        self.success
    }

    /// Rate for `currency`, if the provider quoted one.
    pub fn rate(&self, currency: &CurrencyCode) -> Option<Decimal> {
        self.rates.get(currency).copied()
    }
}
