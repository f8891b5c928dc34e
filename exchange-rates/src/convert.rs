//! Price conversion with half-up rounding.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::currency::{CurrencyCode, Money};
use crate::snapshot::RateTable;

/// Decimal places of every converted amount.
pub const PRICE_SCALE: u32 = 2;

/// Rounds half away from zero, which is half-up for the non-negative
/// amounts `Money` allows.
pub fn round_half_up(value: Decimal, scale: u32) -> Decimal {
    value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a canonical amount into `target`.
///
/// Returns `None` when there is no rate table, the table has no entry for
/// `target`, or the product does not fit in a decimal. A missing rate is
/// never an error.
pub fn convert(amount: Money, target: &CurrencyCode, rates: Option<&RateTable>) -> Option<Money> {
    let rate = rates?.get(target)?;
    let product = amount.amount().checked_mul(*rate)?;
    Money::new(round_half_up(product, PRICE_SCALE)).ok()
}

/// Multi-currency projection of one canonical price.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = HashMap<String, f64>, example = json!({"EUR": 45.0, "USD": 49.5, "UAH": 1620.0}))]
pub struct PriceView(BTreeMap<CurrencyCode, Money>);

impl PriceView {
    /// Builds a view holding only the canonical amount.
    pub fn canonical(base: CurrencyCode, amount: Money) -> Self {
        let mut prices = BTreeMap::new();
        prices.insert(base, amount);
        Self(prices)
    }

    pub fn get(&self, currency: &str) -> Option<Money> {
        let code: CurrencyCode = currency.parse().ok()?;
        self.0.get(&code).copied()
    }

    pub fn contains(&self, currency: &str) -> bool {
        self.get(currency).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, &Money)> {
        self.0.iter()
    }

    fn insert(&mut self, currency: CurrencyCode, amount: Money) {
        self.0.insert(currency, amount);
    }
}

/// Builds the price view for one amount against an optional rate table.
///
/// The canonical entry is always present and never converted.
pub fn price_view(
    base: &CurrencyCode,
    amount: Money,
    targets: &[CurrencyCode],
    rates: Option<&RateTable>,
) -> PriceView {
    let mut view = PriceView::canonical(base.clone(), amount);
    for target in targets.iter().filter(|t| *t != base) {
        if let Some(converted) = convert(amount, target, rates) {
            view.insert(target.clone(), converted);
        }
    }
    view
}
