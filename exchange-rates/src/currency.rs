//! Currency codes and canonical-currency money.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::MoneyError;

/// ISO 4217 style currency code (three ASCII letters, stored uppercase).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "USD")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Code of the currency all stored prices are denominated in.
    pub const CANONICAL: &'static str = "EUR";

    /// Returns the canonical currency code.
    pub fn canonical() -> Self {
        Self(Self::CANONICAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses a comma separated list such as `"USD, uah,GBP"`.
    pub fn parse_list(list: &str) -> Result<Vec<CurrencyCode>, String> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == 3 && s.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(s.to_ascii_uppercase()))
        } else {
            Err(format!("Unknown currency: {}", s))
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// Non-negative amount in the canonical currency.
///
/// Backed by a 96-bit decimal so conversions never go through binary
/// floating point before the final rounding step.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
#[schema(value_type = f64, example = 45.0)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new Money value.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self(amount))
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the decimal amount.
    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for Money {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim()).map_err(|e| MoneyError::Invalid(e.to_string()))?;
        Money::new(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_currency_code_parse() {
        assert_eq!("USD".parse::<CurrencyCode>().unwrap().as_str(), "USD");
        assert_eq!("uah".parse::<CurrencyCode>().unwrap().as_str(), "UAH");
    }

    #[test]
    fn test_currency_code_rejects_garbage() {
        assert!("US".parse::<CurrencyCode>().is_err());
        assert!("US1".parse::<CurrencyCode>().is_err());
        assert!("EURO".parse::<CurrencyCode>().is_err());
    }

    #[test]
    fn test_parse_list() {
        let codes = CurrencyCode::parse_list("usd, UAH,,GBP ").unwrap();
        let codes: Vec<&str> = codes.iter().map(CurrencyCode::as_str).collect();
        assert_eq!(codes, vec!["USD", "UAH", "GBP"]);
        assert!(CurrencyCode::parse_list("USD,dollars").is_err());
    }

    #[test]
    fn test_currency_code_serde() {
        let code: CurrencyCode = serde_json::from_str("\"gbp\"").unwrap();
        assert_eq!(code.as_str(), "GBP");
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"GBP\"");
        assert!(serde_json::from_str::<CurrencyCode>("\"pounds\"").is_err());
    }

    #[test]
    fn test_negative_money_fails() {
        assert!(matches!(Money::new(dec!(-0.01)), Err(MoneyError::Negative)));
        assert!(Money::new(dec!(0)).unwrap().is_zero());
    }

    #[test]
    fn test_money_display() {
        let money = Money::new(dec!(49.5)).unwrap();
        assert_eq!(money.to_string(), "49.50");
    }

    #[test]
    fn test_money_deserialize_from_number() {
        let money: Money = serde_json::from_str("45.0").unwrap();
        assert_eq!(money.amount(), dec!(45));
        assert!(serde_json::from_str::<Money>("-1.0").is_err());
    }
}
