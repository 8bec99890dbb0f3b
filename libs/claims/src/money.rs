//! Currency-qualified amounts
//!
//! Amounts display as `"<ISO 4217 code> <value>"`, e.g. `INR 1000`. Values
//! are normalized on display so `1000.0` and `1000` print the same.

use crate::error::{Error, Result};
use claimdesk_models::Money;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount {
    pub currency: String,
    pub value: Decimal,
}

impl Amount {
    pub fn new(currency: impl Into<String>, value: Decimal) -> Self {
        Self {
            currency: currency.into(),
            value,
        }
    }

    pub fn zero(currency: impl Into<String>) -> Self {
        Self::new(currency, Decimal::ZERO)
    }

    /// `None` when the Money has no value
    pub fn from_money(money: &Money, default_currency: &str) -> Option<Self> {
        let value = money.value?;
        let currency = money.currency.as_deref().unwrap_or(default_currency);
        Some(Self::new(currency, value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.value.normalize())
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (currency, value) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| Error::InvalidAmount(s.to_string()))?;
        let value = Decimal::from_str(value.trim())
            .map_err(|e| Error::InvalidAmount(format!("{}: {}", s, e)))?;
        Ok(Self::new(currency, value))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Approved amount as shown to reviewers
///
/// Nothing is shown while the request as a whole is still pending, whatever
/// a single track may already have recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovedAmount {
    Hidden,
    Shown(Amount),
}

impl ApprovedAmount {
    pub fn amount(&self) -> Option<&Amount> {
        match self {
            ApprovedAmount::Hidden => None,
            ApprovedAmount::Shown(amount) => Some(amount),
        }
    }
}

impl fmt::Display for ApprovedAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovedAmount::Hidden => f.write_str("-"),
            ApprovedAmount::Shown(amount) => fmt::Display::fmt(amount, f),
        }
    }
}

impl Serialize for ApprovedAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_normalizes_trailing_zeros() {
        let amount = Amount::new("INR", Decimal::from_str("1000.00").unwrap());
        assert_eq!(amount.to_string(), "INR 1000");

        let amount = Amount::new("USD", Decimal::from_str("12.50").unwrap());
        assert_eq!(amount.to_string(), "USD 12.5");
    }

    #[test]
    fn parses_display_form() {
        let amount: Amount = "INR 100000".parse().unwrap();
        assert_eq!(amount, Amount::new("INR", Decimal::from(100000)));

        assert!("100000".parse::<Amount>().is_err());
        assert!("INR lots".parse::<Amount>().is_err());
    }

    #[test]
    fn from_money_defaults_currency() {
        let money = Money {
            value: Some(Decimal::from(600)),
            currency: None,
        };
        assert_eq!(
            Amount::from_money(&money, "INR"),
            Some(Amount::new("INR", Decimal::from(600)))
        );
        assert_eq!(Amount::from_money(&Money::default(), "INR"), None);
    }

    #[test]
    fn approved_amount_serializes_as_display_string() {
        assert_eq!(
            serde_json::to_value(ApprovedAmount::Hidden).unwrap(),
            serde_json::json!("-")
        );
        assert_eq!(
            serde_json::to_value(ApprovedAmount::Shown(Amount::zero("INR"))).unwrap(),
            serde_json::json!("INR 0")
        );
    }
}
