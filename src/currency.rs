//! Currency codes and pairs (ISO 4217)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currency enumeration (ISO 4217 codes)
///
/// Variants are declared alphabetically so the derived ordering matches
/// the code ordering used in warehouse queries and grouped output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Swiss Franc
    CHF,
    /// Czech Koruna
    CZK,
    /// Danish Krone
    DKK,
    /// Euro
    EUR,
    /// British Pound Sterling
    GBP,
    /// Hungarian Forint
    HUF,
    /// Icelandic Krona
    ISK,
    /// Japanese Yen
    JPY,
    /// Norwegian Krone
    NOK,
    /// Polish Zloty
    PLN,
    /// Romanian Leu
    RON,
    /// Swedish Krona
    SEK,
    /// US Dollar
    USD,
}

impl Currency {
    /// Get ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::CHF => "CHF",
            Currency::CZK => "CZK",
            Currency::DKK => "DKK",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::HUF => "HUF",
            Currency::ISK => "ISK",
            Currency::JPY => "JPY",
            Currency::NOK => "NOK",
            Currency::PLN => "PLN",
            Currency::RON => "RON",
            Currency::SEK => "SEK",
            Currency::USD => "USD",
        }
    }

    /// Parse from ISO code
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "CHF" => Some(Currency::CHF),
            "CZK" => Some(Currency::CZK),
            "DKK" => Some(Currency::DKK),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "HUF" => Some(Currency::HUF),
            "ISK" => Some(Currency::ISK),
            "JPY" => Some(Currency::JPY),
            "NOK" => Some(Currency::NOK),
            "PLN" => Some(Currency::PLN),
            "RON" => Some(Currency::RON),
            "SEK" => Some(Currency::SEK),
            "USD" => Some(Currency::USD),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Currency pair for exchange rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CurrencyPair {
    pub base: Currency,
    pub quote: Currency,
}

impl CurrencyPair {
    /// Create new currency pair
    pub fn new(base: Currency, quote: Currency) -> Self {
        Self { base, quote }
    }

    /// Get the inverse pair
    pub fn inverse(&self) -> Self {
        Self {
            base: self.quote,
            quote: self.base,
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}
