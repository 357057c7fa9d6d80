//! Money type and storefront price formatting.
//!
//! Amounts are kept in the smallest currency unit (cents) and formatted with
//! integer arithmetic, so a price such as `2999` always renders as `29.99`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported currencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
    #[default]
    CAD,
    AUD,
    CHF,
    CNY,
    INR,
    MXN,
}

impl Currency {
    /// Get the currency code (e.g., "CAD").
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::CNY => "CNY",
            Currency::INR => "INR",
            Currency::MXN => "MXN",
        }
    }

    /// Symbol used outside the currency's home region (e.g., "CA$").
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "US$",
            Currency::EUR => "\u{20ac}",
            Currency::GBP => "\u{00a3}",
            Currency::JPY => "\u{00a5}",
            Currency::CAD => "CA$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF",
            Currency::CNY => "CN\u{00a5}",
            Currency::INR => "\u{20b9}",
            Currency::MXN => "MX$",
        }
    }

    /// Symbol used inside the currency's home region (e.g., "$" for CAD in Canada).
    pub fn local_symbol(&self) -> &'static str {
        match self {
            Currency::USD | Currency::CAD | Currency::AUD | Currency::MXN => "$",
            Currency::CNY => "\u{00a5}",
            other => other.symbol(),
        }
    }

    /// ISO region whose locales use the local symbol.
    pub fn home_region(&self) -> Option<&'static str> {
        match self {
            Currency::USD => Some("US"),
            Currency::GBP => Some("GB"),
            Currency::JPY => Some("JP"),
            Currency::CAD => Some("CA"),
            Currency::AUD => Some("AU"),
            Currency::CHF => Some("CH"),
            Currency::CNY => Some("CN"),
            Currency::INR => Some("IN"),
            Currency::MXN => Some("MX"),
            Currency::EUR => None,
        }
    }

    /// Get the number of decimal places for this currency.
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Parse a currency code string.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_uppercase().as_str() {
            "USD" => Some(Currency::USD),
            "EUR" => Some(Currency::EUR),
            "GBP" => Some(Currency::GBP),
            "JPY" => Some(Currency::JPY),
            "CAD" => Some(Currency::CAD),
            "AUD" => Some(Currency::AUD),
            "CHF" => Some(Currency::CHF),
            "CNY" => Some(Currency::CNY),
            "INR" => Some(Currency::INR),
            "MXN" => Some(Currency::MXN),
            _ => None,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A monetary value with currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Money {
    /// Amount in smallest currency unit (e.g., cents).
    pub amount_cents: i64,
    /// The currency.
    pub currency: Currency,
}

impl Money {
    /// Create a new Money value from cents.
    pub fn new(amount_cents: i64, currency: Currency) -> Self {
        Self {
            amount_cents,
            currency,
        }
    }

    /// Create a zero amount in the given currency.
    pub fn zero(currency: Currency) -> Self {
        Self::new(0, currency)
    }

    /// Check if this is zero.
    pub fn is_zero(&self) -> bool {
        self.amount_cents == 0
    }

    /// Check if this is negative.
    pub fn is_negative(&self) -> bool {
        self.amount_cents < 0
    }

    /// Format with the currency's international symbol (e.g., "CA$49.99").
    pub fn display(&self) -> String {
        MoneyFormatter::new(self.currency, "en").format(self)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Formats minor-unit amounts for a currency and locale.
///
/// Output follows English conventions: symbol prefix, comma grouping and a
/// period decimal separator. The locale's region decides between the local
/// symbol ("$" for CAD in `en-CA`) and the international one ("CA$").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyFormatter {
    currency: Currency,
    locale: String,
}

impl MoneyFormatter {
    /// Create a formatter.
    pub fn new(currency: Currency, locale: impl Into<String>) -> Self {
        Self {
            currency,
            locale: locale.into(),
        }
    }

    /// The formatter's currency.
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// The formatter's locale tag.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Symbol this formatter prefixes amounts with.
    pub fn symbol(&self) -> &'static str {
        let region = self
            .locale
            .split(['-', '_'])
            .nth(1)
            .map(|r| r.to_ascii_uppercase());

        match (region.as_deref(), self.currency.home_region()) {
            (Some(region), Some(home)) if region == home => self.currency.local_symbol(),
            _ => self.currency.symbol(),
        }
    }

    /// Format an amount given in minor units of this formatter's currency.
    pub fn format_cents(&self, cents: i64) -> String {
        let places = self.currency.decimal_places();
        let divisor = 10_u64.pow(places);
        let abs = cents.unsigned_abs();
        let major = group_thousands(abs / divisor);

        let symbol = self.symbol();
        let separator = if symbol.chars().all(|c| c.is_ascii_alphabetic()) {
            " "
        } else {
            ""
        };
        let sign = if cents < 0 { "-" } else { "" };

        if places == 0 {
            format!("{sign}{symbol}{separator}{major}")
        } else {
            let minor = abs % divisor;
            let width = places as usize;
            format!("{sign}{symbol}{separator}{major}.{minor:0width$}")
        }
    }

    /// Format a [`Money`] value. The value's own currency decides the decimals.
    pub fn format(&self, money: &Money) -> String {
        Self::new(money.currency, self.locale.clone()).format_cents(money.amount_cents)
    }
}

impl Default for MoneyFormatter {
    fn default() -> Self {
        Self::new(Currency::CAD, "en-CA")
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money_cad_in_canada() {
        let f = MoneyFormatter::new(Currency::CAD, "en-CA");
        assert_eq!(f.format_cents(2999), "$29.99");
    }

    #[test]
    fn test_format_money_cad_abroad() {
        let f = MoneyFormatter::new(Currency::CAD, "en-US");
        assert_eq!(f.format_cents(2999), "CA$29.99");
    }

    #[test]
    fn test_format_money_grouping() {
        let f = MoneyFormatter::default();
        assert_eq!(f.format_cents(123456789), "$1,234,567.89");
        assert_eq!(f.format_cents(100000), "$1,000.00");
        assert_eq!(f.format_cents(99999), "$999.99");
    }

    #[test]
    fn test_format_money_small_and_negative() {
        let f = MoneyFormatter::default();
        assert_eq!(f.format_cents(5), "$0.05");
        assert_eq!(f.format_cents(0), "$0.00");
        assert_eq!(f.format_cents(-1050), "-$10.50");
    }

    #[test]
    fn test_format_money_zero_decimal_currency() {
        let f = MoneyFormatter::new(Currency::JPY, "ja-JP");
        assert_eq!(f.format_cents(1500), "\u{00a5}1,500");
    }

    #[test]
    fn test_format_money_alphabetic_symbol_spacing() {
        let f = MoneyFormatter::new(Currency::CHF, "en-CA");
        assert_eq!(f.format_cents(2999), "CHF 29.99");
    }

    #[test]
    fn test_money_display() {
        let m = Money::new(4999, Currency::CAD);
        assert_eq!(m.display(), "CA$49.99");
        assert!(!m.is_zero());
        assert!(Money::zero(Currency::USD).is_zero());
        assert!(Money::new(-1, Currency::USD).is_negative());
    }

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("CAD"), Some(Currency::CAD));
        assert_eq!(Currency::from_code("eur"), Some(Currency::EUR));
        assert_eq!(Currency::from_code("INVALID"), None);
    }
}
