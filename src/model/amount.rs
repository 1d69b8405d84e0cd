//! Amount type for monetary values that may arrive as formatted strings.
//!
//! Backends are not consistent about how they send money: some send JSON numbers, some send
//! strings like `"-$1,234.50"`, `"₹500"` or the accounting form `"(42.00)"`. `Amount` wraps
//! `Decimal` and remembers how the value was written so it can be displayed the same way.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Currency symbols that may prefix an amount string.
const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹'];

/// Represents how an amount was (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ symbol: Some('$'), commas: true }` -> `-$60,000.00`
///  - `AmountFormat{ symbol: None, commas: true }` -> `-60,000.00`
///  - `AmountFormat{ symbol: None, commas: false }` -> `-60000.00`
///  - `AmountFormat{ symbol: Some('₹'), commas: false }` -> `-₹60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// The currency symbol written before the number, if any.
    symbol: Option<char>,
    /// Whether commas are present as thousands separators.
    commas: bool,
}

impl AmountFormat {
    /// No symbol and no separators, e.g. `-60000.00`.
    pub const PLAIN: AmountFormat = AmountFormat {
        symbol: None,
        commas: false,
    };

    pub const fn new(symbol: Option<char>, commas: bool) -> Self {
        Self { symbol, commas }
    }

    pub fn symbol(&self) -> Option<char> {
        self.symbol
    }

    pub fn commas(&self) -> bool {
        self.commas
    }
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

/// The default format has a dollar sign and commas: e.g. `-$60,000.00`.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    symbol: Some('$'),
    commas: true,
};

/// Represents a monetary amount.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// ```
/// # use ledger_view::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-$1,250.00").unwrap();
/// assert_eq!(amount.to_string(), "-$1,250.00");
///
/// let accounting = Amount::from_str("(42.10)").unwrap();
/// assert!(accounting.is_negative());
/// assert_eq!(accounting.to_string(), "-42.10");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with default `String` formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: DEFAULT_FORMAT,
        }
    }

    pub const fn new_with_format(value: Decimal, format: AmountFormat) -> Self {
        Self { value, format }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn format(&self) -> AmountFormat {
        self.format
    }

    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }
}

/// An error that can occur when parsing strings into `Decimal` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // Accounting notation: (42.00) means -42.00
        let (negative, rest) = match trimmed
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
        {
            Some(inner) => (true, inner.trim()),
            None => match trimmed.strip_prefix('-') {
                Some(after_minus) => (true, after_minus.trim_start()),
                None => (false, trimmed),
            },
        };

        let mut chars = rest.chars();
        let symbol = match chars.next() {
            Some(c) if CURRENCY_SYMBOLS.contains(&c) => Some(c),
            _ => None,
        };
        let number = match symbol {
            Some(_) => chars.as_str().trim_start(),
            None => rest,
        };

        if negative && number.starts_with(['-', '+']) {
            return Err(AmountError(rust_decimal::Error::ErrorString(format!(
                "'{trimmed}' has more than one sign"
            ))));
        }

        let without_commas = number.replace(',', "");
        let commas = without_commas.len() < number.len();

        let mut value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        if negative {
            value = -value;
        }
        Ok(Amount {
            value,
            format: AmountFormat { symbol, commas },
        })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.is_negative() {
            ("-", self.value().abs())
        } else {
            ("", self.value().abs())
        };

        let symbol = self.format.symbol.map(String::from).unwrap_or_default();

        if self.format.commas {
            write!(
                f,
                "{sign}{symbol}{}",
                format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
            )
        } else {
            write!(f, "{sign}{symbol}{num}")
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_with_dollar_sign() {
        let amount = Amount::from_str("$50.00").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
        assert_eq!(amount.format().symbol(), Some('$'));
    }

    #[test]
    fn test_parse_plain_number() {
        let amount = Amount::from_str("50.25").unwrap();
        assert_eq!(amount.value(), dec("50.25"));
        assert_eq!(amount.format(), AmountFormat::PLAIN);
    }

    #[test]
    fn test_parse_negative_with_symbol() {
        assert_eq!(Amount::from_str("-$50.00").unwrap().value(), dec("-50.00"));
        assert_eq!(Amount::from_str("-₹1,500").unwrap().value(), dec("-1500"));
    }

    #[test]
    fn test_parse_accounting_negative() {
        let amount = Amount::from_str("($1,000.00)").unwrap();
        assert_eq!(amount.value(), dec("-1000.00"));
        assert_eq!(amount.to_string(), "-$1,000.00");
    }

    #[test]
    fn test_parse_empty_string_is_zero() {
        assert_eq!(Amount::from_str("").unwrap().value(), Decimal::ZERO);
        assert_eq!(Amount::from_str("   ").unwrap().value(), Decimal::ZERO);
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        assert!(Amount::from_str("twelve").is_err());
        assert!(Amount::from_str("$").is_err());
    }

    #[test]
    fn test_parse_rejects_a_second_sign() {
        for s in ["--5", "- -5", "(-5)", "(-$5)", "-$-5", "(+5)"] {
            assert!(Amount::from_str(s).is_err(), "{s} should not parse");
        }
        assert_eq!(Amount::from_str("-$5").unwrap().value(), Decimal::from(-5));
        assert_eq!(Amount::from_str("($5)").unwrap().value(), Decimal::from(-5));
    }

    #[test]
    fn test_display_keeps_parsed_format() {
        for s in ["1,000,000.00", "-$1000000.00", "€12.50", "-7.25"] {
            assert_eq!(Amount::from_str(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn test_display_default_format() {
        assert_eq!(Amount::new(dec("-50.00")).to_string(), "-$50.00");
        assert_eq!(Amount::new(Decimal::ZERO).to_string(), "$0.00");
    }

    #[test]
    fn test_zero_is_neither_positive_nor_negative() {
        let zero = Amount::from_str("-0.00").unwrap();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());
        assert_eq!(zero.to_string(), "0.00");
    }

    #[test]
    fn test_serde_uses_display_form() {
        let amount = Amount::new_with_format(dec("60.00"), AmountFormat::PLAIN);
        assert_eq!(serde_json::to_string(&amount).unwrap(), "\"60.00\"");
        let back: Amount = serde_json::from_str("\"60.00\"").unwrap();
        assert_eq!(back, amount);
    }

    #[test]
    fn test_equality_includes_format() {
        let a = Amount::from_str("$50.00").unwrap();
        let b = Amount::from_str("50.00").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.value(), b.value());
    }
}
