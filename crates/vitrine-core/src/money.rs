//! Money literals in the Brazilian real format (`R$ 1.234,56`).
//!
//! [`format_brl`] is the only place a numeric amount becomes a literal.
//! Literals found verbatim in page text are wrapped with [`Money::verbatim`]
//! and never reformatted.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

/// Currency marker prefixed to every formatted amount.
pub const CURRENCY_MARKER: &str = "R$";

/// Smallest amount accepted as a real product price.
pub const MIN_PLAUSIBLE_PRICE: i64 = 10;

/// Largest amount accepted as a real product price.
pub const MAX_PLAUSIBLE_PRICE: i64 = 200_000;

/// Returns `true` when `value` lies within the price sanity bound
/// (`10 ..= 200_000`). Anything outside is treated as extraction noise
/// (shipping fees, installment counts, product codes).
#[must_use]
pub fn is_plausible_price(value: Decimal) -> bool {
    value >= Decimal::from(MIN_PLAUSIBLE_PRICE) && value <= Decimal::from(MAX_PLAUSIBLE_PRICE)
}

/// Renders `value` as `R$ 1.234,56`: half-up rounding to two places, `.` as the
/// thousands separator and `,` as the decimal separator.
#[must_use]
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let digits = int_part.as_bytes();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, digit) in digits.iter().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(char::from(*digit));
    }

    format!("{CURRENCY_MARKER} {sign}{grouped},{cents}")
}

/// A price as displayed to the customer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Money(String);

impl Money {
    /// Formats a numeric amount through [`format_brl`].
    #[must_use]
    pub fn from_decimal(value: Decimal) -> Self {
        Self(format_brl(value))
    }

    /// Wraps a literal exactly as it appeared in the source text.
    #[must_use]
    pub fn verbatim(literal: impl Into<String>) -> Self {
        Self(literal.into().trim().to_owned())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reads the numeric amount back out of the literal.
    ///
    /// Accepts both `R$ 1.234,56` and `R$1234,56`. Returns `None` for literals
    /// that do not follow the comma-decimal convention.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        let body = self.0.trim_start_matches(CURRENCY_MARKER).trim();
        let (int_part, cents) = body.rsplit_once(',')?;
        if cents.len() != 2 || !cents.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let int_digits: String = int_part.chars().filter(|c| *c != '.').collect();
        if int_digits.is_empty() || !int_digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Decimal::from_str(&format!("{int_digits}.{cents}")).ok()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Whether the retailer advertises the installment plan as interest-free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interest {
    Free,
    Charged,
}

/// An installment plan, rendered as `10x de R$ 15,00 sem juros`.
///
/// `interest` is `None` when the source does not say either way; the suffix
/// is then omitted rather than guessed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installment {
    pub count: u32,
    pub amount: Money,
    pub interest: Option<Interest>,
}

impl Installment {
    #[must_use]
    pub fn new(count: u32, amount: Money) -> Self {
        Self {
            count,
            amount,
            interest: None,
        }
    }

    #[must_use]
    pub fn with_interest(mut self, interest: Interest) -> Self {
        self.interest = Some(interest);
        self
    }
}

impl fmt::Display for Installment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x de {}", self.count, self.amount)?;
        match self.interest {
            Some(Interest::Free) => f.write_str(" sem juros"),
            Some(Interest::Charged) => f.write_str(" com juros"),
            None => Ok(()),
        }
    }
}

impl Serialize for Installment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn format_brl_groups_thousands() {
        assert_eq!(format_brl(dec("1234.56")), "R$ 1.234,56");
        assert_eq!(format_brl(dec("1234567.8")), "R$ 1.234.567,80");
    }

    #[test]
    fn format_brl_small_amounts_have_no_separator() {
        assert_eq!(format_brl(dec("199.9")), "R$ 199,90");
        assert_eq!(format_brl(dec("15")), "R$ 15,00");
        assert_eq!(format_brl(dec("0.5")), "R$ 0,50");
    }

    #[test]
    fn format_brl_rounds_half_up() {
        assert_eq!(format_brl(dec("10.005")), "R$ 10,01");
        assert_eq!(format_brl(dec("10.004")), "R$ 10,00");
        assert_eq!(format_brl(dec("999.995")), "R$ 1.000,00");
    }

    #[test]
    fn format_brl_keeps_sign() {
        assert_eq!(format_brl(dec("-1500")), "R$ -1.500,00");
    }

    #[test]
    fn plausible_price_bounds_are_inclusive() {
        assert!(is_plausible_price(dec("10")));
        assert!(is_plausible_price(dec("200000")));
        assert!(!is_plausible_price(dec("9.99")));
        assert!(!is_plausible_price(dec("200000.01")));
    }

    #[test]
    fn money_to_decimal_reads_grouped_literal() {
        let money = Money::verbatim("R$ 1.234,56");
        assert_eq!(money.to_decimal(), Some(dec("1234.56")));
    }

    #[test]
    fn money_to_decimal_rejects_dot_decimal() {
        assert_eq!(Money::verbatim("R$ 12.50").to_decimal(), None);
    }

    #[test]
    fn verbatim_preserves_spacing_inside_literal() {
        assert_eq!(Money::verbatim("  R$1.299,00 ").as_str(), "R$1.299,00");
    }

    #[test]
    fn installment_renders_interest_suffix() {
        let plan = Installment::new(10, Money::from_decimal(dec("15"))).with_interest(Interest::Free);
        assert_eq!(plan.to_string(), "10x de R$ 15,00 sem juros");

        let charged =
            Installment::new(12, Money::from_decimal(dec("99.9"))).with_interest(Interest::Charged);
        assert_eq!(charged.to_string(), "12x de R$ 99,90 com juros");
    }

    #[test]
    fn installment_without_interest_info_has_no_suffix() {
        let plan = Installment::new(3, Money::verbatim("R$ 50,00"));
        assert_eq!(plan.to_string(), "3x de R$ 50,00");
    }

    #[test]
    fn money_serializes_as_plain_string() {
        let json = serde_json::to_string(&Money::verbatim("R$ 140,00")).unwrap();
        assert_eq!(json, "\"R$ 140,00\"");
    }
}
