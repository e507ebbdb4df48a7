//! Money detection in free text and numeric coercion from JSON.
//!
//! Formatting lives in [`vitrine_core::money`]; this module only finds
//! literals and turns JSON numbers into [`Decimal`]s.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;
use vitrine_core::{is_plausible_price, Money};

/// `R$`, optional space, 1-3 digits, `.`-separated thousands groups, and
/// exactly two decimal digits after `,`.
static MONEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"R\$\s?\d{1,3}(?:\.\d{3})*,\d{2}").expect("valid money regex")
});

/// Returns the first money literal in `text`, verbatim.
#[must_use]
pub fn parse_money_literal(text: &str) -> Option<Money> {
    MONEY_RE
        .find(text)
        .map(|m| Money::verbatim(m.as_str()))
}

/// Returns the first money literal in `text` whose amount passes the price
/// sanity bound.
#[must_use]
pub fn first_plausible_money(text: &str) -> Option<Money> {
    MONEY_RE
        .find_iter(text)
        .filter_map(|m| parse_money_literal(m.as_str()))
        .find(is_plausible_literal)
}

/// `true` when the literal's amount lies within the price sanity bound.
#[must_use]
pub fn is_plausible_literal(money: &Money) -> bool {
    money.to_decimal().is_some_and(is_plausible_price)
}

/// Strips diacritics and lower-cases `text` for keyword matching.
///
/// Only ever used to decide whether a line mentions a keyword such as
/// `"pix"` or `"a vista"`; never feed its output to a number parser.
#[must_use]
pub fn normalize_for_match(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Converts a JSON number into an exact decimal.
///
/// Strings, booleans and nulls yield `None`: a price the retailer encodes as
/// a number is only trusted when it arrives as one.
#[must_use]
pub fn json_decimal(value: &Value) -> Option<Decimal> {
    let Value::Number(number) = value else {
        return None;
    };
    if let Some(int) = number.as_i64() {
        return Some(Decimal::from(int));
    }
    Decimal::from_str(&number.to_string())
        .or_else(|_| Decimal::from_scientific(&number.to_string()))
        .ok()
}

/// A JSON number that passes the price sanity bound, formatted.
#[must_use]
pub fn plausible_json_price(value: &Value) -> Option<Money> {
    json_decimal(value)
        .filter(|d| is_plausible_price(*d))
        .map(Money::from_decimal)
}

/// A strictly integral JSON number usable as an installment count.
#[must_use]
pub fn json_count(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|n| u32::try_from(n).ok())
}
