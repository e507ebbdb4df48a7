//! JSON payloads embedded in page markup: schema.org JSON-LD and
//! `application/json` script blocks.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;
use vitrine_core::{is_plausible_price, Money};

use crate::money::{first_plausible_money, json_decimal};

static JSONLD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]+type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

static JSON_SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]+type\s*=\s*["']application/json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

/// Every JSON-LD item in `html`: top-level objects, array members and
/// `@graph` members. Blocks that fail to parse are skipped.
#[must_use]
pub fn jsonld_items(html: &str) -> Vec<Value> {
    let mut items = Vec::new();

    for cap in JSONLD_RE.captures_iter(html) {
        let Some(json_text) = cap.get(1) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(json_text.as_str().trim()) else {
            continue;
        };

        let mut candidates = match value {
            Value::Array(list) => list,
            other => vec![other],
        };

        // Many sites wrap structured data inside {"@graph": [...]}.
        let expanded: Vec<Value> = candidates
            .iter()
            .filter_map(|item| item.get("@graph").and_then(Value::as_array))
            .flatten()
            .cloned()
            .collect();
        candidates.extend(expanded);
        items.extend(candidates);
    }

    items
}

/// The first plausible `offers.price` among JSON-LD items.
///
/// `offers` may be an object or a list of objects; `price` may be a number,
/// a dotted decimal string (`"1299.90"`) or a money literal.
#[must_use]
pub fn jsonld_offer_price(html: &str) -> Option<Money> {
    jsonld_items(html).iter().find_map(|item| {
        let offers = item.get("offers")?;
        let offer_list: Vec<&Value> = match offers {
            Value::Array(list) => list.iter().collect(),
            other => vec![other],
        };
        offer_list
            .into_iter()
            .find_map(|offer| offer.get("price").and_then(offer_price))
    })
}

fn offer_price(price: &Value) -> Option<Money> {
    match price {
        Value::String(raw) if raw.contains("R$") => first_plausible_money(raw),
        Value::String(raw) => Decimal::from_str(raw.trim())
            .ok()
            .filter(|d| is_plausible_price(*d))
            .map(Money::from_decimal),
        other => json_decimal(other)
            .filter(|d| is_plausible_price(*d))
            .map(Money::from_decimal),
    }
}

/// Bodies of `<script type="application/json">` blocks at least `min_len`
/// bytes long, largest first.
#[must_use]
pub fn json_script_blocks(html: &str, min_len: usize) -> Vec<&str> {
    let mut blocks: Vec<&str> = JSON_SCRIPT_RE
        .captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
        .filter(|body| body.len() >= min_len)
        .collect();
    blocks.sort_by_key(|body| std::cmp::Reverse(body.len()));
    blocks
}
