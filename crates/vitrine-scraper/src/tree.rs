//! Depth-bounded traversal of embedded JSON state.
//!
//! Retailer payloads are attacker-controlled from our point of view, so every
//! recursive walk stops at [`MAX_DEPTH`] instead of trusting the input shape.

use rust_decimal::Decimal;
use serde_json::Value;
use vitrine_core::{is_plausible_price, Money};

use crate::money::{json_decimal, plausible_json_price};

/// Nesting levels below the root that a walk will visit.
pub const MAX_DEPTH: usize = 64;

/// Follows object keys from `root`. Any non-object along the way yields `None`.
#[must_use]
pub fn path<'a>(root: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .try_fold(root, |node, key| node.as_object()?.get(*key))
}

/// Pre-order depth-first search returning the first `Some` produced by `visit`.
///
/// Object members are visited in map iteration order (sorted by key).
pub fn find_map<'a, T>(root: &'a Value, mut visit: impl FnMut(&'a Value) -> Option<T>) -> Option<T> {
    find_map_at(root, 0, &mut visit)
}

fn find_map_at<'a, T>(
    node: &'a Value,
    depth: usize,
    visit: &mut impl FnMut(&'a Value) -> Option<T>,
) -> Option<T> {
    if depth > MAX_DEPTH {
        return None;
    }
    if let Some(found) = visit(node) {
        return Some(found);
    }
    match node {
        Value::Object(map) => map
            .values()
            .find_map(|child| find_map_at(child, depth + 1, visit)),
        Value::Array(items) => items
            .iter()
            .find_map(|child| find_map_at(child, depth + 1, visit)),
        _ => None,
    }
}

/// Calls `visit` on every node down to [`MAX_DEPTH`], pre-order.
pub fn for_each<'a>(root: &'a Value, mut visit: impl FnMut(&'a Value)) {
    for_each_at(root, 0, &mut visit);
}

fn for_each_at<'a>(node: &'a Value, depth: usize, visit: &mut impl FnMut(&'a Value)) {
    if depth > MAX_DEPTH {
        return;
    }
    visit(node);
    match node {
        Value::Object(map) => map
            .values()
            .for_each(|child| for_each_at(child, depth + 1, visit)),
        Value::Array(items) => items
            .iter()
            .for_each(|child| for_each_at(child, depth + 1, visit)),
        _ => {}
    }
}

/// Keys that name the payment method of a price fragment.
const PAYMENT_METHOD_KEYS: [&str; 4] = [
    "payment_method_id",
    "paymentMethodId",
    "paymentMethod",
    "payment_method",
];

/// Keys that hold a finalized amount inside a payment-method fragment.
const AMOUNT_KEYS: [&str; 5] = ["amount", "value", "total", "final_amount", "totalAmount"];

/// Walks the whole tree for fragments that explicitly name Pix as their
/// payment method and carry a plausible numeric amount. Returns the lowest
/// such amount.
///
/// Fragments without the explicit marker are ignored even when they hold a
/// price, so a cash price can never leak into the Pix column.
#[must_use]
pub fn deep_pix_amount(root: &Value) -> Option<Money> {
    let mut lowest: Option<Decimal> = None;
    for_each(root, |node| {
        let Some(map) = node.as_object() else {
            return;
        };
        let is_pix = PAYMENT_METHOD_KEYS.iter().any(|key| {
            map.get(*key)
                .and_then(Value::as_str)
                .is_some_and(|method| method.eq_ignore_ascii_case("pix"))
        });
        if !is_pix {
            return;
        }
        for key in AMOUNT_KEYS {
            if let Some(amount) = map.get(key).and_then(json_decimal) {
                if is_plausible_price(amount) && lowest.is_none_or(|low| amount < low) {
                    lowest = Some(amount);
                }
            }
        }
    });
    lowest.map(Money::from_decimal)
}

/// First string anywhere in the tree that contains a plausible money literal.
#[must_use]
pub fn first_money_string(root: &Value) -> Option<Money> {
    find_map(root, |node| node.as_str().and_then(crate::money::first_plausible_money))
}

/// Reads a plausible price at `keys` below `root`.
#[must_use]
pub fn price_at(root: &Value, keys: &[&str]) -> Option<Money> {
    path(root, keys).and_then(plausible_json_price)
}
