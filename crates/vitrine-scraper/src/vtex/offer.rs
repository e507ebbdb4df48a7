//! Price fields read from a VTEX commercial offer and checkout simulation.

use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use vitrine_core::{is_plausible_price, Installment, Interest, Money};

use super::types::{CommercialOffer, SimulationResponse};
use crate::money::{json_count, json_decimal, plausible_json_price};

/// Payment-option name fragments that denote the discounted cash price.
const CASH_OPTION_KEYWORDS: [&str; 2] = ["pix", "boleto"];

/// The offer's `Price`, when plausible.
#[must_use]
pub fn cash_price(offer: &CommercialOffer) -> Option<Money> {
    offer.price.as_ref().and_then(plausible_json_price)
}

/// The installment entry with the most payments.
///
/// Entries with a non-numeric count, value or interest rate are skipped, as
/// are zero counts and implausible per-installment values. Ties keep the
/// earlier entry. `InterestRate == 0` renders as "sem juros".
#[must_use]
pub fn best_installment(offer: &CommercialOffer) -> Option<Installment> {
    let entries = offer.installments.as_ref()?.as_array()?;

    let mut best: Option<(u32, Decimal, Decimal)> = None;
    for entry in entries {
        let Some((count, value, rate)) = read_installment(entry) else {
            continue;
        };
        if best.is_none_or(|(best_count, _, _)| count > best_count) {
            best = Some((count, value, rate));
        }
    }

    best.map(|(count, value, rate)| {
        let interest = if rate.is_zero() {
            Interest::Free
        } else {
            Interest::Charged
        };
        Installment::new(count, Money::from_decimal(value)).with_interest(interest)
    })
}

fn read_installment(entry: &Value) -> Option<(u32, Decimal, Decimal)> {
    let count = entry.get("NumberOfInstallments").and_then(json_count)?;
    let value = entry.get("Value").and_then(json_decimal)?;
    let rate = match entry.get("InterestRate") {
        None | Some(Value::Null) => Decimal::ZERO,
        Some(other) => json_decimal(other)?,
    };
    (count > 0 && is_plausible_price(value)).then_some((count, value, rate))
}

fn normalize_option_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lowest first-installment value among Pix/boleto payment options.
///
/// Simulation values are cents; the result is rounded half-up to centavos
/// and must pass the price sanity bound.
#[must_use]
pub fn pix_from_simulation(simulation: &SimulationResponse) -> Option<Money> {
    let options = simulation
        .payment_data
        .as_ref()?
        .installment_options
        .as_deref()?;

    options
        .iter()
        .filter(|option| {
            let name = option
                .payment_name
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .or(option.payment_system_name.as_deref())
                .map(normalize_option_name)
                .unwrap_or_default();
            CASH_OPTION_KEYWORDS.iter().any(|kw| name.contains(kw))
        })
        .filter_map(|option| {
            let first = option.installments.as_deref()?.first()?;
            let cents = first.value.as_ref().and_then(json_decimal)?;
            Some(
                (cents / Decimal::ONE_HUNDRED)
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            )
        })
        .filter(|reais| is_plausible_price(*reais))
        .min()
        .map(Money::from_decimal)
}

#[cfg(test)]
#[path = "offer_test.rs"]
mod tests;
