//! Magazine Luiza.
//!
//! Primary source is the Next.js state in `#__NEXT_DATA__`. When it yields
//! neither a cash price nor an installment plan, the `data-testid` price
//! blocks of the rendered page are read instead. Prices read from markup
//! cannot tell Pix from cash unless the page labels them, so a markup-only
//! record without a labelled Pix price is flagged for manual input.

use serde_json::Value;
use vitrine_core::{is_plausible_price, Installment, Money, PriceRecord, Status};

use super::{embedded_json, load_page, CollectorSettings, PriceExtractor, PriceFields};
use crate::error::ScraperError;
use crate::money::{first_plausible_money, json_count, json_decimal, normalize_for_match};
use crate::page::{PageSession, Readiness};
use crate::text::{find_installment, price_from_element_text};
use crate::tree::{deep_pix_amount, path, price_at};

const NEXT_DATA: &str = "#__NEXT_DATA__";
const PRICE_INSTALLMENT: &str = r#"[data-testid="price-installment"]"#;
const PRICE_METHOD: &str = r#"[data-testid="price-method"]"#;
const PRICE_VALUE: &str = r#"[data-testid="price-value"]"#;
const PRICE_PARTS: [&str; 3] = [
    r#"[data-testid="price-value"] [data-testid="price-value-integer"]"#,
    r#"[data-testid="price-value"] [data-testid="price-value-split-cents-decimal"]"#,
    r#"[data-testid="price-value"] [data-testid="price-value-split-cents-fraction"]"#,
];

/// Field rules for the Magalu product node.
pub struct MagaluState;

impl PriceExtractor for MagaluState {
    fn extract_cash(&self, state: &Value) -> Option<Money> {
        price_at(state, &["bestPrice", "totalAmount"])
    }

    fn extract_pix(&self, state: &Value) -> Option<Money> {
        let best = state.get("bestPrice");
        let best_is_pix = best
            .and_then(|b| b.get("paymentMethodId"))
            .and_then(Value::as_str)
            .is_some_and(|id| id == "pix");
        if best_is_pix {
            if let Some(money) = best.and_then(|b| price_at(b, &["totalAmount"])) {
                return Some(money);
            }
        }
        deep_pix_amount(state)
    }

    fn extract_installments(&self, state: &Value) -> Option<Installment> {
        if let Some(plan) = state
            .get("installment")
            .and_then(|i| plan_from(i, &["amount", "value"]))
        {
            return Some(plan);
        }

        let by_method = state
            .get("installments")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter(|entry| {
                entry.get("paymentMethodId").and_then(Value::as_str) != Some("pix")
            })
            .find_map(|entry| plan_from(entry, &["amount", "value"]));
        if by_method.is_some() {
            return by_method;
        }

        path(state, &["price", "installments"]).and_then(|legacy| plan_from(legacy, &["value"]))
    }
}

/// `quantity` plus the first non-zero amount key, when the plan has more
/// than one payment of a plausible amount.
fn plan_from(node: &Value, amount_keys: &[&str]) -> Option<Installment> {
    if !node.is_object() {
        return None;
    }
    let count = node.get("quantity").and_then(json_count)?;
    let amount = amount_keys
        .iter()
        .filter_map(|key| node.get(*key).and_then(json_decimal))
        .find(|value| !value.is_zero())?;
    (count > 1 && is_plausible_price(amount))
        .then(|| Installment::new(count, Money::from_decimal(amount)))
}

/// The product node inside the Next.js payload.
pub(super) fn product_state(next_data: &Value) -> Option<&Value> {
    path(next_data, &["props", "pageProps", "product"])
        .filter(|v| v.is_object())
        .or_else(|| {
            path(next_data, &["props", "pageProps", "pdp", "product"]).filter(|v| v.is_object())
        })
}

pub(super) async fn collect<P: PageSession>(
    page: &mut P,
    url: &str,
    settings: &CollectorSettings,
) -> Result<PriceRecord, ScraperError> {
    load_page(page, url, &Readiness::Selector(NEXT_DATA), settings).await?;

    if let Some(next_data) = embedded_json(page, NEXT_DATA).await {
        if let Some(state) = product_state(&next_data) {
            let fields = MagaluState.extract(state);
            if fields.is_usable() {
                tracing::debug!(url, "magalu prices read from page state");
                return Ok(fields.into_record(Status::DataUnavailable));
            }
        }
    }

    let fields = dom_fields(page).await?;
    tracing::debug!(url, "magalu prices read from markup");
    if fields == PriceFields::default() {
        return Ok(PriceRecord::empty(Status::DataUnavailable));
    }
    if fields.pix.is_none() {
        return Ok(PriceRecord {
            avista: fields.avista,
            pix: None,
            prazo: fields.prazo,
            status: Status::PixRequiresManualInput,
        });
    }
    Ok(fields.into_record(Status::DataUnavailable))
}

async fn dom_fields<P: PageSession>(page: &mut P) -> Result<PriceFields, ScraperError> {
    let installment_text = page
        .element_texts(PRICE_INSTALLMENT)
        .await?
        .into_iter()
        .find(|t| !t.trim().is_empty());

    let avista = installment_text.as_deref().and_then(first_plausible_money);
    let prazo = installment_text.as_deref().and_then(find_installment);

    let labelled_pix = page
        .element_texts(PRICE_METHOD)
        .await?
        .iter()
        .any(|label| normalize_for_match(label).contains("no pix"));

    let pix = if labelled_pix {
        labelled_price(page).await?
    } else {
        None
    };

    Ok(PriceFields { avista, pix, prazo })
}

/// The highlighted price block, whole or assembled from its split parts.
async fn labelled_price<P: PageSession>(page: &mut P) -> Result<Option<Money>, ScraperError> {
    let whole = page.element_texts(PRICE_VALUE).await?;
    if let Some(money) = whole.first().and_then(|t| price_from_element_text(t)) {
        return Ok(Some(money));
    }

    let mut assembled = String::new();
    for selector in PRICE_PARTS {
        let Some(part) = page.element_texts(selector).await?.into_iter().next() else {
            return Ok(None);
        };
        assembled.push_str(part.trim());
    }
    Ok(price_from_element_text(&assembled))
}
