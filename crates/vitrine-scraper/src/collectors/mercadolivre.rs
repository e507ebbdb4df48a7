//! Mercado Livre.
//!
//! Prices come from the page state (`__PRELOADED_STATE__`, `__APOLLO_STATE__`
//! or the largest embedded JSON block). Availability is decided by the state
//! when there is one; the buy button and unavailability notices are only
//! consulted without it. Markup never yields a Pix price.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use vitrine_core::{is_plausible_price, Installment, Interest, Money, PriceRecord, Status};

use super::{load_page, CollectorSettings, PriceExtractor, PriceFields};
use crate::embedded::json_script_blocks;
use crate::error::ScraperError;
use crate::money::{json_decimal, normalize_for_match};
use crate::page::{PageSession, Readiness};
use crate::text::{find_installment, first_price_in};
use crate::tree::{deep_pix_amount, find_map, path};

const MARKETPLACE_HOST: &str = "mercadolivre.com.br";

/// Embedded JSON blocks shorter than this are config, not page state.
const MIN_STATE_BLOCK_LEN: usize = 2000;

/// How many of the largest JSON blocks are tried.
const STATE_BLOCK_CANDIDATES: usize = 3;

const LOGIN_MARKERS: [&str; 3] = ["acesse sua conta", "sou novo", "ja tenho conta"];
const BUY_BUTTON_MARKERS: [&str; 2] = ["comprar agora", "adicionar ao carrinho"];
const UNAVAILABLE_MARKERS: [&str; 3] = ["produto indisponivel", "publicacao finalizada", "avise-me"];

const CASH_SELECTORS: [&str; 4] = [
    r#"[data-testid="price-part"]"#,
    r#"[data-testid="price"]"#,
    ".ui-pdp-price__second-line",
    ".andes-money-amount__fraction",
];

const INSTALLMENT_SELECTORS: [&str; 3] = [
    r#"[data-testid="installments"]"#,
    ".ui-pdp-installments",
    ".ui-pdp-price__subtitles",
];

static SUBTITLE_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{1,2})\s*x").expect("valid regex"));

/// Field rules for the Mercado Livre page state.
pub struct MercadoLivreState;

impl PriceExtractor for MercadoLivreState {
    /// The first `{type: "price", state: "VISIBLE", price: {value}}` node.
    fn extract_cash(&self, state: &Value) -> Option<Money> {
        let value = find_map(state, |node| {
            let visible_price = node.get("type").and_then(Value::as_str) == Some("price")
                && node.get("state").and_then(Value::as_str) == Some("VISIBLE");
            if !visible_price {
                return None;
            }
            node.get("price")
                .filter(|p| p.is_object())
                .and_then(|p| p.get("value"))
                .and_then(json_decimal)
        })?;
        is_plausible_price(value).then(|| Money::from_decimal(value))
    }

    fn extract_pix(&self, state: &Value) -> Option<Money> {
        path(state, &["components", "price", "props", "payment_methods"])
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter(|method| method.get("id").and_then(Value::as_str) == Some("pix"))
            .find_map(|method| {
                method
                    .get("amount")
                    .and_then(json_decimal)
                    .filter(|amount| is_plausible_price(*amount))
                    .map(Money::from_decimal)
            })
            .or_else(|| deep_pix_amount(state))
    }

    /// The first `subtitles[]` entry reading `Nx ...` whose values carry a
    /// `price_installments.value`.
    fn extract_installments(&self, state: &Value) -> Option<Installment> {
        find_map(state, |node| {
            node.get("subtitles")?
                .as_array()?
                .iter()
                .find_map(subtitle_installment)
        })
    }
}

fn subtitle_installment(subtitle: &Value) -> Option<Installment> {
    let text = subtitle.get("text")?.as_str()?;
    let count: u32 = SUBTITLE_COUNT_RE.captures(text)?.get(1)?.as_str().parse().ok()?;
    let amount = subtitle
        .get("values")?
        .get("price_installments")?
        .get("value")
        .and_then(json_decimal)?;
    if count < 2 || !is_plausible_price(amount) {
        return None;
    }
    let plan = Installment::new(count, Money::from_decimal(amount));
    Some(if normalize_for_match(text).contains("sem juros") {
        plan.with_interest(Interest::Free)
    } else {
        plan
    })
}

/// `true` when the state itself says the listing cannot be bought.
fn unavailable_by_state(state: &Value) -> bool {
    let Some(item) = state.get("item") else {
        return false;
    };
    let sold_out = item
        .get("available_quantity")
        .and_then(Value::as_i64)
        .is_some_and(|qty| qty <= 0);
    let inactive = item
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|status| !status.eq_ignore_ascii_case("active"));
    sold_out || inactive
}

fn login_wall(text: &str) -> bool {
    let norm = normalize_for_match(text);
    LOGIN_MARKERS.iter().any(|marker| norm.contains(marker))
}

async fn available_by_markup<P: PageSession>(
    page: &mut P,
    text: &str,
) -> Result<bool, ScraperError> {
    let has_buy_button = page.element_texts("button").await?.iter().any(|label| {
        let label = normalize_for_match(label);
        BUY_BUTTON_MARKERS.iter().any(|marker| label.contains(marker))
    });
    if has_buy_button {
        return Ok(true);
    }
    let norm = normalize_for_match(text);
    Ok(!UNAVAILABLE_MARKERS.iter().any(|marker| norm.contains(marker)))
}

/// Seller name from a "Vendido por ..." line.
fn seller_from_text(text: &str) -> Option<&str> {
    text.lines()
        .filter(|line| line.contains("Vendido por") || line.contains("Vendido e entregue por"))
        .find_map(|line| line.split_once(" por").map(|(_, rest)| rest.trim()))
        .filter(|seller| !seller.is_empty())
}

fn non_empty_object(value: Value) -> Option<Value> {
    value
        .as_object()
        .is_some_and(|map| !map.is_empty())
        .then_some(value)
}

async fn page_state<P: PageSession>(page: &mut P) -> Option<Value> {
    for global in ["__PRELOADED_STATE__", "__APOLLO_STATE__"] {
        let script = format!("return window.{global} || null;");
        match page.evaluate_script(&script).await {
            Ok(value) => {
                if let Some(state) = non_empty_object(value) {
                    tracing::debug!(source = global, "mercadolivre state found");
                    return Some(state);
                }
            }
            Err(e) => tracing::debug!(source = global, error = %e, "state global unavailable"),
        }
    }

    let html = page.page_source().await.ok()?;
    json_script_blocks(&html, MIN_STATE_BLOCK_LEN)
        .into_iter()
        .take(STATE_BLOCK_CANDIDATES)
        .find_map(|block| serde_json::from_str::<Value>(block).ok().and_then(non_empty_object))
}

async fn dom_fields<P: PageSession>(page: &mut P) -> Result<PriceFields, ScraperError> {
    let mut avista = None;
    for selector in CASH_SELECTORS {
        avista = first_price_in(&page.element_texts(selector).await?);
        if avista.is_some() {
            break;
        }
    }

    let mut prazo = None;
    for selector in INSTALLMENT_SELECTORS {
        prazo = page
            .element_texts(selector)
            .await?
            .iter()
            .find_map(|text| find_installment(text));
        if prazo.is_some() {
            break;
        }
    }

    Ok(PriceFields {
        avista,
        pix: None,
        prazo,
    })
}

pub(super) async fn collect<P: PageSession>(
    page: &mut P,
    url: &str,
    settings: &CollectorSettings,
) -> Result<PriceRecord, ScraperError> {
    if !url.to_lowercase().contains(MARKETPLACE_HOST) {
        return Ok(PriceRecord::empty(Status::InvalidLink));
    }

    load_page(page, url, &Readiness::DocumentReady, settings).await?;

    let text = page.visible_text().await?;
    if login_wall(&text) {
        return Ok(PriceRecord::empty(Status::LoginRequired));
    }

    if let Some(seller) = seller_from_text(&text) {
        tracing::info!(url, seller, "mercadolivre seller");
    }

    match page_state(page).await {
        Some(state) => {
            if unavailable_by_state(&state) {
                return Ok(PriceRecord::empty(Status::ProductUnavailable));
            }
            let fields = MercadoLivreState.extract(&state);
            if fields.is_usable() {
                return Ok(fields.into_record(Status::DataUnavailable));
            }
        }
        None => {
            if !available_by_markup(page, &text).await? {
                return Ok(PriceRecord::empty(Status::ProductUnavailable));
            }
        }
    }

    Ok(dom_fields(page).await?.into_record(Status::DataUnavailable))
}
