//! Zema.
//!
//! Each field has its own source: the cash price comes from JSON-LD, then
//! `__NEXT_DATA__`, then price elements; Pix and the installment plan come
//! from the rendered text.

use vitrine_core::{PriceRecord, Status};

use super::{embedded_json, load_page, scroll_to_bottom, CollectorSettings, PriceFields};
use crate::embedded::jsonld_offer_price;
use crate::error::ScraperError;
use crate::page::{PageSession, Readiness};
use crate::text::{find_installment, first_price_in, money_before_pix};
use crate::tree::first_money_string;

const PRICE_ELEMENTS: &str = ".price, .product-price, [class*='price']";

pub(super) async fn collect<P: PageSession>(
    page: &mut P,
    url: &str,
    settings: &CollectorSettings,
) -> Result<PriceRecord, ScraperError> {
    load_page(page, url, &Readiness::Selector("body"), settings).await?;
    scroll_to_bottom(page).await;

    let html = page.page_source().await?;
    let mut avista = jsonld_offer_price(&html);
    if avista.is_none() {
        avista = embedded_json(page, "#__NEXT_DATA__")
            .await
            .and_then(|state| first_money_string(&state));
    }
    if avista.is_none() {
        avista = first_price_in(&page.element_texts(PRICE_ELEMENTS).await?);
    }

    let text = page.visible_text().await?;
    let fields = PriceFields {
        avista,
        pix: money_before_pix(&text),
        prazo: find_installment(&text),
    };
    Ok(fields.into_record(Status::DataUnavailable))
}
