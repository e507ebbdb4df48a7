//! MadeiraMadeira, read from the rendered page text.

use vitrine_core::{PriceRecord, Status};

use super::{load_page, scroll_to_bottom, CollectorSettings, PriceFields};
use crate::error::ScraperError;
use crate::money::first_plausible_money;
use crate::page::{PageSession, Readiness};
use crate::text::{find_installment, money_near_keyword, PriceContext};

/// Splits the page text into the three fields.
///
/// A price next to a Pix line is both the cash and the Pix price; a price
/// next to an "à vista" line is only the cash price. Without either, the
/// first plausible money literal is the cash price.
fn fields_from_text(text: &str) -> PriceFields {
    let (avista, pix) = match money_near_keyword(text) {
        Some(found) if found.context == PriceContext::Pix => {
            (Some(found.money.clone()), Some(found.money))
        }
        Some(found) => (Some(found.money), None),
        None => (first_plausible_money(text), None),
    };
    PriceFields {
        avista,
        pix,
        prazo: find_installment(text),
    }
}

pub(super) async fn collect<P: PageSession>(
    page: &mut P,
    url: &str,
    settings: &CollectorSettings,
) -> Result<PriceRecord, ScraperError> {
    load_page(page, url, &Readiness::NonEmptyText("body"), settings).await?;
    scroll_to_bottom(page).await;

    let text = page.visible_text().await?;
    let fields = fields_from_text(&text);
    tracing::debug!(
        url,
        avista = fields.avista.is_some(),
        pix = fields.pix.is_some(),
        prazo = fields.prazo.is_some(),
        "madeiramadeira text scan"
    );
    Ok(fields.into_record(Status::CollectionError))
}
