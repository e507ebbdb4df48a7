//! Probel storefront.

use vitrine_core::{PriceRecord, Status};

use super::{load_page, scroll_to_bottom, CollectorSettings, PriceFields};
use crate::error::ScraperError;
use crate::money::first_plausible_money;
use crate::page::{PageSession, Readiness};
use crate::text::{find_installment, money_before_pix};

fn fields_from_text(text: &str) -> PriceFields {
    let pix = money_before_pix(text);
    let avista = pix.clone().or_else(|| first_plausible_money(text));
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
    Ok(fields_from_text(&text).into_record(Status::DataUnavailable))
}
