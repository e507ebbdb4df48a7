//! Web Continental, read through its VTEX storefront APIs.

use vitrine_core::{PriceRecord, Status};

use super::{CollectorSettings, PriceFields};
use crate::error::ScraperError;
use crate::vtex::{
    best_installment, cash_price, parse_product_url, pix_from_simulation, VtexClient,
};

pub(super) async fn collect(
    url: &str,
    settings: &CollectorSettings,
) -> Result<PriceRecord, ScraperError> {
    let (origin, slug) = match parse_product_url(url) {
        Ok(parts) => parts,
        Err(e @ ScraperError::InvalidProductUrl { .. }) => {
            tracing::warn!(url, error = %e, "not a VTEX product link");
            return Ok(PriceRecord::empty(Status::InvalidLink));
        }
        Err(e) => return Err(e),
    };

    let client = VtexClient::new(
        settings.http_connect_timeout,
        settings.http_read_timeout,
        &settings.user_agent,
        settings.max_retries,
        settings.retry_backoff_base_secs,
    )?;

    // The storefront answering without a usable offer means the price is not
    // available; only transport failures are faults.
    let product = match client.fetch_product_by_slug(&origin, &slug).await {
        Ok(product) => product,
        Err(e @ ScraperError::Http(_)) => return Err(e),
        Err(e) => {
            tracing::warn!(url, category = e.category(), error = %e, "catalog lookup gave no offer");
            return Ok(PriceRecord::empty(Status::DataUnavailable));
        }
    };
    tracing::debug!(
        url,
        sku_id = %product.sku_id,
        name = product.name.as_deref().unwrap_or(""),
        "catalog product resolved"
    );
    let avista = cash_price(&product.offer);
    let prazo = best_installment(&product.offer);

    let pix = match client
        .simulate_checkout(&origin, &product.sku_id, &product.seller_id, 1, &settings.postal_code)
        .await
    {
        Ok(simulation) => pix_from_simulation(&simulation),
        Err(e) => {
            tracing::warn!(url, sku_id = %product.sku_id, error = %e, "checkout simulation failed, leaving pix empty");
            None
        }
    };

    Ok(PriceFields { avista, pix, prazo }.into_record(Status::DataUnavailable))
}
