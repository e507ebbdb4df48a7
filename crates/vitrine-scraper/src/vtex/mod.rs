//! HTTP client for the public VTEX storefront APIs: catalog search and
//! checkout simulation.

mod offer;
mod product_url;
mod types;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::ScraperError;
use crate::rate_limit::RetryPolicy;

pub use offer::{best_installment, cash_price, pix_from_simulation};
pub use product_url::parse_product_url;
pub use types::{CommercialOffer, SimulationResponse, VtexProduct};

use types::{id_string, CatalogProduct, SimulationItem, SimulationRequest};

/// Seller id VTEX uses for the store itself.
const DEFAULT_SELLER_ID: &str = "1";

/// HTTP client for a VTEX storefront.
///
/// 429s and transport failures are retried with exponential backoff up to
/// `max_retries` additional attempts; every other non-2xx status is returned
/// as a typed error on the first try.
pub struct VtexClient {
    client: Client,
    retry: RetryPolicy,
}

impl VtexClient {
    /// Creates a `VtexClient` with the given connect/read timeouts,
    /// `User-Agent` and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        connect_timeout: Duration,
        read_timeout: Duration,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .read_timeout(read_timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            retry: RetryPolicy {
                max_retries,
                backoff_base_secs,
            },
        })
    }

    /// Looks a product up by slug and resolves its first SKU and first
    /// seller.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::RateLimited`] / [`ScraperError::Http`] after retries run out.
    /// - [`ScraperError::NotFound`] / [`ScraperError::UnexpectedStatus`] for non-2xx.
    /// - [`ScraperError::Deserialize`] when the body is not a product array.
    /// - [`ScraperError::MissingField`] when the search is empty or the first
    ///   product has no SKU, seller or commercial offer.
    pub async fn fetch_product_by_slug(
        &self,
        origin: &str,
        slug: &str,
    ) -> Result<VtexProduct, ScraperError> {
        let url = format!("{origin}/api/catalog_system/pub/products/search/{slug}/p");
        let context = format!("catalog search for {slug}");

        let products: Vec<CatalogProduct> = self
            .send_json(&url, &context, || self.client.get(&url))
            .await?;

        let missing = |field: &str| ScraperError::MissingField {
            context: context.clone(),
            field: field.to_owned(),
        };

        let product = products.into_iter().next().ok_or_else(|| missing("product"))?;
        let item = product
            .items
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| missing("items"))?;
        let sku_id = id_string(item.item_id.as_ref()).ok_or_else(|| missing("itemId"))?;
        let seller = item
            .sellers
            .and_then(|sellers| sellers.into_iter().next())
            .ok_or_else(|| missing("sellers"))?;
        let seller_id =
            id_string(seller.seller_id.as_ref()).unwrap_or_else(|| DEFAULT_SELLER_ID.to_owned());
        let offer = seller
            .commertial_offer
            .filter(|offer| !offer.is_empty())
            .ok_or_else(|| missing("commertialOffer"))?;

        tracing::debug!(slug, sku_id = %sku_id, seller_id = %seller_id, "resolved VTEX product");

        Ok(VtexProduct {
            name: product.product_name,
            sku_id,
            seller_id,
            offer,
        })
    }

    /// Simulates a checkout of `quantity` units of `sku_id` delivered to
    /// `postal_code` in Brazil.
    ///
    /// # Errors
    ///
    /// Same transport and status errors as [`Self::fetch_product_by_slug`];
    /// [`ScraperError::Deserialize`] when the body is not a simulation object.
    pub async fn simulate_checkout(
        &self,
        origin: &str,
        sku_id: &str,
        seller_id: &str,
        quantity: u32,
        postal_code: &str,
    ) -> Result<SimulationResponse, ScraperError> {
        let url = format!("{origin}/api/checkout/pub/orderForms/simulation");
        let payload = SimulationRequest {
            items: [SimulationItem {
                id: sku_id,
                quantity,
                seller: seller_id,
            }],
            country: "BRA",
            postal_code,
        };

        self.send_json(&url, &format!("checkout simulation for sku {sku_id}"), || {
            self.client.post(&url).json(&payload)
        })
        .await
    }

    async fn send_json<T, F>(&self, url: &str, context: &str, build: F) -> Result<T, ScraperError>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        self.retry.run(|| {
            let request = build().header(reqwest::header::ACCEPT, "application/json");
            async move {
                let response = request.send().await?;
                let body = check_status(response, url).await?.text().await?;
                serde_json::from_str::<T>(&body).map_err(|e| ScraperError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })
            }
        })
        .await
    }
}

async fn check_status(response: Response, url: &str) -> Result<Response, ScraperError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ScraperError::RateLimited {
            domain: product_url::extract_domain(url),
            retry_after_secs,
        });
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ScraperError::NotFound {
            url: url.to_owned(),
        });
    }

    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(response)
}
