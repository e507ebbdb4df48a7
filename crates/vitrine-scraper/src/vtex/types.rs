//! VTEX storefront API response types.
//!
//! ## Observed shape (webcontinental.com.br)
//!
//! ### Catalog search
//! `GET /api/catalog_system/pub/products/search/{slug}/p` returns a JSON
//! **array** of products, empty when the slug is unknown. Each product holds
//! `items` (SKUs); each item holds `sellers`; each seller holds the offer
//! under the misspelled key `commertialOffer`.
//!
//! ### Offer numbers
//! `Price` and the installment `Value` are reais as JSON floats.
//! `InterestRate` is `0` for interest-free plans. Offer fields are kept as raw
//! [`Value`]s so one malformed entry does not sink the whole payload.
//!
//! ### Checkout simulation
//! `paymentData.installmentOptions[].installments[].value` is in **cents**
//! (integer). Options are named by `paymentName` (e.g. `"Pix"`,
//! `"Boleto Bancário"`), with `paymentSystemName` as an older alias.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct CatalogProduct {
    #[serde(rename = "productName", default)]
    pub product_name: Option<String>,

    #[serde(default)]
    pub items: Option<Vec<CatalogItem>>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "itemId", default)]
    pub item_id: Option<Value>,

    #[serde(default)]
    pub sellers: Option<Vec<CatalogSeller>>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogSeller {
    #[serde(rename = "sellerId", default)]
    pub seller_id: Option<Value>,

    #[serde(rename = "commertialOffer", default)]
    pub commertial_offer: Option<CommercialOffer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommercialOffer {
    #[serde(rename = "Price", default)]
    pub price: Option<Value>,

    #[serde(rename = "Installments", default)]
    pub installments: Option<Value>,
}

impl CommercialOffer {
    /// `true` when the offer carries neither a price nor installments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.price.as_ref().is_none_or(Value::is_null)
            && self.installments.as_ref().is_none_or(Value::is_null)
    }
}

/// The SKU/seller pair a catalog search resolved to.
#[derive(Debug, Clone)]
pub struct VtexProduct {
    pub name: Option<String>,
    pub sku_id: String,
    pub seller_id: String,
    pub offer: CommercialOffer,
}

#[derive(Debug, Serialize)]
pub struct SimulationRequest<'a> {
    pub items: [SimulationItem<'a>; 1],
    pub country: &'a str,
    #[serde(rename = "postalCode")]
    pub postal_code: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SimulationItem<'a> {
    pub id: &'a str,
    pub quantity: u32,
    pub seller: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub struct SimulationResponse {
    #[serde(rename = "paymentData", default)]
    pub payment_data: Option<PaymentData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentData {
    #[serde(rename = "installmentOptions", default)]
    pub installment_options: Option<Vec<InstallmentOption>>,
}

#[derive(Debug, Deserialize)]
pub struct InstallmentOption {
    #[serde(rename = "paymentName", default)]
    pub payment_name: Option<String>,

    #[serde(rename = "paymentSystemName", default)]
    pub payment_system_name: Option<String>,

    #[serde(default)]
    pub installments: Option<Vec<SimulatedInstallment>>,
}

#[derive(Debug, Deserialize)]
pub struct SimulatedInstallment {
    /// Per-installment value in cents.
    #[serde(default)]
    pub value: Option<Value>,
}

/// Reads an id the API may send as a string or a number.
pub(crate) fn id_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
