//! Maps a product link to the retailer that knows how to read it.

use crate::collectors::Retailer;

/// Keyword → retailer, checked in order against the lower-cased link.
const RETAILER_KEYWORDS: [(&str, Retailer); 7] = [
    ("magazineluiza.com.br", Retailer::Magalu),
    ("magalu", Retailer::Magalu),
    ("mercadolivre.com.br", Retailer::MercadoLivre),
    ("webcontinental", Retailer::WebContinental),
    ("zema.com", Retailer::Zema),
    ("madeiramadeira", Retailer::MadeiraMadeira),
    ("probel", Retailer::Probel),
];

/// Returns the retailer for `url`, or `None` for unsupported channels.
#[must_use]
pub fn resolve(url: &str) -> Option<Retailer> {
    let url = url.trim().to_lowercase();
    if url.is_empty() {
        return None;
    }
    RETAILER_KEYWORDS
        .iter()
        .find(|(keyword, _)| url.contains(keyword))
        .map(|(_, retailer)| *retailer)
}
