//! Product URL parsing for VTEX storefronts.

use crate::error::ScraperError;

/// Splits a VTEX product URL into its store origin and product slug.
///
/// Given `"https://www.webcontinental.com.br/geladeira-x/p?skuId=1"`, returns
/// `("https://www.webcontinental.com.br", "geladeira-x")`. Paths without the
/// `/p` suffix fall back to their first segment.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidProductUrl`] when the URL has no scheme or
/// host, or its path is empty.
pub fn parse_product_url(product_url: &str) -> Result<(String, String), ScraperError> {
    let invalid = |reason: &str| ScraperError::InvalidProductUrl {
        url: product_url.to_owned(),
        reason: reason.to_owned(),
    };

    let url = reqwest::Url::parse(product_url.trim()).map_err(|e| invalid(&e.to_string()))?;
    if url.host_str().is_none() || !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("not an http(s) URL with a host"));
    }

    let origin = url.origin().ascii_serialization();
    let path = url.path().trim_matches('/');

    if let Some(slug) = path.strip_suffix("/p").filter(|s| !s.is_empty()) {
        return Ok((origin, slug.to_owned()));
    }

    path.split('/')
        .find(|segment| !segment.is_empty())
        .map(|first| (origin, first.to_owned()))
        .ok_or_else(|| invalid("no product slug in path"))
}

/// Extracts the hostname from a URL for use in error messages.
///
/// Falls back to the full URL string if parsing fails.
pub(super) fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| url.to_owned())
}
