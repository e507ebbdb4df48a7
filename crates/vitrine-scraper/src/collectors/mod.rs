//! Per-retailer collectors.
//!
//! Every collector turns one product link into one [`PriceRecord`]. The
//! [`Retailer`] facade validates the link, dispatches to the retailer
//! module, absorbs internal faults into a status and writes a debug snapshot
//! when nothing could be read.

mod madeiramadeira;
mod magalu;
mod mercadolivre;
mod probel;
mod webcontinental;
mod zema;

#[cfg(test)]
pub(crate) mod fake;

use std::time::Duration;

use serde_json::Value;
use vitrine_core::{AppConfig, Installment, Money, PriceRecord, Status};

use crate::diagnostics::{DiagnosticsSink, PageSnapshot};
use crate::error::ScraperError;
use crate::page::{PageSession, Readiness};

pub use magalu::MagaluState;
pub use mercadolivre::MercadoLivreState;

/// Reads the three pricing fields out of a retailer's embedded JSON state.
///
/// Implementations never fail: malformed or unexpected shapes yield `None`.
pub trait PriceExtractor {
    fn extract_cash(&self, state: &Value) -> Option<Money>;

    /// Only an amount the state explicitly ties to Pix; never the cash price.
    fn extract_pix(&self, state: &Value) -> Option<Money>;

    fn extract_installments(&self, state: &Value) -> Option<Installment>;

    fn extract(&self, state: &Value) -> PriceFields {
        PriceFields {
            avista: self.extract_cash(state),
            pix: self.extract_pix(state),
            prazo: self.extract_installments(state),
        }
    }
}

/// The three fields as read from a single source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceFields {
    pub avista: Option<Money>,
    pub pix: Option<Money>,
    pub prazo: Option<Installment>,
}

impl PriceFields {
    /// A source is usable when it produced a cash price or an installment
    /// plan; a lone Pix amount does not stop the cascade.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.avista.is_some() || self.prazo.is_some()
    }

    #[must_use]
    pub fn into_record(self, on_missing: Status) -> PriceRecord {
        PriceRecord::classified(self.avista, self.pix, self.prazo, on_missing)
    }
}

/// Timeouts and HTTP identity used by every collector.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub page_load_timeout: Duration,
    pub ready_timeout: Duration,
    pub http_connect_timeout: Duration,
    pub http_read_timeout: Duration,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    pub postal_code: String,
}

impl From<&AppConfig> for CollectorSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            page_load_timeout: Duration::from_secs(config.page_load_timeout_secs),
            ready_timeout: Duration::from_secs(config.ready_timeout_secs),
            http_connect_timeout: Duration::from_secs(config.http_connect_timeout_secs),
            http_read_timeout: Duration::from_secs(config.http_read_timeout_secs),
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            retry_backoff_base_secs: config.retry_backoff_base_secs,
            postal_code: config.postal_code.clone(),
        }
    }
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            page_load_timeout: Duration::from_secs(25),
            ready_timeout: Duration::from_secs(15),
            http_connect_timeout: Duration::from_secs(8),
            http_read_timeout: Duration::from_secs(20),
            user_agent: vitrine_core::config::DEFAULT_USER_AGENT.to_owned(),
            max_retries: 2,
            retry_backoff_base_secs: 1,
            postal_code: "01001000".to_owned(),
        }
    }
}

/// What a collector needs besides the page: settings and a snapshot sink.
pub struct CollectContext<'a> {
    pub settings: &'a CollectorSettings,
    pub diagnostics: &'a dyn DiagnosticsSink,
}

/// The supported retail channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Retailer {
    Magalu,
    MercadoLivre,
    WebContinental,
    Zema,
    MadeiraMadeira,
    Probel,
}

impl Retailer {
    /// Short identifier used in logs and snapshot directories.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Retailer::Magalu => "magalu",
            Retailer::MercadoLivre => "mercadolivre",
            Retailer::WebContinental => "webcontinental",
            Retailer::Zema => "zema",
            Retailer::MadeiraMadeira => "madeiramadeira",
            Retailer::Probel => "probel",
        }
    }

    /// Status used when no cash price was found.
    #[must_use]
    pub fn on_missing(self) -> Status {
        match self {
            Retailer::MadeiraMadeira => Status::CollectionError,
            _ => Status::DataUnavailable,
        }
    }

    /// `false` for retailers read entirely through their platform API.
    fn uses_page(self) -> bool {
        !matches!(self, Retailer::WebContinental)
    }

    /// Collects one product link. Never fails: every problem becomes a
    /// status on the returned record.
    pub async fn collect<P: PageSession>(
        self,
        page: &mut P,
        url: &str,
        ctx: &CollectContext<'_>,
    ) -> PriceRecord {
        let url = url.trim();
        if url.is_empty() {
            return PriceRecord::empty(Status::LinkMissing);
        }

        let outcome = match self {
            Retailer::Magalu => magalu::collect(page, url, ctx.settings).await,
            Retailer::MercadoLivre => mercadolivre::collect(page, url, ctx.settings).await,
            Retailer::WebContinental => webcontinental::collect(url, ctx.settings).await,
            Retailer::Zema => zema::collect(page, url, ctx.settings).await,
            Retailer::MadeiraMadeira => madeiramadeira::collect(page, url, ctx.settings).await,
            Retailer::Probel => probel::collect(page, url, ctx.settings).await,
        };

        let record = outcome.unwrap_or_else(|e| {
            tracing::warn!(
                retailer = self.name(),
                url,
                category = e.category(),
                error = %e,
                "collector failed"
            );
            PriceRecord::fault(e.category(), e.to_string())
        });

        if record.status == Status::DataUnavailable && self.uses_page() {
            save_snapshot(page, self.name(), url, "price not available", ctx.diagnostics).await;
        }

        tracing::debug!(retailer = self.name(), url, status = %record.status, "collection finished");
        record
    }
}

/// Navigates to `url` and waits softly for `readiness`.
async fn load_page<P: PageSession>(
    page: &mut P,
    url: &str,
    readiness: &Readiness,
    settings: &CollectorSettings,
) -> Result<(), ScraperError> {
    page.navigate(url, settings.page_load_timeout).await?;
    if !page.wait_for_ready(readiness, settings.ready_timeout).await {
        tracing::warn!(url, ?readiness, "page not ready before timeout, reading what is there");
    }
    Ok(())
}

/// Scrolls to the bottom so lazily rendered price blocks exist. Sessions
/// without script support skip this.
async fn scroll_to_bottom<P: PageSession>(page: &mut P) {
    if let Err(e) = page
        .evaluate_script("window.scrollTo(0, document.body.scrollHeight);")
        .await
    {
        tracing::debug!(error = %e, "scroll skipped");
    }
}

/// Raw text of an embedded JSON script, parsed. Missing or malformed
/// payloads yield `None`.
async fn embedded_json<P: PageSession>(page: &mut P, selector: &str) -> Option<Value> {
    let raw = page.attribute(selector, "textContent").await.ok().flatten()?;
    match serde_json::from_str::<Value>(raw.trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(selector, error = %e, "embedded JSON did not parse");
            None
        }
    }
}

async fn save_snapshot<P: PageSession>(
    page: &mut P,
    retailer: &str,
    url: &str,
    reason: &str,
    sink: &dyn DiagnosticsSink,
) {
    let html = page.page_source().await.ok();
    let landed = page.current_url().unwrap_or(url).to_owned();
    let snapshot = PageSnapshot {
        retailer,
        reason,
        url: &landed,
        html: html.as_deref(),
    };
    match sink.capture(&snapshot) {
        Ok(Some(png)) => {
            if let Err(e) = page.screenshot(&png).await {
                tracing::debug!(retailer, error = %e, "screenshot skipped");
            }
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(retailer, url, error = %e, "could not write debug snapshot"),
    }
}
