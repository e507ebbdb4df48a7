//! The page/session capability collectors navigate with.
//!
//! Collectors are generic over [`PageSession`]; the workspace ships
//! [`HttpPage`], a static-HTML implementation, and tests use an in-memory
//! fake. A headless-browser session plugs in by implementing the same trait.

mod http;

use std::path::Path;
use std::time::Duration;

use serde_json::Value;

use crate::error::PageError;

pub use http::HttpPage;

/// Condition a page must satisfy before extraction starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// The document has finished loading.
    DocumentReady,
    /// At least one element matches the CSS selector.
    Selector(&'static str),
    /// An element matching the CSS selector has non-blank text.
    NonEmptyText(&'static str),
}

/// A navigable page handle. One session is reused across rows, strictly
/// sequentially.
#[allow(async_fn_in_trait)]
pub trait PageSession {
    /// Loads `url`, replacing the current document.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), PageError>;

    /// Waits up to `timeout` for `readiness`. Returns `false` on timeout;
    /// never fails, so callers carry on with whatever content is present.
    async fn wait_for_ready(&mut self, readiness: &Readiness, timeout: Duration) -> bool;

    /// Rendered text of the page body, one visual line per line.
    async fn visible_text(&mut self) -> Result<String, PageError>;

    /// Text of every element matching `selector`, in document order.
    async fn element_texts(&mut self, selector: &str) -> Result<Vec<String>, PageError>;

    /// Attribute `name` of the first element matching `selector`.
    ///
    /// `"textContent"` reads the element's raw text, scripts included.
    async fn attribute(&mut self, selector: &str, name: &str)
        -> Result<Option<String>, PageError>;

    /// Evaluates a script expression and returns its JSON result.
    async fn evaluate_script(&mut self, script: &str) -> Result<Value, PageError>;

    /// Full document markup.
    async fn page_source(&mut self) -> Result<String, PageError>;

    async fn screenshot(&mut self, path: &Path) -> Result<(), PageError>;

    /// URL of the loaded document, if any.
    fn current_url(&self) -> Option<&str>;
}
