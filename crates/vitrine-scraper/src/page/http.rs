//! Static-HTML page session: fetches markup over HTTP and answers selector
//! and text queries with `scraper`. No JavaScript runs, so script
//! evaluation and screenshots are reported as unsupported.

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use serde_json::Value;

use super::{PageSession, Readiness};
use crate::error::{PageError, ScraperError};

/// Elements whose boundaries start a new visual line.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr",
    "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td", "th", "thead", "tr",
    "ul",
];

/// Elements whose content never renders as text.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];

pub struct HttpPage {
    /// `None` for pages built from a fixed document.
    client: Option<Client>,
    url: Option<String>,
    html: Option<String>,
}

impl HttpPage {
    /// Builds a session that fetches pages with a fresh, cookie-less client,
    /// so nothing carries over from one product lookup to the next.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(user_agent: &str, connect_timeout: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client: Some(client),
            url: None,
            html: None,
        })
    }

    /// A session holding a fixed document; `navigate` is unsupported.
    #[must_use]
    pub fn from_html(url: &str, html: impl Into<String>) -> Self {
        Self {
            client: None,
            url: Some(url.to_owned()),
            html: Some(html.into()),
        }
    }

    fn document(&self) -> Result<Html, PageError> {
        self.html
            .as_deref()
            .map(Html::parse_document)
            .ok_or(PageError::NoDocument)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, PageError> {
    Selector::parse(selector).map_err(|_| PageError::Selector {
        selector: selector.to_owned(),
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn push_rendered_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => {
                let name = el.name();
                if HIDDEN_ELEMENTS.contains(&name) {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push('\n');
                }
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_rendered_text(child_el, out);
                }
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Renders `document` roughly the way a browser's `innerText` would: block
/// elements break lines, hidden elements are dropped, whitespace collapses.
pub(crate) fn rendered_text(document: &Html) -> String {
    let body = parse_selector("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    push_rendered_text(body, &mut raw);

    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

impl PageSession for HttpPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), PageError> {
        let Some(client) = &self.client else {
            return Err(PageError::Unsupported("navigation"));
        };

        let request = client
            .get(url)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8",
            )
            .header(reqwest::header::ACCEPT_LANGUAGE, "pt-BR,pt;q=0.9")
            .header(reqwest::header::CACHE_CONTROL, "no-cache");

        let fetch = async {
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                tracing::warn!(url, status = status.as_u16(), "page answered with non-2xx status");
            }
            response.text().await
        };

        let body = tokio::time::timeout(timeout, fetch)
            .await
            .map_err(|_| PageError::Timeout {
                url: url.to_owned(),
                timeout_secs: timeout.as_secs(),
            })?
            .map_err(|e| PageError::Navigation {
                url: url.to_owned(),
                reason: e.to_string(),
            })?;

        self.url = Some(url.to_owned());
        self.html = Some(body);
        Ok(())
    }

    async fn wait_for_ready(&mut self, readiness: &Readiness, _timeout: Duration) -> bool {
        // A fetched document never changes, so the condition is checked once.
        let Ok(document) = self.document() else {
            return false;
        };
        match readiness {
            Readiness::DocumentReady => true,
            Readiness::Selector(selector) => parse_selector(selector)
                .is_ok_and(|sel| document.select(&sel).next().is_some()),
            Readiness::NonEmptyText(selector) => parse_selector(selector).is_ok_and(|sel| {
                document
                    .select(&sel)
                    .any(|el| el.text().any(|t| !t.trim().is_empty()))
            }),
        }
    }

    async fn visible_text(&mut self) -> Result<String, PageError> {
        let document = self.document()?;
        Ok(rendered_text(&document))
    }

    async fn element_texts(&mut self, selector: &str) -> Result<Vec<String>, PageError> {
        let document = self.document()?;
        let sel = parse_selector(selector)?;
        Ok(document
            .select(&sel)
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .collect())
    }

    async fn attribute(
        &mut self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        let document = self.document()?;
        let sel = parse_selector(selector)?;
        Ok(document.select(&sel).next().and_then(|el| {
            if name == "textContent" {
                Some(el.text().collect::<String>())
            } else {
                el.value().attr(name).map(str::to_owned)
            }
        }))
    }

    async fn evaluate_script(&mut self, _script: &str) -> Result<Value, PageError> {
        Err(PageError::Unsupported("script evaluation"))
    }

    async fn page_source(&mut self) -> Result<String, PageError> {
        self.html.clone().ok_or(PageError::NoDocument)
    }

    async fn screenshot(&mut self, _path: &Path) -> Result<(), PageError> {
        Err(PageError::Unsupported("screenshots"))
    }

    fn current_url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}
