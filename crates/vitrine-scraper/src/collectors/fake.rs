//! In-memory [`PageSession`] for collector tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;

use crate::error::PageError;
use crate::page::{HttpPage, PageSession, Readiness};

/// Serves one fixed document for every navigation. Script results are
/// looked up by a fragment of the script text; unknown scripts are
/// unsupported, as on a static page.
pub(crate) struct FakePage {
    html: String,
    scripts: Vec<(&'static str, Value)>,
    fail_navigation: bool,
    current: Option<HttpPage>,
    pub navigations: Vec<String>,
    pub screenshots: Vec<PathBuf>,
}

impl FakePage {
    pub(crate) fn new(html: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            scripts: Vec::new(),
            fail_navigation: false,
            current: None,
            navigations: Vec::new(),
            screenshots: Vec::new(),
        }
    }

    pub(crate) fn with_script(mut self, fragment: &'static str, result: Value) -> Self {
        self.scripts.push((fragment, result));
        self
    }

    pub(crate) fn failing_navigation(mut self) -> Self {
        self.fail_navigation = true;
        self
    }

    fn loaded(&mut self) -> Result<&mut HttpPage, PageError> {
        self.current.as_mut().ok_or(PageError::NoDocument)
    }
}

impl PageSession for FakePage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), PageError> {
        self.navigations.push(url.to_owned());
        if self.fail_navigation {
            return Err(PageError::Timeout {
                url: url.to_owned(),
                timeout_secs: timeout.as_secs(),
            });
        }
        self.current = Some(HttpPage::from_html(url, self.html.clone()));
        Ok(())
    }

    async fn wait_for_ready(&mut self, readiness: &Readiness, timeout: Duration) -> bool {
        match self.current.as_mut() {
            Some(page) => page.wait_for_ready(readiness, timeout).await,
            None => false,
        }
    }

    async fn visible_text(&mut self) -> Result<String, PageError> {
        self.loaded()?.visible_text().await
    }

    async fn element_texts(&mut self, selector: &str) -> Result<Vec<String>, PageError> {
        self.loaded()?.element_texts(selector).await
    }

    async fn attribute(
        &mut self,
        selector: &str,
        name: &str,
    ) -> Result<Option<String>, PageError> {
        self.loaded()?.attribute(selector, name).await
    }

    async fn evaluate_script(&mut self, script: &str) -> Result<Value, PageError> {
        self.scripts
            .iter()
            .find(|(fragment, _)| script.contains(fragment))
            .map(|(_, result)| result.clone())
            .ok_or(PageError::Unsupported("script evaluation"))
    }

    async fn page_source(&mut self) -> Result<String, PageError> {
        self.loaded()?.page_source().await
    }

    async fn screenshot(&mut self, path: &Path) -> Result<(), PageError> {
        self.screenshots.push(path.to_path_buf());
        Ok(())
    }

    fn current_url(&self) -> Option<&str> {
        self.current.as_ref().and_then(PageSession::current_url)
    }
}
