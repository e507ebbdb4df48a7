//! Debug snapshots written when a collector comes back empty-handed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What a collector saw when extraction failed.
#[derive(Debug, Clone, Copy)]
pub struct PageSnapshot<'a> {
    pub retailer: &'a str,
    pub reason: &'a str,
    pub url: &'a str,
    pub html: Option<&'a str>,
}

/// Destination for [`PageSnapshot`]s.
pub trait DiagnosticsSink {
    /// Persists the snapshot. Returns the path a screenshot should be saved
    /// to, or `None` when the sink does not want one.
    ///
    /// # Errors
    ///
    /// Returns any I/O error hit while writing the snapshot files.
    fn capture(&self, snapshot: &PageSnapshot<'_>) -> io::Result<Option<PathBuf>>;
}

/// Discards every snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagnostics;

impl DiagnosticsSink for NoDiagnostics {
    fn capture(&self, _snapshot: &PageSnapshot<'_>) -> io::Result<Option<PathBuf>> {
        Ok(None)
    }
}

/// Writes `<root>/<retailer>/<timestamp>_info.txt` and `<timestamp>.html`,
/// and asks for `<timestamp>.png`.
#[derive(Debug, Clone)]
pub struct FsDiagnostics {
    root: PathBuf,
}

impl FsDiagnostics {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DiagnosticsSink for FsDiagnostics {
    fn capture(&self, snapshot: &PageSnapshot<'_>) -> io::Result<Option<PathBuf>> {
        let dir = self.root.join(snapshot.retailer);
        fs::create_dir_all(&dir)?;

        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let info = format!(
            "reason: {}\nurl: {}\nretailer: {}\n",
            snapshot.reason, snapshot.url, snapshot.retailer
        );
        fs::write(dir.join(format!("{stamp}_info.txt")), info)?;
        if let Some(html) = snapshot.html {
            fs::write(dir.join(format!("{stamp}.html")), html)?;
        }

        tracing::debug!(
            retailer = snapshot.retailer,
            dir = %dir.display(),
            stamp,
            "debug snapshot written"
        );
        Ok(Some(dir.join(format!("{stamp}.png"))))
    }
}
