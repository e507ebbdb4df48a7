use serde::Serialize;

use crate::record::PriceRecord;

/// One input line: a product id, an optional title, and the product link.
///
/// `link` is empty when the source row had no usable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: String,
    pub title: Option<String>,
    pub link: String,
}

/// One output line, in the column order of the results sheet.
#[derive(Debug, Clone, Serialize)]
pub struct OutputRow {
    pub id_produto: String,
    pub titulo: Option<String>,
    pub avista: Option<String>,
    pub pix: Option<String>,
    pub prazo: Option<String>,
    pub status: String,
    pub link: String,
}

impl OutputRow {
    #[must_use]
    pub fn new(row: &ProductRow, record: &PriceRecord) -> Self {
        Self {
            id_produto: row.id.clone(),
            titulo: row.title.clone(),
            avista: record.avista.as_ref().map(ToString::to_string),
            pix: record.pix.as_ref().map(ToString::to_string),
            prazo: record.prazo.as_ref().map(ToString::to_string),
            status: record.status.to_string(),
            link: row.link.clone(),
        }
    }
}
