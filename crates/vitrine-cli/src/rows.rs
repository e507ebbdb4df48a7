//! CSV row source and sink.
//!
//! Input columns are located by header name; the output always uses the
//! fixed results header.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::Context;
use regex::Regex;
use vitrine_core::{OutputRow, ProductRow};

const ID_HEADERS: [&str; 8] = [
    "id_produto",
    "produto",
    "id",
    "sku",
    "codigo",
    "codigo_produto",
    "código",
    "product_id",
];
const TITLE_HEADERS: [&str; 5] = ["titulo", "título", "nome", "descricao", "descrição"];
const LINK_HEADERS: [&str; 3] = ["link", "url", "href"];

pub(crate) const OUTPUT_HEADER: [&str; 7] =
    ["id_produto", "titulo", "avista", "pix", "prazo", "status", "link"];

static HYPERLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*=\s*HYPERLINK\(\s*"([^"]+)""#).expect("valid hyperlink regex")
});

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    id: usize,
    title: Option<usize>,
    link: usize,
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers.iter().position(|h| names.contains(&h.as_str()))
}

/// Returns the URL held by a cell: a plain `http(s)` value or the target of
/// a `=HYPERLINK("...")` formula.
pub(crate) fn cell_url(cell: &str) -> Option<String> {
    let cell = cell.trim();
    if let Some(cap) = HYPERLINK_RE.captures(cell) {
        return cap.get(1).map(|m| m.as_str().trim().to_owned());
    }
    let lower = cell.to_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")).then(|| cell.to_owned())
}

/// `;` when the header line has more semicolons than commas, else `,`.
fn sniff_delimiter(text: &str) -> u8 {
    let first_line = text.lines().next().unwrap_or_default();
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

fn resolve_columns(headers: &[String], first_row: Option<&csv::StringRecord>) -> Option<Columns> {
    let link = find_column(headers, &LINK_HEADERS).or_else(|| {
        let row = first_row?;
        row.iter().position(|cell| cell_url(cell).is_some())
    })?;
    Some(Columns {
        id: find_column(headers, &ID_HEADERS).unwrap_or(0),
        title: find_column(headers, &TITLE_HEADERS),
        link,
    })
}

/// Parses product rows out of CSV text.
///
/// # Errors
///
/// Returns an error when the CSV is malformed or no link column can be found.
pub(crate) fn parse_rows(text: &str) -> anyhow::Result<Vec<ProductRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(text))
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("failed to read CSV header")?
        .iter()
        .map(normalize_header)
        .collect();

    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .context("failed to read CSV rows")?;

    let columns = resolve_columns(&headers, records.first())
        .context("could not locate the link column (expected link, url or href)")?;
    tracing::debug!(?columns, rows = records.len(), "input columns resolved");

    Ok(records
        .iter()
        .map(|record| {
            let cell = |idx: usize| record.get(idx).map(str::trim).unwrap_or_default();
            ProductRow {
                id: cell(columns.id).to_owned(),
                title: columns
                    .title
                    .map(cell)
                    .filter(|t| !t.is_empty())
                    .map(str::to_owned),
                link: cell_url(cell(columns.link)).unwrap_or_default(),
            }
        })
        .collect())
}

/// Reads product rows from the CSV file at `path`.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed.
pub(crate) fn read_rows(path: &Path) -> anyhow::Result<Vec<ProductRow>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    parse_rows(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Writes the results sheet, header first, to `writer`.
///
/// # Errors
///
/// Returns an error when a row cannot be serialized or written.
pub(crate) fn write_rows<W: std::io::Write>(writer: W, rows: &[OutputRow]) -> anyhow::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(OUTPUT_HEADER)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes the results sheet to the file at `path`.
///
/// # Errors
///
/// Returns an error when the file cannot be created or written.
pub(crate) fn write_output(path: &Path, rows: &[OutputRow]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    write_rows(file, rows).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use vitrine_core::{Money, PriceRecord, Status};

    use super::*;

    #[test]
    fn reads_named_columns() {
        let csv = "Código,Título,Link\n\
                   101,Colchão Casal,https://www.probel.com.br/colchao/p\n\
                   102,,\n";
        let rows = parse_rows(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "101");
        assert_eq!(rows[0].title.as_deref(), Some("Colchão Casal"));
        assert_eq!(rows[0].link, "https://www.probel.com.br/colchao/p");
        assert!(rows[1].title.is_none());
        assert!(rows[1].link.is_empty());
    }

    #[test]
    fn finds_link_column_from_first_data_row() {
        let csv = "sku;descricao;endereco\nA1;Sofá;https://www.zema.com/sofa/p\n";
        let rows = parse_rows(csv).unwrap();
        assert_eq!(rows[0].id, "A1");
        assert_eq!(rows[0].link, "https://www.zema.com/sofa/p");
    }

    #[test]
    fn unwraps_hyperlink_formulas() {
        assert_eq!(
            cell_url(r#"=HYPERLINK("https://www.magazineluiza.com.br/p/1/","ver")"#).as_deref(),
            Some("https://www.magazineluiza.com.br/p/1/")
        );
        assert!(cell_url("sem link").is_none());
    }

    #[test]
    fn id_defaults_to_first_column() {
        let csv = "ref,url\nX9,https://www.madeiramadeira.com.br/mesa.html\n";
        let rows = parse_rows(csv).unwrap();
        assert_eq!(rows[0].id, "X9");
    }

    #[test]
    fn missing_link_column_is_an_error() {
        let err = parse_rows("id,nome\n1,Mesa\n").unwrap_err();
        assert!(err.to_string().contains("link column"));
    }

    #[test]
    fn writes_results_header_and_rows() {
        let row = ProductRow {
            id: "7".to_owned(),
            title: None,
            link: "https://www.probel.com.br/x".to_owned(),
        };
        let record = PriceRecord::classified(
            Some(Money::verbatim("R$ 1.299,00")),
            None,
            None,
            Status::DataUnavailable,
        );
        let mut out = Vec::new();
        write_rows(&mut out, &[OutputRow::new(&row, &record)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "id_produto,titulo,avista,pix,prazo,status,link\n\
             7,,\"R$ 1.299,00\",,,OK_CASH_ONLY,https://www.probel.com.br/x\n"
        );
    }

    #[test]
    fn empty_results_still_have_header() {
        let mut out = Vec::new();
        write_rows(&mut out, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id_produto,titulo,avista,pix,prazo,status,link\n");
    }
}
