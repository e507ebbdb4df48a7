//! Sequential per-row collection driver.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use vitrine_core::{OutputRow, PriceRecord, ProductRow, Status};
use vitrine_scraper::{resolve, CollectContext, PageSession};

/// Which rows a run processes.
#[derive(Debug, Default, Clone)]
pub(crate) struct RunFilter {
    pub limit: Option<usize>,
    pub only_ids: Option<HashSet<String>>,
}

impl RunFilter {
    pub(crate) fn is_active(&self) -> bool {
        self.limit.is_some() || self.only_ids.is_some()
    }

    fn wants(&self, row: &ProductRow) -> bool {
        self.only_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(row.id.trim()))
    }
}

/// Output rows of a run plus how many of them collected a cash price.
#[derive(Debug, Default)]
pub(crate) struct RunReport {
    pub rows: Vec<OutputRow>,
    pub succeeded: usize,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

/// Collects one row. Never fails: a panic inside a collector becomes a
/// fault status on that row alone.
pub(crate) async fn collect_row<P: PageSession>(
    page: &mut P,
    row: &ProductRow,
    ctx: &CollectContext<'_>,
) -> PriceRecord {
    let link = row.link.trim();
    if link.is_empty() {
        return PriceRecord::empty(Status::LinkMissing);
    }
    let Some(retailer) = resolve(link) else {
        return PriceRecord::empty(Status::UnsupportedChannel);
    };

    match AssertUnwindSafe(retailer.collect(page, link, ctx))
        .catch_unwind()
        .await
    {
        Ok(record) => record,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(id = %row.id, retailer = retailer.name(), panic = %message, "collector panicked");
            PriceRecord::fault("panic", message)
        }
    }
}

/// Runs every selected row in input order.
pub(crate) async fn run_rows<P: PageSession>(
    page: &mut P,
    rows: &[ProductRow],
    filter: &RunFilter,
    ctx: &CollectContext<'_>,
) -> RunReport {
    let mut report = RunReport::default();

    for row in rows.iter().filter(|row| filter.wants(row)) {
        if filter.limit.is_some_and(|limit| report.rows.len() >= limit) {
            break;
        }
        let record = collect_row(page, row, ctx).await;
        if record.status.is_success() {
            report.succeeded += 1;
        }
        let out = OutputRow::new(row, &record);
        tracing::info!(
            id = %out.id_produto,
            status = %out.status,
            avista = out.avista.as_deref().unwrap_or(""),
            pix = out.pix.as_deref().unwrap_or(""),
            prazo = out.prazo.as_deref().unwrap_or(""),
            "row collected"
        );
        report.rows.push(out);
    }

    report
}

#[cfg(test)]
mod tests {
    use vitrine_scraper::{CollectorSettings, HttpPage, NoDiagnostics};

    use super::*;

    fn row(id: &str, link: &str) -> ProductRow {
        ProductRow {
            id: id.to_owned(),
            title: None,
            link: link.to_owned(),
        }
    }

    async fn run(rows: &[ProductRow], filter: &RunFilter) -> Vec<OutputRow> {
        let settings = CollectorSettings::default();
        let ctx = CollectContext {
            settings: &settings,
            diagnostics: &NoDiagnostics,
        };
        let mut page = HttpPage::from_html("about:blank", "<html></html>");
        run_rows(&mut page, rows, filter, &ctx).await.rows
    }

    #[tokio::test]
    async fn input_errors_become_statuses() {
        let rows = [
            row("1", ""),
            row("2", "https://www.amazon.com.br/dp/B0"),
            row("3", "https://www.example.com/MLB-1"),
        ];
        let out = run(&rows, &RunFilter::default()).await;
        let statuses: Vec<&str> = out.iter().map(|r| r.status.as_str()).collect();
        assert_eq!(statuses, ["LINK_MISSING", "UNSUPPORTED_CHANNEL", "UNSUPPORTED_CHANNEL"]);
    }

    #[tokio::test]
    async fn page_failures_are_absorbed_per_row() {
        // A fixed document cannot navigate, so every page collector faults.
        let rows = [row("1", "https://www.probel.com.br/colchao"), row("2", "")];
        let out = run(&rows, &RunFilter::default()).await;
        assert!(out[0].status.starts_with("COLLECTOR_FAULT: page"));
        assert_eq!(out[1].status, "LINK_MISSING");
    }

    #[tokio::test]
    async fn filters_apply_ids_then_limit() {
        let rows = [row("1", ""), row("2", ""), row("3", ""), row("4", "")];
        let filter = RunFilter {
            limit: Some(2),
            only_ids: Some(["2", "3", "4"].into_iter().map(str::to_owned).collect()),
        };
        let out = run(&rows, &filter).await;
        let ids: Vec<&str> = out.iter().map(|r| r.id_produto.as_str()).collect();
        assert_eq!(ids, ["2", "3"]);
        assert!(filter.is_active());
    }

    fn storefront_offer() -> serde_json::Value {
        serde_json::json!([{
            "productName": "Geladeira Frost Free 375L",
            "items": [{
                "itemId": "8812",
                "sellers": [{
                    "sellerId": "1",
                    "commertialOffer": {
                        "Price": 3299.0,
                        "Installments": [
                            {"NumberOfInstallments": 10, "Value": 329.9, "InterestRate": 0}
                        ]
                    }
                }]
            }]
        }])
    }

    #[tokio::test]
    async fn collected_rows_are_written_in_input_order() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/catalog_system/pub/products/search/webcontinental-geladeira/p"))
            .respond_with(ResponseTemplate::new(200).set_body_json(storefront_offer()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/catalog_system/pub/products/search/webcontinental-fogao/p"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/checkout/pub/orderForms/simulation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "paymentData": {"installmentOptions": [
                    {"paymentName": "Pix", "installments": [{"count": 1, "value": 296_910}]}
                ]}
            })))
            .mount(&server)
            .await;

        let found = format!("{}/webcontinental-geladeira/p", server.uri());
        let missing = format!("{}/webcontinental-fogao/p", server.uri());
        let rows = [
            ProductRow {
                title: Some("Geladeira".to_owned()),
                ..row("10", &found)
            },
            row("11", ""),
            row("12", &missing),
        ];
        let settings = CollectorSettings {
            max_retries: 0,
            retry_backoff_base_secs: 0,
            ..CollectorSettings::default()
        };
        let ctx = CollectContext {
            settings: &settings,
            diagnostics: &NoDiagnostics,
        };
        let mut page = HttpPage::from_html("about:blank", "<html></html>");

        let report = run_rows(&mut page, &rows, &RunFilter::default(), &ctx).await;
        assert_eq!(report.succeeded, 1);

        let mut out = Vec::new();
        crate::rows::write_rows(&mut out, &report.rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[1],
            format!(
                "10,Geladeira,\"R$ 3.299,00\",\"R$ 2.969,10\",\"10x de R$ 329,90 sem juros\",OK,{found}"
            )
        );
        assert_eq!(lines[2], "11,,,,,LINK_MISSING,");
        assert_eq!(lines[3], format!("12,,,,,DATA_UNAVAILABLE,{missing}"));
    }

    #[test]
    fn panic_payloads_are_rendered() {
        let text: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(text.as_ref()), "boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bad index"));
        assert_eq!(panic_message(owned.as_ref()), "bad index");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
