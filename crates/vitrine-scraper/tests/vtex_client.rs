//! Integration tests for `VtexClient` and the Web Continental collector.
//!
//! Each test stands up a `wiremock` server playing the VTEX storefront, so
//! no real network traffic is made.

use std::cell::Cell;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitrine_core::{PriceRecord, Status};
use vitrine_scraper::vtex::{best_installment, cash_price, pix_from_simulation};
use vitrine_scraper::{
    CollectContext, CollectorSettings, DiagnosticsSink, HttpPage, NoDiagnostics, PageSnapshot,
    Retailer, ScraperError, VtexClient,
};

const SLUG: &str = "geladeira-frost-free-375l";
const SEARCH_PATH: &str = "/api/catalog_system/pub/products/search/geladeira-frost-free-375l/p";
const SIMULATION_PATH: &str = "/api/checkout/pub/orderForms/simulation";

/// Five-second timeouts, no retries.
fn test_client() -> VtexClient {
    VtexClient::new(Duration::from_secs(5), Duration::from_secs(5), "vitrine-test/0.1", 0, 0)
        .expect("failed to build test VtexClient")
}

fn test_settings() -> CollectorSettings {
    CollectorSettings {
        http_connect_timeout: Duration::from_secs(5),
        http_read_timeout: Duration::from_secs(5),
        max_retries: 0,
        retry_backoff_base_secs: 0,
        ..CollectorSettings::default()
    }
}

fn catalog_json() -> serde_json::Value {
    json!([{
        "productId": "4411",
        "productName": "Geladeira Frost Free 375L",
        "items": [{
            "itemId": "8812",
            "sellers": [{
                "sellerId": "1",
                "commertialOffer": {
                    "Price": 3299.0,
                    "Installments": [
                        {"NumberOfInstallments": 1, "Value": 3299.0, "InterestRate": 0},
                        {"NumberOfInstallments": 10, "Value": 329.9, "InterestRate": 0},
                        {"NumberOfInstallments": 12, "Value": 299.0, "InterestRate": 1.99}
                    ]
                }
            }]
        }]
    }])
}

fn simulation_json() -> serde_json::Value {
    json!({
        "paymentData": {
            "installmentOptions": [
                {"paymentName": "Visa", "installments": [{"count": 1, "value": 329_900}]},
                {"paymentName": "Pix", "installments": [{"count": 1, "value": 296_910}]},
                {"paymentName": "Boleto  Bancário", "installments": [{"count": 1, "value": 313_405}]}
            ]
        }
    })
}

async fn mount_catalog(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

// ---------------------------------------------------------------------------
// Catalog search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetch_product_resolves_first_sku_and_seller() {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(200).set_body_json(catalog_json())).await;

    let product = test_client()
        .fetch_product_by_slug(&server.uri(), SLUG)
        .await
        .expect("catalog search should succeed");

    assert_eq!(product.sku_id, "8812");
    assert_eq!(product.seller_id, "1");
    assert_eq!(product.name.as_deref(), Some("Geladeira Frost Free 375L"));
    assert_eq!(cash_price(&product.offer).unwrap().as_str(), "R$ 3.299,00");
    assert_eq!(
        best_installment(&product.offer).unwrap().to_string(),
        "12x de R$ 299,00 com juros"
    );
}

#[tokio::test]
async fn fetch_product_empty_search_is_missing_field() {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let err = test_client()
        .fetch_product_by_slug(&server.uri(), SLUG)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ScraperError::MissingField { ref field, .. } if field == "product"),
        "expected MissingField(product), got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_product_without_offer_is_missing_field() {
    let server = MockServer::start().await;
    let body = json!([{"items": [{"itemId": 8812, "sellers": [{"sellerId": "1", "commertialOffer": {}}]}]}]);
    mount_catalog(&server, ResponseTemplate::new(200).set_body_json(body)).await;

    let err = test_client()
        .fetch_product_by_slug(&server.uri(), SLUG)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ScraperError::MissingField { ref field, .. } if field == "commertialOffer"),
        "expected MissingField(commertialOffer), got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_product_404_is_not_found() {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(404)).await;

    let err = test_client()
        .fetch_product_by_slug(&server.uri(), SLUG)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ScraperError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_product_500_is_unexpected_status() {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(500)).await;

    let err = test_client()
        .fetch_product_by_slug(&server.uri(), SLUG)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ScraperError::UnexpectedStatus { status: 500, .. }),
        "expected UnexpectedStatus(500), got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_product_malformed_json_is_deserialize_error() {
    let server = MockServer::start().await;
    mount_catalog(
        &server,
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    )
    .await;

    let err = test_client()
        .fetch_product_by_slug(&server.uri(), SLUG)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ScraperError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_product_429_retries_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "1"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_catalog(&server, ResponseTemplate::new(200).set_body_json(catalog_json())).await;

    let client =
        VtexClient::new(Duration::from_secs(5), Duration::from_secs(5), "vitrine-test/0.1", 1, 0)
            .expect("failed to build test VtexClient");
    let product = client
        .fetch_product_by_slug(&server.uri(), SLUG)
        .await
        .expect("second attempt should succeed");

    assert_eq!(product.sku_id, "8812");
}

// ---------------------------------------------------------------------------
// Checkout simulation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn simulation_posts_sku_and_reads_lowest_cash_option() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(SIMULATION_PATH))
        .and(body_partial_json(json!({
            "items": [{"id": "8812", "quantity": 1, "seller": "1"}],
            "country": "BRA",
            "postalCode": "01001000"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(simulation_json()))
        .expect(1)
        .mount(&server)
        .await;

    let simulation = test_client()
        .simulate_checkout(&server.uri(), "8812", "1", 1, "01001000")
        .await
        .expect("simulation should succeed");

    assert_eq!(pix_from_simulation(&simulation).unwrap().as_str(), "R$ 2.969,10");
}

// ---------------------------------------------------------------------------
// Web Continental collector
// ---------------------------------------------------------------------------

/// Counts snapshot requests without writing anything.
#[derive(Default)]
struct CountingSink {
    captures: Cell<usize>,
}

impl DiagnosticsSink for CountingSink {
    fn capture(&self, _snapshot: &PageSnapshot<'_>) -> io::Result<Option<PathBuf>> {
        self.captures.set(self.captures.get() + 1);
        Ok(None)
    }
}

async fn collect_from(origin: &str, sink: &dyn DiagnosticsSink) -> PriceRecord {
    let settings = test_settings();
    let ctx = CollectContext {
        settings: &settings,
        diagnostics: sink,
    };
    let url = format!("{origin}/{SLUG}/p");
    let mut page = HttpPage::from_html(&url, "<html></html>");
    Retailer::WebContinental.collect(&mut page, &url, &ctx).await
}

async fn collect_against(server: &MockServer) -> PriceRecord {
    collect_from(&server.uri(), &NoDiagnostics).await
}

#[tokio::test]
async fn collector_reads_all_three_fields() {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(200).set_body_json(catalog_json())).await;
    Mock::given(method("POST"))
        .and(path(SIMULATION_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(simulation_json()))
        .mount(&server)
        .await;

    let record = collect_against(&server).await;

    assert_eq!(record.status, Status::Ok);
    assert_eq!(record.avista.unwrap().as_str(), "R$ 3.299,00");
    assert_eq!(record.pix.unwrap().as_str(), "R$ 2.969,10");
    assert_eq!(record.prazo.unwrap().count, 12);
}

#[tokio::test]
async fn collector_leaves_pix_empty_when_simulation_fails() {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(200).set_body_json(catalog_json())).await;
    Mock::given(method("POST"))
        .and(path(SIMULATION_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let record = collect_against(&server).await;

    assert_eq!(record.status, Status::OkNoPix);
    assert!(record.pix.is_none());
}

#[tokio::test]
async fn collector_reports_catalog_error_status_as_unavailable() {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(500)).await;

    let record = collect_against(&server).await;

    assert_eq!(record, PriceRecord::empty(Status::DataUnavailable));
}

#[tokio::test]
async fn collector_reports_empty_search_as_unavailable() {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(200).set_body_json(json!([]))).await;

    let record = collect_against(&server).await;

    assert_eq!(record, PriceRecord::empty(Status::DataUnavailable));
}

#[tokio::test]
async fn collector_reports_malformed_catalog_as_unavailable() {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(200).set_body_string("<html></html>")).await;

    let record = collect_against(&server).await;

    assert_eq!(record.status, Status::DataUnavailable);
}

#[tokio::test]
async fn collector_turns_unreachable_store_into_fault() {
    let server = MockServer::start().await;
    let origin = server.uri();
    drop(server);

    let record = collect_from(&origin, &NoDiagnostics).await;

    assert!(
        record.status.to_string().starts_with("COLLECTOR_FAULT: http"),
        "got: {}",
        record.status
    );
}

#[tokio::test]
async fn collector_takes_no_snapshot_when_unavailable() {
    let server = MockServer::start().await;
    mount_catalog(&server, ResponseTemplate::new(404)).await;
    let sink = CountingSink::default();

    let record = collect_from(&server.uri(), &sink).await;

    assert_eq!(record.status, Status::DataUnavailable);
    assert_eq!(sink.captures.get(), 0);
}

#[tokio::test]
async fn collector_rejects_link_without_slug() {
    let settings = test_settings();
    let ctx = CollectContext {
        settings: &settings,
        diagnostics: &NoDiagnostics,
    };
    let url = "https://www.webcontinental.com.br/";
    let mut page = HttpPage::from_html(url, "<html></html>");

    let record = Retailer::WebContinental.collect(&mut page, url, &ctx).await;

    assert_eq!(record.status, Status::InvalidLink);
}
