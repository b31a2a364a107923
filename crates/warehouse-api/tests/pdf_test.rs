//! PDF search API integration tests.

mod helpers;

use helpers::{pdf, setup_test_app};
use serde_json::Value;

async fn seeded() -> (helpers::TestApp, i64) {
    let app = setup_test_app().await;
    let short = app.state.pdfs.upsert(&pdf("short.pdf", 3, "Memo")).await.unwrap();
    app.state.pdfs.upsert(&pdf("report.pdf", 12, "Annual Report")).await.unwrap();
    app.state.pdfs.upsert(&pdf("thesis.pdf", 40, "Thesis")).await.unwrap();
    (app, short)
}

async fn total(app: &helpers::TestApp, path: &str) -> i64 {
    let response = app.client().get(path).await;
    assert_eq!(response.status_code(), 200, "{}", path);
    let data: Value = response.json();
    data["total"].as_i64().unwrap()
}

#[tokio::test]
async fn test_page_count_filters() {
    let (app, _) = seeded().await;

    assert_eq!(total(&app, "/api/pdf-search/pages/12").await, 1);
    assert_eq!(total(&app, "/api/pdf-search/pages/%3E10").await, 2);
    assert_eq!(total(&app, "/api/pdf-search/pages/%3C10").await, 1);
    assert_eq!(total(&app, "/api/pdf-search/pages/3-12").await, 2);
}

#[tokio::test]
async fn test_filename_and_everything_fields() {
    let (app, _) = seeded().await;

    assert_eq!(total(&app, "/api/pdf-search/filename/report").await, 1);
    assert_eq!(total(&app, "/api/pdf-search/Everything/thesis").await, 1);
    assert_eq!(total(&app, "/api/pdf-search/everything/40").await, 1);
    assert_eq!(total(&app, "/api/pdf-search/everything/%3E10").await, 2);
    assert_eq!(total(&app, "/api/pdf-search/everything/finance%20team").await, 3);
    assert_eq!(total(&app, "/api/pdf-search/everything/%3E-5").await, 0);
}

#[tokio::test]
async fn test_signed_page_counts_are_rejected() {
    let (app, _) = seeded().await;

    for path in ["/api/pdf-search/pages/%3E-5", "/api/pdf-search/pages/+5"] {
        let response = app.client().get(path).await;
        assert_eq!(response.status_code(), 400, "{}", path);
        let data: Value = response.json();
        assert_eq!(data["code"], "INVALID_INPUT");
    }
}

#[tokio::test]
async fn test_malformed_page_filters_are_rejected() {
    let (app, _) = seeded().await;

    let response = app.client().get("/api/pdf-search/pages/12-3").await;
    assert_eq!(response.status_code(), 400);
    let data: Value = response.json();
    assert_eq!(data["code"], "INVALID_RANGE");

    let response = app.client().get("/api/pdf-search/pages/many").await;
    assert_eq!(response.status_code(), 400);
    let data: Value = response.json();
    assert_eq!(data["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_info_and_text_search() {
    let (app, _) = seeded().await;

    let response = app.client().get("/api/pdf-search/Title/annual").await;
    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert_eq!(data["type"], "pdf");
    assert_eq!(data["total"], 1);
    let item = &data["items"][0];
    assert_eq!(item["filename"], "report.pdf");
    assert_eq!(item["numpages"], 12);
    assert_eq!(item["author"], "Finance Team");

    assert_eq!(total(&app, "/api/pdf-search/text/quarterly").await, 3);
    assert_eq!(total(&app, "/api/pdf-search/author/finance").await, 3);

    let response = app.client().get("/api/pdf-search/colour/blue").await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_list_is_ordered_by_filename() {
    let (app, _) = seeded().await;

    let response = app.client().get("/api/pdf").add_query_param("limit", 2).await;
    let data: Value = response.json();
    assert_eq!(data["total"], 3);
    assert_eq!(data["items"][0]["filename"], "report.pdf");
    assert_eq!(data["items"][1]["filename"], "short.pdf");

    let response = app
        .client()
        .get("/api/pdf")
        .add_query_param("limit", 2)
        .add_query_param("offset", 2)
        .await;
    let data: Value = response.json();
    assert_eq!(data["items"].as_array().unwrap().len(), 1);
    assert_eq!(data["items"][0]["filename"], "thesis.pdf");
}

#[tokio::test]
async fn test_lookups() {
    let (app, id) = seeded().await;

    let response = app.client().get(&format!("/api/pdf/{}", id)).await;
    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert_eq!(data["filename"], "short.pdf");
    assert_eq!(data["info"]["Title"], "Memo");

    let response = app.client().get(&format!("/api/pdf/{}/xmp", id)).await;
    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert_eq!(data["dc:title"], "Memo");

    let response = app.client().get(&format!("/api/pdf/{}/text", id)).await;
    assert_eq!(response.status_code(), 200);
    let data: Value = response.json();
    assert_eq!(data["id"], id);
    assert_eq!(data["text"], "Quarterly figures in short.pdf");

    for path in ["/api/pdf/999", "/api/pdf/999/xmp", "/api/pdf/999/text"] {
        let response = app.client().get(path).await;
        assert_eq!(response.status_code(), 404, "{}", path);
    }
}
