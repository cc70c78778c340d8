//! `ReqwestTransport` against a real HTTP server.

#![allow(clippy::unwrap_used)]

use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use storefront_remote::{
    JsonSchema, QueryConfig, QueryKey, QueryParams, RemoteError, ReqwestTransport, Shape,
    fetch_query,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Deserialize)]
struct Product {
    id: u64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct ProductsPage {
    products: Vec<Product>,
    total: u32,
}

fn products_schema() -> JsonSchema<ProductsPage> {
    JsonSchema::new(
        Shape::object()
            .field(
                "products",
                Shape::array(
                    Shape::object()
                        .field("id", Shape::number().integer())
                        .field("title", Shape::string()),
                ),
            )
            .field("total", Shape::number().integer()),
    )
}

#[tokio::test]
async fn fetches_and_validates_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("limit", "10"))
        .and(query_param("skip", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [{"id": 1, "title": "Essence Mascara Lash Princess"}],
            "total": 194,
            "skip": 0,
            "limit": 10
        })))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::with_timeout(Duration::from_secs(5)).unwrap();
    let config = QueryConfig::new().with_params(QueryParams::new().with("limit", 10_i64).with("skip", 0_i64));

    let page = fetch_query(
        &transport,
        &QueryKey::new("products"),
        &format!("{}/products", server.uri()),
        &products_schema(),
        &config,
    )
    .await
    .unwrap();

    assert_eq!(page.total, 194);
    assert_eq!(page.products[0].id, 1);
    assert_eq!(page.products[0].title, "Essence Mascara Lash Princess");
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let error = fetch_query(
        &transport,
        &QueryKey::new("products"),
        &format!("{}/products", server.uri()),
        &products_schema(),
        &QueryConfig::new(),
    )
    .await
    .unwrap_err();

    assert_eq!(error.status(), Some(500));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_document_is_validation_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [{"id": 1}],
            "total": 194
        })))
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let error = fetch_query(
        &transport,
        &QueryKey::new("products"),
        &format!("{}/products", server.uri()),
        &products_schema(),
        &QueryConfig::new(),
    )
    .await
    .unwrap_err();

    let RemoteError::Validation { path, .. } = error else {
        unreachable!("expected a validation error");
    };
    assert_eq!(path.to_string(), "products[0].title");
}

#[tokio::test]
async fn timeout_belongs_to_the_transport() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"products": [], "total": 0}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let transport = ReqwestTransport::with_timeout(Duration::from_millis(50)).unwrap();
    let error = fetch_query(
        &transport,
        &QueryKey::new("slow"),
        &format!("{}/slow", server.uri()),
        &products_schema(),
        &QueryConfig::new(),
    )
    .await
    .unwrap_err();

    assert!(error.is_transport());
    assert_eq!(error.status(), None);
}
