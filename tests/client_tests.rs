use std::io::Write;
use std::sync::Arc;

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use toptranslation_api::clients::RateLimiter;
use toptranslation_api::{
    ApiError, Client, ClientError, Config, CreateOrder, Documents, Error, ListOrders, Orders,
};

fn client_for(server: &MockServer, token: Option<&str>) -> Client {
    let mut builder = Config::builder("test")
        .api_domain(server.uri())
        .api_version("1")
        .document_domain(server.uri())
        .api_request_delay(0.0);
    if let Some(token) = token {
        builder = builder.access_token(token);
    }
    let config = builder.build().unwrap();

    Client::builder("integration-tests/1.0")
        .config(config)
        .rate_limiter(Arc::new(RateLimiter::new()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn create_order_posts_json_with_token_and_wire_field_names() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/orders"))
        .and(body_partial_json(json!({
            "access_token": "token-123",
            "api_type": "json",
            "name": "Doc1",
            "reference": "R1",
            "commment": null
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"data": {"identifier": "o-1"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("token-123"));
    let order = client
        .create_order(CreateOrder {
            name: Some("Doc1".to_string()),
            reference: Some("R1".to_string()),
            ..CreateOrder::default()
        })
        .await
        .unwrap();

    assert_eq!(order["data"]["identifier"], "o-1");
}

#[tokio::test]
async fn show_order_sends_identifier_and_token_as_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/orders/abc123"))
        .and(query_param("identifier", "abc123"))
        .and(query_param("access_token", "token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"identifier": "abc123", "state": "in_translation"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("token-123"));
    let order = client.show_order("abc123").await.unwrap();
    assert_eq!(order["data"]["state"], "in_translation");
}

#[tokio::test]
async fn list_orders_yields_items_in_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/orders"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "20"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": 1}, {"id": 2}]})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Some("token-123"));
    let orders: Vec<Value> = client.list_orders(ListOrders::default()).await.unwrap().collect();

    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], 1);
    assert_eq!(orders[1]["id"], 2);
}

#[tokio::test]
async fn transient_upstream_failures_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/locales"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/locales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": ["de", "en"]})))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let locales: Vec<Value> = client.get_locales().await.unwrap().collect();
    assert_eq!(locales, vec![json!("de"), json!("en")]);
}

#[tokio::test]
async fn persistent_upstream_failure_exhausts_the_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/orders/abc123"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("token-123"));
    let result = client.show_order("abc123").await;

    assert!(matches!(
        result,
        Err(Error::Api(ApiError::RetriesExhausted {
            status: 503,
            attempts: 3
        }))
    ));
}

#[tokio::test]
async fn upload_token_is_unwrapped_for_both_auth_flows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/upload_tokens"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"data": {"upload_token": "tok-1"}})),
        )
        .mount(&server)
        .await;

    let anonymous = client_for(&server, None);
    assert_eq!(anonymous.upload_token().await.unwrap(), "tok-1");

    let authenticated = client_for(&server, Some("token-123"));
    assert_eq!(authenticated.upload_token().await.unwrap(), "tok-1");
}

#[tokio::test]
async fn authenticated_upload_token_requests_carry_the_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/upload_tokens"))
        .and(body_partial_json(json!({
            "access_token": "token-123",
            "api_type": "json"
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"data": {"upload_token": "tok-2"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some("token-123"));
    assert_eq!(client.upload_token().await.unwrap(), "tok-2");
}

#[tokio::test]
async fn malformed_upload_token_payload_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/upload_tokens"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {}})))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let result = client.upload_token().await;
    assert!(matches!(
        result,
        Err(Error::Client(ClientError::UnexpectedPayload { .. }))
    ));
}

#[tokio::test]
async fn failure_statuses_map_to_typed_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/orders/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "no such order"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/orders/secret"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error_type": "forbidden"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server, Some("token-123"));

    assert!(matches!(
        client.show_order("gone").await,
        Err(Error::Api(ApiError::NotFound(_)))
    ));
    // a declared error_type wins over the status code
    assert!(matches!(
        client.show_order("secret").await,
        Err(Error::Api(ApiError::Forbidden(_)))
    ));
}

#[tokio::test]
async fn escaped_response_bodies_are_unescaped_before_parsing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/orders/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"data": {"name": "Tom &amp; Jerry &#40;v2&#41;"}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server, Some("token-123"));
    let order = client.show_order("abc123").await.unwrap();
    assert_eq!(order["data"]["name"], "Tom & Jerry (v2)");
}

#[tokio::test]
async fn upload_document_posts_multipart_to_the_document_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/documents"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "doc-1"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "Guten Tag").unwrap();

    let client = client_for(&server, Some("token-123"));
    let document = client
        .upload_document("tok-1", file.path(), "source")
        .await
        .unwrap();
    assert_eq!(document["data"]["id"], "doc-1");
}

#[tokio::test]
async fn download_document_is_not_supported() {
    let server = MockServer::start().await;
    let client = client_for(&server, Some("token-123"));

    let result = client.download_document("tok-1", "doc-1").await;
    assert!(matches!(
        result,
        Err(Error::Client(ClientError::NotImplemented {
            operation: "download_document"
        }))
    ));
}
