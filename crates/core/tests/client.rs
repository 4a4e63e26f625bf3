//! End-to-end tests for the HTTP client against an in-process mock server.
//!
//! Each test starts an axum server on an ephemeral port that answers every
//! request with one canned reply and records what it received.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use billingo_core::{
    BillingoClient, ClientConfiguration, Collection, Error, Notifier, Query, SendDocument,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
struct Reply {
    status: u16,
    headers: Vec<(&'static str, &'static str)>,
    body: Vec<u8>,
    delay: Option<Duration>,
}

impl Reply {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: vec![("content-type", "application/json")],
            body: body.to_string().into_bytes(),
            delay: None,
        }
    }

    fn raw(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.to_vec(),
            delay: None,
        }
    }

    fn header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Debug, Clone)]
struct Received {
    method: Method,
    uri: String,
    headers: HeaderMap,
    body: Bytes,
}

#[derive(Clone)]
struct MockState {
    reply: Arc<Reply>,
    received: Arc<Mutex<Vec<Received>>>,
}

struct MockServer {
    base_url: String,
    state: MockState,
}

impl MockServer {
    async fn start(reply: Reply) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = MockState {
            reply: Arc::new(reply),
            received: Arc::new(Mutex::new(Vec::new())),
        };
        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/v3", addr),
            state,
        }
    }

    fn client(&self) -> BillingoClient {
        BillingoClient::new(ClientConfiguration::new("test-key", &self.base_url)).unwrap()
    }

    fn received(&self) -> Vec<Received> {
        self.state.received.lock().unwrap().clone()
    }

    fn single(&self) -> Received {
        let received = self.received();
        assert_eq!(received.len(), 1, "expected exactly one request");
        received.into_iter().next().unwrap()
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    state.received.lock().unwrap().push(Received {
        method,
        uri: uri.to_string(),
        headers,
        body,
    });

    let reply = state.reply.as_ref().clone();
    if let Some(delay) = reply.delay {
        tokio::time::sleep(delay).await;
    }

    let mut headers = HeaderMap::new();
    for (name, value) in &reply.headers {
        headers.insert(
            HeaderName::from_static(*name),
            HeaderValue::from_static(*value),
        );
    }
    let status = StatusCode::from_u16(reply.status).unwrap();
    (status, headers, reply.body).into_response()
}

#[derive(Default)]
struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl Notifier for CollectingNotifier {
    fn warn(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[tokio::test]
async fn missing_api_key_sends_nothing() {
    let server = MockServer::start(Reply::json(200, json!({}))).await;

    for api_key in [None, Some(String::new())] {
        let config = ClientConfiguration {
            api_key,
            base_url: server.base_url.clone(),
        };
        let client = BillingoClient::new(config).unwrap();

        let err = client.get("/partners", &Query::new()).await.unwrap_err();
        assert!(matches!(err, Error::Configuration));
        let err = client.post("/documents", None).await.unwrap_err();
        assert!(matches!(err, Error::Configuration));
        let err = client.download("/documents/1/download").await.unwrap_err();
        assert!(matches!(err, Error::Configuration));
    }

    assert!(server.received().is_empty());
}

#[tokio::test]
async fn list_partners_returns_data_array() {
    let server =
        MockServer::start(Reply::json(200, json!({"data": [{"id": 1, "name": "Acme"}]}))).await;

    let listing = server
        .client()
        .list(Collection::Partners, &Query::page(1, 25))
        .await
        .unwrap();

    assert_eq!(listing.items, json!([{"id": 1, "name": "Acme"}]));
    let request = server.single();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.uri, "/v3/partners?page=1&per_page=25");
}

#[tokio::test]
async fn success_body_is_passed_through() {
    let body = json!({
        "id": 12,
        "invoice_number": "INV-2024-1",
        "items": [{"name": "Hosting", "net_unit_amount": 1000.5, "vat": "27%"}],
        "partner": {"id": 3, "address": {"country_code": "HU"}},
        "paid_date": null
    });
    let server = MockServer::start(Reply::json(200, body.clone())).await;

    let value = server.client().fetch(Collection::Documents, 12).await.unwrap();

    assert_eq!(value, body);
    assert_eq!(server.single().uri, "/v3/documents/12");
}

#[tokio::test]
async fn requests_carry_auth_headers() {
    let server = MockServer::start(Reply::json(200, json!({}))).await;

    server.client().organization().await.unwrap();

    let request = server.single();
    assert_eq!(request.headers["x-api-key"], "test-key");
    assert_eq!(request.headers["accept"], "application/json");
    assert_eq!(request.headers["content-type"], "application/json");
}

#[tokio::test]
async fn download_returns_exact_bytes() {
    let raw = b"{ \"looks\": \"like json\" }\n";
    let reply = Reply::raw(200, raw).header("content-type", "application/json");
    let server = MockServer::start(reply).await;

    let bytes = server.client().download_document(5).await.unwrap();

    assert_eq!(bytes, raw.to_vec());
    let request = server.single();
    assert_eq!(request.uri, "/v3/documents/5/download");
    assert_eq!(request.headers["x-api-key"], "test-key");
    assert!(request.headers.get("content-type").is_none());
}

#[tokio::test]
async fn download_binary_pdf() {
    let pdf: Vec<u8> = b"%PDF-1.4\n"
        .iter()
        .copied()
        .chain([0u8, 0xff, 0x10, 0x80])
        .collect();
    let reply = Reply::raw(200, &pdf).header("content-type", "application/pdf");
    let server = MockServer::start(reply).await;

    let bytes = server.client().download_document(9).await.unwrap();
    assert_eq!(bytes, pdf);
}

#[tokio::test]
async fn post_forwards_payload_unmodified() {
    let payload = json!({
        "partner_id": 7,
        "block_id": 2,
        "type": "invoice",
        "fulfillment_date": "2024-05-01",
        "items": [
            {"name": "Consulting", "unit_price": 15000, "unit_price_type": "net", "quantity": 1.5, "vat": "27%"}
        ],
        "electronic": false,
        "comment": null
    });
    let server = MockServer::start(Reply::json(201, json!({"id": 99}))).await;

    let created = server
        .client()
        .create(Collection::Documents, &payload)
        .await
        .unwrap();

    assert_eq!(created, json!({"id": 99}));
    let request = server.single();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.uri, "/v3/documents");
    let received: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(received, payload);
}

#[tokio::test]
async fn post_without_body_sends_empty_object() {
    let server = MockServer::start(Reply::json(200, json!({"id": 4, "cancelled": true}))).await;

    server.client().cancel_document(4).await.unwrap();

    let request = server.single();
    assert_eq!(request.uri, "/v3/documents/4/cancel");
    let received: Value = serde_json::from_slice(&request.body).unwrap();
    assert_eq!(received, json!({}));
}

#[tokio::test]
async fn send_document_body() {
    let server = MockServer::start(Reply::json(200, json!({"emails": ["a@example.hu"]}))).await;
    let request = SendDocument {
        emails: vec!["a@example.hu".to_string()],
        subject: None,
        message: Some("Köszönjük!".to_string()),
    };

    server.client().send_document(8, &request).await.unwrap();

    let received = server.single();
    assert_eq!(received.uri, "/v3/documents/8/send");
    let body: Value = serde_json::from_slice(&received.body).unwrap();
    assert_eq!(body, json!({"emails": ["a@example.hu"], "message": "Köszönjük!"}));
}

#[tokio::test]
async fn update_uses_put() {
    let server = MockServer::start(Reply::json(200, json!({"id": 3, "name": "New"}))).await;

    server
        .client()
        .update(Collection::Products, 3, &json!({"name": "New"}))
        .await
        .unwrap();

    let request = server.single();
    assert_eq!(request.method, Method::PUT);
    assert_eq!(request.uri, "/v3/products/3");
}

#[tokio::test]
async fn empty_delete_response_is_null() {
    let server = MockServer::start(Reply::raw(204, b"")).await;

    let value = server.client().remove(Collection::Partners, 11).await.unwrap();

    assert_eq!(value, Value::Null);
    let request = server.single();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.uri, "/v3/partners/11");
}

#[tokio::test]
async fn currencies_query() {
    let server = MockServer::start(Reply::json(200, json!({"conversation_rate": 0.0025}))).await;

    server.client().conversion_rate("HUF", "EUR").await.unwrap();

    assert_eq!(server.single().uri, "/v3/currencies?from=HUF&to=EUR");
}

#[tokio::test]
async fn currencies_list_has_no_query() {
    let server = MockServer::start(Reply::json(200, json!(["HUF", "EUR", "USD"]))).await;

    let value = server.client().currencies().await.unwrap();

    assert_eq!(value, json!(["HUF", "EUR", "USD"]));
    let request = server.single();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.uri, "/v3/currencies");
}

#[tokio::test]
async fn empty_currencies_list_is_empty_array() {
    let server = MockServer::start(Reply::raw(200, b"")).await;

    let value = server.client().currencies().await.unwrap();

    assert_eq!(value, json!([]));
}

async fn error_for(status: u16, method: &Method) -> Error {
    let body = json!({"message": "server says no"});
    let server = MockServer::start(Reply::json(status, body)).await;
    let client = server.client();
    let payload = json!({"name": "x"});

    let result = if *method == Method::GET {
        client.get("/partners/1", &Query::new()).await
    } else if *method == Method::POST {
        client.post("/partners", Some(&payload)).await
    } else if *method == Method::PUT {
        client.put("/partners/1", &payload).await
    } else {
        client.delete("/partners/1").await
    };

    assert_eq!(server.received().len(), 1, "failed calls must not retry");
    result.unwrap_err()
}

#[tokio::test]
async fn status_codes_map_to_error_kinds() {
    for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
        assert!(matches!(error_for(401, &method).await, Error::Authentication));
        assert!(matches!(error_for(403, &method).await, Error::Authorization));
        assert!(matches!(error_for(404, &method).await, Error::NotFound));
        assert!(matches!(
            error_for(422, &method).await,
            Error::Validation { .. }
        ));
        assert!(matches!(
            error_for(429, &method).await,
            Error::RateLimited { .. }
        ));
        assert!(matches!(
            error_for(500, &method).await,
            Error::Server { status: 500 }
        ));
        assert!(matches!(
            error_for(502, &method).await,
            Error::Server { status: 502 }
        ));
        assert!(matches!(
            error_for(409, &method).await,
            Error::Api { status: 409, .. }
        ));
    }
}

#[tokio::test]
async fn unclassified_error_includes_status_and_message() {
    let err = error_for(400, &Method::GET).await;
    assert_eq!(err.to_string(), "API error (400): server says no");

    let err = error_for(422, &Method::POST).await;
    assert!(err.to_string().contains("server says no"));
}

#[tokio::test]
async fn rate_limited_mentions_retry_after() {
    let server = MockServer::start(
        Reply::json(429, json!({"message": "Too Many Attempts."})).header("retry-after", "30"),
    )
    .await;

    let err = server
        .client()
        .list(Collection::Partners, &Query::page(1, 25))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RateLimited { .. }));
    assert!(err.to_string().contains("30"));
}

#[tokio::test]
async fn low_rate_limit_warns_once() {
    let body = json!({"data": [{"id": 1}]});
    let server = MockServer::start(
        Reply::json(200, body.clone())
            .header("x-ratelimit-remaining", "3")
            .header("x-ratelimit-limit", "60"),
    )
    .await;
    let notifier = Arc::new(CollectingNotifier::default());
    let client = server.client().with_notifier(notifier.clone());

    let value = client.get("/partners", &Query::new()).await.unwrap();

    assert_eq!(value, body);
    let messages = notifier.messages.lock().unwrap().clone();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0], "Only 3/60 API calls remaining in this window");
}

#[tokio::test]
async fn healthy_rate_limit_is_silent() {
    let server = MockServer::start(
        Reply::json(200, json!({}))
            .header("x-ratelimit-remaining", "59")
            .header("x-ratelimit-limit", "60"),
    )
    .await;
    let notifier = Arc::new(CollectingNotifier::default());
    let client = server.client().with_notifier(notifier.clone());

    client.organization().await.unwrap();

    assert!(notifier.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ClientConfiguration::new("test-key", format!("http://127.0.0.1:{}/v3", port));
    let client = BillingoClient::new(config).unwrap();

    let err = client.organization().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    assert!(err.to_string().starts_with("No response from server"));
}

#[tokio::test]
async fn slow_response_times_out() {
    let server =
        MockServer::start(Reply::json(200, json!({})).delayed(Duration::from_secs(5))).await;
    let client = server.client().with_timeout(Duration::from_millis(200));

    let err = client.organization().await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}
