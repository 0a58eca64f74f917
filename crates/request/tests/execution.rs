//! End-to-end tests of the execution pipeline against a mock HTTP server.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use courier_request::{Json, PlainHtml, RequestBuilder, RequestError};
use pretty_assertions::assert_eq;
use serde_json::Value;
use serde_json::value::RawValue;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const BIG_JSON: &str = r#"{"balance":123456789012345678901234567890,"ts":9007199254740993}"#;

#[tokio::test]
async fn get_decodes_json_without_precision_loss() {
    let server = common::server().await;
    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(BIG_JSON, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let value: Option<Value> = RequestBuilder::new()
        .get(&CancellationToken::new(), &format!("{}/account", server.uri()))
        .await
        .unwrap();

    let value = value.unwrap();
    assert_eq!(value["balance"].to_string(), "123456789012345678901234567890");
    assert_eq!(value["ts"].to_string(), "9007199254740993");
}

#[tokio::test]
async fn get_without_target_ignores_any_body() {
    let server = common::server().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{definitely not json"))
        .mount(&server)
        .await;

    let result: Result<(), _> = RequestBuilder::new()
        .get(&CancellationToken::new(), &server.uri())
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn empty_body_yields_no_value() {
    let server = common::server().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let value: Option<Value> = RequestBuilder::new()
        .get(&CancellationToken::new(), &server.uri())
        .await
        .unwrap();
    assert_eq!(value, None);
}

#[tokio::test]
async fn plain_html_receives_raw_body() {
    let server = common::server().await;
    let page = "<html><body>{\"not\": parsed}</body></html>";
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html"))
        .mount(&server)
        .await;

    let html: PlainHtml = RequestBuilder::new()
        .get(&CancellationToken::new(), &format!("{}/page", server.uri()))
        .await
        .unwrap();
    assert_eq!(html.as_str(), Some(page));
}

#[tokio::test]
async fn plain_html_keeps_non_utf8_bytes() {
    let server = common::server().await;
    let page: &[u8] = b"<p>caf\xe9</p>";
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(page, "text/html; charset=iso-8859-1"))
        .mount(&server)
        .await;

    let html: PlainHtml = RequestBuilder::new()
        .get(&CancellationToken::new(), &server.uri())
        .await
        .unwrap();
    assert_eq!(html.as_bytes(), page);
    assert_eq!(html.as_str(), None);
}

#[tokio::test]
async fn repeated_header_sends_only_latest_value() {
    let server = common::server().await;
    Mock::given(method("GET"))
        .and(header("x-token", "second"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut builder = RequestBuilder::new();
    builder.header("X-Token", "first").header("x-token", "second");
    builder
        .get::<()>(&CancellationToken::new(), &server.uri())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].headers.get_all("x-token").iter().count(), 1);
}

#[tokio::test]
async fn post_labels_every_payload_as_json() {
    let server = common::server().await;
    Mock::given(method("POST"))
        .and(path("/text"))
        .and(header("content-type", "application/json"))
        .and(body_string("hello, plain text"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    RequestBuilder::new()
        .post_json::<()>(
            &CancellationToken::new(),
            &format!("{}/text", server.uri()),
            "hello, plain text",
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn post_round_trips_big_numbers() {
    let server = common::server().await;
    Mock::given(method("POST"))
        .and(body_string(BIG_JSON))
        .respond_with(ResponseTemplate::new(200).set_body_raw(BIG_JSON, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let payload = RawValue::from_string(BIG_JSON.to_string()).unwrap();
    let echoed: Option<Value> = RequestBuilder::new()
        .post_json(&CancellationToken::new(), &server.uri(), payload)
        .await
        .unwrap();
    assert_eq!(echoed.unwrap().to_string(), BIG_JSON);
}

#[tokio::test]
async fn status_error_carries_body_only_when_requested() {
    let server = common::server().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(2)
        .mount(&server)
        .await;
    let url = format!("{}/missing", server.uri());
    let builder = RequestBuilder::new();
    let cancel = CancellationToken::new();

    let err = builder.get::<PlainHtml>(&cancel, &url).await.unwrap_err();
    match err {
        RequestError::Status {
            code,
            status_text,
            body,
        } => {
            assert_eq!(code, 404);
            assert_eq!(status_text, "Not Found");
            assert_eq!(body, "not found");
        }
        other => panic!("expected status error, got {other:?}"),
    }

    let err = builder.get::<()>(&cancel, &url).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.body(), Some(""));
}

#[tokio::test]
async fn redirects_fail_when_disabled() {
    let server = common::server().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .expect(1)
        .mount(&server)
        .await;
    let url = format!("{}/old", server.uri());
    let cancel = CancellationToken::new();

    let mut builder = RequestBuilder::new();
    let followed: PlainHtml = builder.get(&cancel, &url).await.unwrap();
    assert_eq!(followed.as_str(), Some("moved"));

    builder.disable_redirect();
    let err = builder.get::<PlainHtml>(&cancel, &url).await.unwrap_err();
    assert!(err.is_redirect(), "expected redirect error, got {err:?}");
}

#[tokio::test]
async fn requests_go_through_the_configured_proxy() {
    let proxy = common::server().await;
    Mock::given(method("GET"))
        .and(path("/x"))
        .respond_with(ResponseTemplate::new(200).set_body_string("via proxy"))
        .expect(1)
        .mount(&proxy)
        .await;

    let mut builder = RequestBuilder::new();
    builder.with_proxy(&proxy.uri());
    let html: PlainHtml = builder
        .get(&CancellationToken::new(), "http://upstream.invalid/x")
        .await
        .unwrap();
    assert_eq!(html.as_str(), Some("via proxy"));

    let requests = proxy.received_requests().await.unwrap();
    assert_eq!(
        requests[0].headers.get("host").and_then(|h| h.to_str().ok()),
        Some("upstream.invalid")
    );
}

#[tokio::test]
async fn invalid_proxy_never_touches_the_network() {
    let server = common::server().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut builder = RequestBuilder::new();
    builder.with_proxy("::not-a-proxy");
    let cancel = CancellationToken::new();

    let first = builder.get::<()>(&cancel, &server.uri()).await.unwrap_err();
    let second = builder
        .post_json::<()>(&cancel, &server.uri(), "x")
        .await
        .unwrap_err();
    match (first, second) {
        (RequestError::Config(a), RequestError::Config(b)) => assert_eq!(a, b),
        other => panic!("expected configuration errors, got {other:?}"),
    }
}

#[tokio::test]
async fn serialization_failure_aborts_before_io() {
    let server = common::server().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut payload = HashMap::new();
    payload.insert((1, 2), "tuple keys cannot be JSON object keys");
    let err = RequestBuilder::new()
        .post_json::<()>(&CancellationToken::new(), &server.uri(), Json(payload))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Serialization(_)), "{err:?}");
}

#[tokio::test]
async fn malformed_url_is_a_build_error() {
    let err = RequestBuilder::new()
        .get::<()>(&CancellationToken::new(), "not a url")
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Build(_)), "{err:?}");
}

#[tokio::test]
async fn cancelled_token_stops_before_dispatch() {
    let server = common::server().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();
    let err = RequestBuilder::new()
        .get::<()>(&cancel, &server.uri())
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn cancellation_aborts_in_flight_exchange() {
    let server = common::server().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = RequestBuilder::new()
        .get::<()>(&cancel, &server.uri())
        .await
        .unwrap_err();
    assert!(err.is_cancelled(), "{err:?}");
}
