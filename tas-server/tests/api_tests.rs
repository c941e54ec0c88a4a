//! Integration tests for tas API endpoints
//!
//! Tests cover:
//! - Request validation: empty, undecodable, schema-violating and oversized bodies
//! - Content type dispatch under both matching disciplines
//! - HTML analysis results and OpenGraph bookkeeping removal
//! - Error mapping for analyser failures and timeouts
//! - Request/success/error metrics
//! - Health, information and metrics endpoints

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tas_common::config::{ContentTypeMatching, ServiceConfig, DEFAULT_MAX_BODY_SIZE};
use tas_server::analysis::analyser::{HtmlAnalyser, PageAnalysis, WebPage};
use tas_server::error::error_codes;
use tas_server::{build_router, AppState};
use tower::util::ServiceExt; // for `oneshot` method

const PREFIX: &str = "topicaxis.tas.processhtml";

const PAGE: &str = r#"<html><head>
<title>Example</title>
<meta property="og:title" content="Example Domain" />
<meta property="og:type" content="website" />
<meta name="twitter:card" content="summary" />
</head><body>
<p>This domain is for use in illustrative examples in documents.</p>
<p>You may use this domain in literature without prior coordination or asking for permission.</p>
</body></html>"#;

/// Analyser that counts calls and can be told to fail or stall
struct ScriptedAnalyser {
    calls: AtomicUsize,
    behaviour: Behaviour,
}

enum Behaviour {
    Fail,
    Stall(Duration),
}

impl ScriptedAnalyser {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            behaviour,
        })
    }
}

impl HtmlAnalyser for ScriptedAnalyser {
    fn analyse(&self, _page: &WebPage) -> anyhow::Result<PageAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Fail => anyhow::bail!("stop list file /srv/secret/stoplist.txt missing"),
            Behaviour::Stall(delay) => {
                std::thread::sleep(delay);
                Ok(PageAnalysis::default())
            }
        }
    }
}

/// Test helper: default state with the built-in analyser
fn default_state() -> AppState {
    AppState::new(ServiceConfig::default()).expect("Should build state")
}

/// Test helper: POST a raw body to the process endpoint
fn process_request(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/process")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn html_envelope(content_type: &str) -> Value {
    json!({
        "content_type": content_type,
        "content": {
            "url": "http://www.example.com",
            "html": PAGE,
            "headers": {"Content-Type": "text/html; charset=UTF-8"}
        }
    })
}

/// Test helper: send a request, return status and JSON body
async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).expect("Should parse JSON");
    (status, body)
}

async fn post_json(app: Router, value: &Value) -> (StatusCode, Value) {
    send(app, process_request(serde_json::to_vec(value).unwrap())).await
}

fn assert_error_shape(body: &Value) {
    let fields = body.as_object().expect("error body should be an object");
    assert_eq!(fields.len(), 3, "unexpected error body: {}", body);
    assert!(body["title"].is_string());
    assert!(body["description"].is_string());
    assert!(body["code"].is_u64());
}

// =============================================================================
// Service endpoints
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = send(
        build_router(default_state()),
        Request::get("/service/health").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"result": "ok"}));
}

#[tokio::test]
async fn test_information() {
    let config = ServiceConfig {
        host: "10.1.2.3".to_string(),
        port: 9999,
        ..Default::default()
    };
    let app = build_router(AppState::new(config).unwrap());

    let (status, body) = send(
        app,
        Request::get("/service/information").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "tas");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["host"], "10.1.2.3");
    assert_eq!(body["port"], 9999);
}

// =============================================================================
// Request validation
// =============================================================================

#[tokio::test]
async fn test_empty_body() {
    let (status, body) = send(build_router(default_state()), process_request("")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_shape(&body);
    assert_eq!(body["code"], error_codes::EMPTY_REQUEST_BODY);
    assert_eq!(body["title"], "Empty request body");
    assert_eq!(body["description"], "The contents of a web page must be provided");
}

#[tokio::test]
async fn test_non_json_body() {
    let (status, body) = send(build_router(default_state()), process_request("<html>")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], error_codes::INVALID_REQUEST_BODY);
    assert_eq!(
        body["description"],
        "The contents of the request body could not be decoded"
    );
}

#[tokio::test]
async fn test_schema_violation() {
    let (status, body) = post_json(build_router(default_state()), &json!({"content": {}})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_error_shape(&body);
    assert_eq!(body["code"], error_codes::REQUEST_SCHEMA_VIOLATION);
    assert_eq!(
        body["description"],
        "The contents of the request are not in the appropriate format"
    );
}

#[tokio::test]
async fn test_body_size_limit() {
    let config = ServiceConfig {
        max_body_size: Some(256),
        ..Default::default()
    };
    let app = build_router(AppState::new(config).unwrap());

    let (status, body) = post_json(app, &html_envelope("html")).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], error_codes::REQUEST_BODY_TOO_LARGE);
}

#[tokio::test]
async fn test_default_body_limit_applies() {
    let mut envelope = html_envelope("html");
    envelope["content"]["html"] = Value::String("a".repeat(DEFAULT_MAX_BODY_SIZE));

    let (status, body) = post_json(build_router(default_state()), &envelope).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], error_codes::REQUEST_BODY_TOO_LARGE);
    assert_error_shape(&body);
}

#[tokio::test]
async fn test_invalid_html_content() {
    let envelope = json!({
        "content_type": "html",
        "content": {"url": "not a url", "html": "<p>x</p>", "headers": {}}
    });
    let (status, body) = post_json(build_router(default_state()), &envelope).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], error_codes::INVALID_HTML_CONTENT);
    assert_eq!(body["title"], "Invalid request body");
}

#[tokio::test]
async fn test_missing_headers_is_invalid_html_content() {
    let envelope = json!({
        "content_type": "html",
        "content": {"url": "http://www.example.com", "html": "<p>x</p>"}
    });
    let (status, body) = post_json(build_router(default_state()), &envelope).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], error_codes::INVALID_HTML_CONTENT);
}

// =============================================================================
// Content type dispatch
// =============================================================================

#[tokio::test]
async fn test_unsupported_content_type_never_reaches_analyser() {
    let analyser = ScriptedAnalyser::new(Behaviour::Fail);
    let state = AppState::with_analyser(ServiceConfig::default(), analyser.clone());
    let metrics = state.metrics.clone();

    let (status, body) = post_json(
        build_router(state),
        &json!({"content_type": "text/plain", "content": {}}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], error_codes::UNSUPPORTED_CONTENT_TYPE);
    assert!(body["description"].as_str().unwrap().contains("text/plain"));
    assert_eq!(analyser.calls.load(Ordering::SeqCst), 0);
    assert_eq!(metrics.counter(&format!("{}.success", PREFIX)), 0);
    assert_eq!(metrics.counter(&format!("{}.error", PREFIX)), 1);
}

#[tokio::test]
async fn test_exact_matching_rejects_mime_type() {
    let (status, body) = post_json(build_router(default_state()), &html_envelope("text/html")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], error_codes::UNSUPPORTED_CONTENT_TYPE);
}

#[tokio::test]
async fn test_prefix_matching_accepts_mime_type() {
    let config = ServiceConfig {
        content_type_matching: ContentTypeMatching::Prefix,
        ..Default::default()
    };
    let app = build_router(AppState::new(config).unwrap());

    let (status, body) = post_json(app.clone(), &html_envelope("text/html; charset=utf-8")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["title"], "Example");

    let (status, _) = post_json(app, &html_envelope("html")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_prefix_matching_ignores_case() {
    let config = ServiceConfig {
        content_type_matching: ContentTypeMatching::Prefix,
        ..Default::default()
    };
    let app = build_router(AppState::new(config).unwrap());

    let (status, body) = post_json(app, &html_envelope("TEXT/HTML; charset=UTF-8")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["title"], "Example");
}

#[tokio::test]
async fn test_blank_content_type_is_unsupported() {
    for matching in [ContentTypeMatching::Exact, ContentTypeMatching::Prefix] {
        let analyser = ScriptedAnalyser::new(Behaviour::Fail);
        let config = ServiceConfig {
            content_type_matching: matching,
            ..Default::default()
        };
        let app = build_router(AppState::with_analyser(config, analyser.clone()));

        let (status, body) = post_json(app, &html_envelope("  ")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{:?}", matching);
        assert_eq!(body["code"], error_codes::UNSUPPORTED_CONTENT_TYPE);
        assert_eq!(
            body["description"],
            "The content type \"  \" is not supported"
        );
        assert_eq!(analyser.calls.load(Ordering::SeqCst), 0);
    }
}

// =============================================================================
// Analysis results
// =============================================================================

#[tokio::test]
async fn test_html_analysis() {
    let (status, body) = post_json(build_router(default_state()), &html_envelope("HTML")).await;

    assert_eq!(status, StatusCode::OK);

    let content = body["content"].as_object().expect("content object");
    for key in [
        "text",
        "title",
        "html",
        "keywords",
        "summary",
        "readability_scores",
        "statistics",
        "named_entities",
        "top_image",
        "images",
        "movies",
    ] {
        assert!(content.contains_key(key), "missing content.{}", key);
    }
    assert_eq!(content["title"], "Example");
    assert!(content["text"].as_str().unwrap().contains("illustrative examples"));
    assert!(content["keywords"]["illustrative examples"].is_number());
    assert!(content["statistics"]["word_count"].is_u64());
    assert!(content["readability_scores"]["flesch_reading_ease"].is_f64());

    let opengraph = body["social"]["opengraph"].as_object().expect("opengraph object");
    assert_eq!(opengraph["title"], "Example Domain");
    assert_eq!(opengraph["type"], "website");
    assert!(!opengraph.contains_key("_url"));
    assert_eq!(body["social"]["twitter"]["card"], "summary");
}

#[tokio::test]
async fn test_page_without_text_has_null_facets() {
    let envelope = json!({
        "content_type": "html",
        "content": {"url": "http://www.example.com", "html": "<html></html>", "headers": {}}
    });
    let (status, body) = post_json(build_router(default_state()), &envelope).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"]["text"], Value::Null);
    assert_eq!(body["content"]["title"], Value::Null);
    assert_eq!(body["content"]["keywords"], Value::Null);
    assert_eq!(body["social"]["opengraph"], Value::Null);
    assert!(body["content"].as_object().unwrap().contains_key("text"));
}

#[tokio::test]
async fn test_analysis_is_deterministic() {
    let app = build_router(default_state());

    let (_, first) = post_json(app.clone(), &html_envelope("html")).await;
    let (_, second) = post_json(app, &html_envelope("html")).await;

    assert_eq!(first["content"]["keywords"], second["content"]["keywords"]);
    assert_eq!(first["content"]["named_entities"], second["content"]["named_entities"]);
    assert_eq!(first, second);
}

// =============================================================================
// Processing failures
// =============================================================================

#[tokio::test]
async fn test_analyser_failure_is_generic_processing_error() {
    let analyser = ScriptedAnalyser::new(Behaviour::Fail);
    let app = build_router(AppState::with_analyser(ServiceConfig::default(), analyser));

    let response = app
        .oneshot(process_request(serde_json::to_vec(&html_envelope("html")).unwrap()))
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let raw = String::from_utf8(bytes.to_vec()).unwrap();
    let body: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_error_shape(&body);
    assert_eq!(body["code"], error_codes::HTML_CONTENT_PROCESSING_ERROR);
    assert_eq!(body["title"], "Processing error");
    assert!(!raw.contains("stop list"));
    assert!(!raw.contains("/srv/secret"));
}

#[tokio::test]
async fn test_slow_analyser_times_out() {
    let config = ServiceConfig {
        analysis_timeout: Duration::from_millis(50),
        ..Default::default()
    };
    let analyser = ScriptedAnalyser::new(Behaviour::Stall(Duration::from_millis(500)));
    let app = build_router(AppState::with_analyser(config, analyser));

    let (status, body) = post_json(app, &html_envelope("html")).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["code"], error_codes::ANALYSIS_TIMEOUT);
}

// =============================================================================
// Metrics
// =============================================================================

#[tokio::test]
async fn test_each_request_counts_once() {
    let state = default_state();
    let metrics = state.metrics.clone();
    let app = build_router(state);

    post_json(app.clone(), &html_envelope("html")).await;
    send(app.clone(), process_request("")).await;
    post_json(app.clone(), &html_envelope("html")).await;

    assert_eq!(metrics.counter(&format!("{}.request", PREFIX)), 3);
    assert_eq!(metrics.counter(&format!("{}.success", PREFIX)), 2);
    assert_eq!(metrics.counter(&format!("{}.error", PREFIX)), 1);
    assert_eq!(metrics.timing_samples(&format!("{}.execution", PREFIX)), 3);

    // Service endpoints are not instrumented
    send(
        app.clone(),
        Request::get("/service/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(metrics.counter(&format!("{}.request", PREFIX)), 3);

    let (status, snapshot) = send(
        app,
        Request::get("/service/metrics").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["counters"][format!("{}.request", PREFIX)], 3);
    assert_eq!(snapshot["timings"][format!("{}.execution", PREFIX)]["samples"], 3);
}
