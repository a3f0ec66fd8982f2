//! Integration tests for the pastebin HTTP server.
//!
//! These tests use axum-test to make requests against the router without
//! starting a real server.

mod common;

use std::time::Duration;

use axum::{Router, body::Bytes, extract::State, http::HeaderMap, http::StatusCode, routing::post};
use common::{HELLO_FULL_KEY, HELLO_SHORT_KEY, TestApp, expiring_state, key_from_url};
use pastebin_server::server::Webhook;
use serde::Serialize;
use tokio::sync::mpsc;

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("ok");

    Ok(())
}

// =============================================================================
// Submission And Display
// =============================================================================

#[tokio::test]
async fn test_submit_and_read_back_short_digest() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app.server.post("/paste").text("hello").await;
    response.assert_status_ok();
    let url = response.text();
    assert!(url.starts_with("http://"));
    assert!(url.ends_with(&format!("/{}\n", HELLO_SHORT_KEY)));

    let response = app.server.get(&format!("/{}", HELLO_SHORT_KEY)).await;
    response.assert_status_ok();
    response.assert_text("<!DOCTYPE html><pre>hello</pre>");

    Ok(())
}

#[tokio::test]
async fn test_full_digest_keys() -> anyhow::Result<()> {
    let app = TestApp::with_scheme("hash+full")?;

    let url = app.server.post("/paste").text("hello").await.text();
    assert_eq!(key_from_url(&url), HELLO_FULL_KEY);

    app.server
        .get(&format!("/{}", HELLO_FULL_KEY))
        .await
        .assert_text("<!DOCTYPE html><pre>hello</pre>");
    // The short form is a valid identifier but names nothing in this store.
    app.server
        .get(&format!("/{}", HELLO_SHORT_KEY))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_counter_keys_are_sequential() -> anyhow::Result<()> {
    let app = TestApp::with_scheme("counter")?;

    let first = app.server.post("/paste").text("x").await.text();
    let second = app.server.post("/paste").text("y").await.text();
    assert_eq!(key_from_url(&first), "1");
    assert_eq!(key_from_url(&second), "2");

    app.server.get("/1").await.assert_text("<!DOCTYPE html><pre>x</pre>");
    app.server.get("/2").await.assert_text("<!DOCTYPE html><pre>y</pre>");

    Ok(())
}

#[tokio::test]
async fn test_identical_payloads_share_a_key() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let first = app.server.post("/paste").text("same text").await.text();
    let second = app.server.post("/paste").text("same text").await.text();
    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
async fn test_binary_payload_round_trip() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let url = app
        .server
        .post("/paste")
        .bytes(Bytes::from_static(&[0x66, 0xff, 0x6f]))
        .await
        .text();

    let response = app.server.get(&format!("/{}", key_from_url(&url))).await;
    response.assert_status_ok();
    response.assert_text("<!DOCTYPE html><pre>f\u{fffd}o</pre>");

    Ok(())
}

#[tokio::test]
async fn test_payload_is_html_escaped() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let url = app
        .server
        .post("/paste")
        .text("<script>alert('x')</script>")
        .await
        .text();
    let body = app.server.get(&format!("/{}", key_from_url(&url))).await.text();

    assert!(!body.contains("<script>"));
    assert!(body.contains("&lt;script&gt;"));

    Ok(())
}

#[derive(Serialize)]
struct PasteForm<'a> {
    text: &'a str,
}

#[tokio::test]
async fn test_welcome_form_text_field_is_the_payload() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let url = app
        .server
        .post("/paste")
        .form(&PasteForm { text: "hello" })
        .await
        .text();

    assert_eq!(key_from_url(&url), HELLO_SHORT_KEY);

    Ok(())
}

#[tokio::test]
async fn test_public_host_in_returned_url() -> anyhow::Result<()> {
    let app = TestApp::with_config(|config| {
        config.server.public_host = Some("paste.example.com".into());
    })?;

    let response = app.server.post("/paste").text("hello").await;
    response.assert_text(format!("http://paste.example.com/{}\n", HELLO_SHORT_KEY));

    Ok(())
}

#[tokio::test]
async fn test_custom_endpoint() -> anyhow::Result<()> {
    let app = TestApp::with_config(|config| {
        config.server.endpoint = "submit".into();
    })?;

    app.server.post("/submit").text("hello").await.assert_status_ok();
    app.server
        .post("/paste")
        .text("hello")
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);

    Ok(())
}

#[tokio::test]
async fn test_endpoint_with_surrounding_slashes() -> anyhow::Result<()> {
    let app = TestApp::with_config(|config| {
        config.server.endpoint = "/submit/".into();
    })?;

    let url = app.server.post("/submit").text("hello").await.text();
    assert_eq!(key_from_url(&url), HELLO_SHORT_KEY);

    Ok(())
}

#[tokio::test]
async fn test_empty_endpoint_posts_to_root() -> anyhow::Result<()> {
    let app = TestApp::with_config(|config| {
        config.server.endpoint = String::new();
    })?;

    let url = app.server.post("/").text("hello").await.text();
    assert_eq!(key_from_url(&url), HELLO_SHORT_KEY);
    // GET on the same path still lands.
    app.server.get("/").await.assert_status(StatusCode::FOUND);

    Ok(())
}

// =============================================================================
// Lookup Errors
// =============================================================================

#[tokio::test]
async fn test_malformed_identifier_is_bad_request() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app.server.get("/zzz").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_text("Bad Request");

    // Too long for a short digest.
    app.server
        .get("/5d41402abc4b2a76b9719d911017c592ff")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_counter_store_rejects_hex_identifier() -> anyhow::Result<()> {
    let app = TestApp::with_scheme("counter")?;

    app.server.get("/abc").await.assert_status(StatusCode::BAD_REQUEST);
    app.server.get("/1+").await.assert_status(StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn test_absent_key_is_not_found() -> anyhow::Result<()> {
    let app = TestApp::new()?;

    let response = app.server.get("/abcdef0").await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_text("Not Found");

    Ok(())
}

#[tokio::test]
async fn test_expired_paste_is_not_found() -> anyhow::Result<()> {
    let (state, clock, temp_dir) = expiring_state(Duration::from_secs(60))?;
    let app = TestApp::from_state(state, temp_dir)?;

    app.server.post("/paste").text("hello").await.assert_status_ok();
    clock.advance(Duration::from_secs(59));
    app.server
        .get(&format!("/{}", HELLO_SHORT_KEY))
        .await
        .assert_status_ok();

    clock.advance(Duration::from_secs(1));
    app.server
        .get(&format!("/{}", HELLO_SHORT_KEY))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    Ok(())
}

// =============================================================================
// Landing
// =============================================================================

#[tokio::test]
async fn test_empty_store_shows_welcome() -> anyhow::Result<()> {
    for scheme in ["hash", "counter"] {
        let app = TestApp::with_scheme(scheme)?;

        let response = app.server.get("/").await;
        response.assert_status_ok();
        let body = response.text();
        assert!(body.starts_with("<!DOCTYPE html><h1>Welcome!</h1>"));
        assert!(body.contains(r#"action="/paste""#));
    }

    Ok(())
}

#[tokio::test]
async fn test_landing_redirects_to_stored_paste() -> anyhow::Result<()> {
    let app = TestApp::new()?;
    app.server.post("/paste").text("hello").await.assert_status_ok();

    let response = app.server.get("/").await;
    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), format!("/{}", HELLO_SHORT_KEY));

    Ok(())
}

#[tokio::test]
async fn test_counter_landing_redirects_to_highest_id() -> anyhow::Result<()> {
    let app = TestApp::with_scheme("counter")?;
    for text in ["a", "b", "c"] {
        app.server.post("/paste").text(text).await.assert_status_ok();
    }

    let response = app.server.get("/").await;
    response.assert_status(StatusCode::FOUND);
    assert_eq!(response.header("location"), "/3");

    Ok(())
}

#[tokio::test]
async fn test_landing_skips_expired_pastes() -> anyhow::Result<()> {
    let (state, clock, temp_dir) = expiring_state(Duration::from_secs(60))?;
    let app = TestApp::from_state(state, temp_dir)?;

    app.server.post("/paste").text("hello").await.assert_status_ok();
    clock.advance(Duration::from_secs(120));

    app.server.get("/").await.assert_status_ok();

    Ok(())
}

// =============================================================================
// Webhook
// =============================================================================

async fn record_hook(
    State(tx): State<mpsc::UnboundedSender<(Option<String>, String)>>,
    headers: HeaderMap,
    body: String,
) {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let _ = tx.send((content_type, body));
}

#[tokio::test]
async fn test_webhook_receives_paste_url() -> anyhow::Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let hook = Router::new().route("/hook", post(record_hook)).with_state(tx);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, hook).await;
    });

    let (state, _clock, temp_dir) = expiring_state(pastebin::DEFAULT_TTL)?;
    let state = state
        .with_public_host("paste.example.com")
        .with_webhook(Webhook::new(format!("http://{}/hook", addr), 5)?);
    let app = TestApp::from_state(state, temp_dir)?;

    app.server.post("/paste").text("hello").await.assert_status_ok();

    let (content_type, body) = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await?
        .ok_or_else(|| anyhow::anyhow!("webhook channel closed"))?;
    assert_eq!(
        content_type.as_deref(),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(body, format!("http://paste.example.com/{}\n", HELLO_SHORT_KEY));

    Ok(())
}

#[tokio::test]
async fn test_unreachable_webhook_does_not_fail_submission() -> anyhow::Result<()> {
    let (state, _clock, temp_dir) = expiring_state(pastebin::DEFAULT_TTL)?;
    // Port 9 (discard) on localhost is expected to refuse connections.
    let state = state.with_webhook(Webhook::new("http://127.0.0.1:9/hook", 1)?);
    let app = TestApp::from_state(state, temp_dir)?;

    app.server.post("/paste").text("hello").await.assert_status_ok();
    app.server
        .get(&format!("/{}", HELLO_SHORT_KEY))
        .await
        .assert_status_ok();

    Ok(())
}
