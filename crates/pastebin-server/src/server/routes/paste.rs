//! Paste submission, display and landing handlers.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{
        HeaderMap, StatusCode,
        header::{CONTENT_TYPE, HOST, LOCATION},
    },
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{debug, info, instrument};

use pastebin::{Landing, landing as pick_landing, resolve};

use super::super::{
    error::ApiError,
    render::{paste_page, welcome_page},
    state::AppState,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Body of the welcome page's form.
#[derive(Debug, Deserialize)]
struct PasteForm {
    text: Option<String>,
}

/// Store the request payload and answer with its URL.
#[instrument(skip_all, fields(bytes = body.len()))]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let payload = payload_from(&headers, body);
    let key = state.store().submit(&payload)?;

    let host = state.url_host(header_str(&headers, HOST));
    let url = format!("http://{}/{}\n", host, key);
    info!(key = %key, "paste created");

    if let Some(webhook) = state.webhook() {
        webhook.notify(url.clone());
    }

    Ok(([(CONTENT_TYPE, "text/plain; charset=utf-8")], url).into_response())
}

/// Show the paste stored under `key`.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Html<String>, ApiError> {
    let payload = resolve(state.store(), &key)?;
    debug!(bytes = payload.len(), "found paste");
    Ok(Html(paste_page(&payload).into_string()))
}

/// Redirect to the latest paste, or show the welcome page when there is none.
#[instrument(skip(state))]
pub async fn landing(State(state): State<AppState>) -> Result<Response, ApiError> {
    match pick_landing(state.store())? {
        Landing::Redirect(key) => {
            debug!(key = %key, "redirecting to latest paste");
            let location = format!("/{}", key);
            Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
        }
        Landing::Welcome => {
            debug!("empty store");
            let page = welcome_page(&state.endpoint_path());
            Ok(Html(page.into_string()).into_response())
        }
    }
}

/// The submitted payload: the form's `text` field when the request is a
/// form carrying one, the raw body otherwise.
fn payload_from(headers: &HeaderMap, body: Bytes) -> Bytes {
    let is_form = header_str(headers, CONTENT_TYPE)
        .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));
    if !is_form {
        return body;
    }

    match serde_urlencoded::from_bytes::<PasteForm>(&body) {
        Ok(PasteForm { text: Some(text) }) => Bytes::from(text),
        _ => body,
    }
}

fn header_str(headers: &HeaderMap, name: axum::http::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}
