/* src/server/adapter/axum/src/handler/reset.rs */

use std::sync::Arc;
use std::time::SystemTime;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use flu_server::{FluError, RESET_ACTION, reset_cookies};
use serde::Deserialize;

use super::{AppState, cookie_header, with_cookies};
use crate::error::AxumError;

#[derive(Deserialize)]
struct ResetBody {
  #[serde(default)]
  nonce: String,
}

/// Wipe all hunt progress. A bad or stale nonce changes nothing.
pub(super) async fn handle_reset(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  body: axum::body::Bytes,
) -> Result<Response, AxumError> {
  let ResetBody { nonce } = serde_json::from_slice(&body)
    .map_err(|_| FluError::validation("request body must be {\"nonce\": <string>}"))?;
  if !state.nonce.verify(RESET_ACTION, &nonce, SystemTime::now()) {
    tracing::warn!("reset rejected: invalid nonce");
    return Err(FluError::forbidden("invalid or expired reset token").into());
  }

  let cookies = reset_cookies(
    cookie_header(&headers).as_deref(),
    state.index.known_regions(),
    &state.settings.reset_extra_cookies,
  );
  tracing::info!(cleared = cookies.len(), "progress reset");
  let cleared: Vec<&str> = cookies.iter().map(|c| c.name.as_str()).collect();
  let response =
    axum::Json(serde_json::json!({"ok": true, "data": {"cleared": cleared}})).into_response();
  Ok(with_cookies(response, &cookies))
}
