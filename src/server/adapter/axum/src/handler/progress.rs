/* src/server/adapter/axum/src/handler/progress.rs */

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use flu_engine::{IndexedEvaluator, PageId, Tally};
use flu_server::{FluError, progress_cookies, read_record};
use serde::Deserialize;

use super::{AppState, cookie_header, with_cookies};
use crate::error::AxumError;

#[derive(Deserialize)]
struct PageBody {
  page_id: PageId,
}

fn known_page(state: &AppState, body: &[u8]) -> Result<PageId, FluError> {
  let PageBody { page_id } = serde_json::from_slice(body)
    .map_err(|_| FluError::validation("request body must be {\"page_id\": <integer>}"))?;
  if state.site.pages.get(page_id).is_none() {
    return Err(FluError::not_found(format!("page {page_id} not found")));
  }
  Ok(page_id)
}

pub(super) async fn handle_visit(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  body: axum::body::Bytes,
) -> Result<Response, AxumError> {
  let page_id = known_page(&state, &body)?;
  let before = read_record(cookie_header(&headers).as_deref());
  let mut after = before.clone();
  let newly_visited = after.mark_visited(page_id);

  let data = serde_json::json!({
    "page_id": page_id,
    "newly_visited": newly_visited,
    "visited": after.visited,
  });
  let response = axum::Json(serde_json::json!({"ok": true, "data": data})).into_response();
  Ok(with_cookies(response, &progress_cookies(&before, &after)))
}

/// Record a capture and settle the page's region. Completion flags are only
/// ever written from the server side.
pub(super) async fn handle_capture(
  State(state): State<Arc<AppState>>,
  headers: HeaderMap,
  body: axum::body::Bytes,
) -> Result<Response, AxumError> {
  let page_id = known_page(&state, &body)?;
  let before = read_record(cookie_header(&headers).as_deref());
  let region = state.index.region_of(page_id).cloned();
  let evaluator = IndexedEvaluator::new(&state.index);
  let outcome = state.trigger.capture(page_id, region.as_ref(), &evaluator, before.clone());

  let tally = region
    .as_ref()
    .map(|r| Tally::of(&state.index.resolve_region_pages(r), &outcome.record.captured));
  let data = serde_json::json!({
    "page_id": page_id,
    "state": outcome.state,
    "newly_captured": outcome.newly_captured,
    "region": region.as_ref().map(|r| &r.key),
    "language": region.as_ref().map(|r| r.language),
    "region_complete": outcome.region_complete,
    "tally": tally,
  });
  let response = axum::Json(serde_json::json!({"ok": true, "data": data})).into_response();
  Ok(with_cookies(response, &progress_cookies(&before, &outcome.record)))
}
