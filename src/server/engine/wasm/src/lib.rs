/* src/server/engine/wasm/src/lib.rs */

// Browser-side half of the hunt. The page script reads `document.cookie`,
// calls into these functions, and applies the returned cookies itself.

use flu_engine::{
  CAPTURED_COOKIE, COMPLETION_FLAG_VALUE, COOKIE_MAX_AGE_SECS, CaptureTrigger, ClientEvaluator,
  CompletionEvaluator, ProgressRecord, Region, RegionPagesResponse, SyncOptions, Tally,
};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct CookieWrite {
  name: String,
  value: String,
  max_age: u64,
}

impl CookieWrite {
  fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
    Self { name: name.into(), value: value.into(), max_age: COOKIE_MAX_AGE_SECS }
  }
}

#[derive(Serialize)]
struct Evaluation {
  complete: bool,
  #[serde(flatten)]
  tally: Tally,
  set_cookies: Vec<CookieWrite>,
}

#[derive(Serialize)]
struct Capture {
  captured: bool,
  set_cookies: Vec<CookieWrite>,
}

fn error_json(message: impl std::fmt::Display) -> String {
  serde_json::json!({ "error": message.to_string() }).to_string()
}

/// Accept either the bare payload or the `{ok, data}` envelope the endpoint returns.
fn parse_region_pages(response_json: &str) -> Result<RegionPagesResponse, String> {
  let value: Value = serde_json::from_str(response_json).map_err(|e| e.to_string())?;
  let payload = match value.get("data") {
    Some(data) => data.clone(),
    None => value,
  };
  serde_json::from_value(payload).map_err(|e| e.to_string())
}

/// Evaluate region completion from a region-pages response and the client's cookies.
#[wasm_bindgen]
pub fn evaluate_completion(
  region: &str,
  language: &str,
  response_json: &str,
  cookie_header: &str,
) -> String {
  let region = match Region::parse(region, language) {
    Ok(r) => r,
    Err(e) => return error_json(e),
  };
  let response = match parse_region_pages(response_json) {
    Ok(r) => r,
    Err(e) => return error_json(e),
  };
  let record = ProgressRecord::from_cookie_header(cookie_header);
  let tally = Tally::of(&response.region_pages, &record.captured);

  let (complete, _) = ClientEvaluator::new(response).evaluate(&region, record);
  let set_cookies = if complete {
    vec![CookieWrite::new(region.completion_cookie(), COMPLETION_FLAG_VALUE)]
  } else {
    Vec::new()
  };

  serde_json::to_string(&Evaluation { complete, tally, set_cookies })
    .unwrap_or_else(error_json)
}

/// Record a capture if `hash` names the anchor. The returned cookie value is
/// the union of the jar's captured set and `page_id`.
#[wasm_bindgen]
pub fn capture(page_id: u64, hash: &str, anchor: &str, cookie_header: &str) -> String {
  let trigger = CaptureTrigger::new(anchor);
  if !trigger.in_hash(hash) {
    return serde_json::to_string(&Capture { captured: false, set_cookies: Vec::new() })
      .unwrap_or_else(error_json);
  }
  let mut record = ProgressRecord::from_cookie_header(cookie_header);
  record.mark_captured(page_id);
  let set_cookies = vec![CookieWrite::new(CAPTURED_COOKIE, flu_engine::write_set(&record.captured))];
  serde_json::to_string(&Capture { captured: true, set_cookies }).unwrap_or_else(error_json)
}

#[wasm_bindgen]
pub fn is_capture_hash(hash: &str, anchor: &str) -> bool {
  CaptureTrigger::new(anchor).in_hash(hash)
}

/// Re-apply visited/captured decoration to markup already in the page.
#[wasm_bindgen]
pub fn decorate_progress(
  html: &str,
  cookie_header: &str,
  marker: &str,
  anchor: &str,
  site_url: &str,
) -> String {
  let record = ProgressRecord::from_cookie_header(cookie_header);
  let opts = SyncOptions {
    marker: marker.to_string(),
    anchor: anchor.trim_start_matches('#').to_string(),
    site_url: (!site_url.is_empty()).then(|| site_url.to_string()),
  };
  flu_engine::decorate(html, &record, &opts)
}

#[wasm_bindgen]
pub fn client_debounce_ms() -> u64 {
  flu_engine::DEFAULT_CLIENT_DEBOUNCE_MS
}
