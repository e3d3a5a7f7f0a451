/* src/server/adapter/axum/src/handler/page.rs */

use std::sync::Arc;
use std::time::SystemTime;

use axum::extract::State;
use axum::http::{HeaderMap, Method, Uri};
use axum::response::{Html, IntoResponse, Response};
use flu_engine::{
  CaptureState, CompletionEvaluator, IndexedEvaluator, Language, Page, ProgressRecord, Region,
  decorate, script_safe_json,
};
use flu_server::{FluError, RESET_ACTION, page_report, progress_cookies, read_record};

use super::{AppState, CAPTURE_ROUTE, REGION_PAGES_ROUTE, RESET_ROUTE, cookie_header, with_cookies};
use crate::error::AxumError;

pub(crate) const DATA_SCRIPT_ID: &str = "__flu_data";

fn escape_html(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      _ => out.push(ch),
    }
  }
  out
}

fn language_of(page: &Page, region: Option<&Region>) -> Language {
  match region {
    Some(r) => r.language,
    None if page.url_path.starts_with("/eu/") => Language::Eu,
    None => Language::Es,
  }
}

/// Unstyled list of the region's member pages, marked for progress decoration.
fn progress_list(state: &AppState, region: &Region) -> String {
  let mut html = format!(
    r#"<ul class="{}" data-region="{}" data-language="{}">"#,
    escape_html(&state.sync.marker),
    region.key,
    region.language
  );
  for id in state.index.resolve_region_pages(region) {
    let Some(member) = state.site.pages.get(id) else { continue };
    let title = if member.title.is_empty() { &member.slug } else { &member.title };
    html.push_str(&format!(
      r#"<li data-page-id="{id}"><a href="{}">{}</a></li>"#,
      escape_html(&member.url_path),
      escape_html(title)
    ));
  }
  html.push_str("</ul>");
  html
}

struct RenderState<'a> {
  page: &'a Page,
  region: Option<&'a Region>,
  capture: CaptureState,
  region_complete: bool,
}

fn script_data(state: &AppState, render: &RenderState<'_>) -> serde_json::Value {
  serde_json::json!({
    "page_id": render.page.id,
    "region": render.region.map(|r| &r.key),
    "language": language_of(render.page, render.region),
    "capture_state": render.capture,
    "region_complete": render.region_complete,
    "capture_anchor": state.trigger.anchor(),
    "debounce_ms": state.settings.client_debounce_ms,
    "reset_nonce": state.nonce.create(RESET_ACTION, SystemTime::now()),
    "endpoints": {
      "region_pages": REGION_PAGES_ROUTE,
      "capture": CAPTURE_ROUTE,
      "reset": RESET_ROUTE,
    },
  })
}

fn render_html(state: &AppState, render: &RenderState<'_>, record: &ProgressRecord) -> String {
  let page = render.page;
  let title = escape_html(if page.title.is_empty() { &page.slug } else { &page.title });
  let lang = language_of(page, render.region);
  let list = render.region.map(|r| progress_list(state, r)).unwrap_or_default();

  let json = serde_json::to_string(&script_data(state, render)).unwrap_or_default();
  let html = format!(
    concat!(
      r#"<!DOCTYPE html><html lang="{lang}"><head><meta charset="utf-8"><title>{title}</title></head>"#,
      r#"<body><main data-page-id="{id}"><h1>{title}</h1>{body}</main>{list}"#,
      r#"<script id="{script_id}" type="application/json">{data}</script></body></html>"#,
    ),
    lang = lang,
    title = title,
    id = page.id,
    body = state.site.body(page.id),
    list = list,
    script_id = DATA_SCRIPT_ID,
    data = script_safe_json(&json),
  );
  decorate(&html, record, &state.sync)
}

/// Render a content page: record the visit, capture when the request names
/// the capture anchor, settle the region, and reflect progress in the markup.
pub(super) async fn handle_page(
  State(state): State<Arc<AppState>>,
  method: Method,
  uri: Uri,
  headers: HeaderMap,
) -> Result<Response, AxumError> {
  if method != Method::GET {
    return Err(FluError::not_found("Not found").into());
  }
  let page = state
    .site
    .pages
    .find_by_path(uri.path())
    .ok_or_else(|| FluError::not_found(format!("no page at {}", uri.path())))?;
  let before = read_record(cookie_header(&headers).as_deref());
  let region = state.index.region_of(page.id);

  if state.settings.wants_debug(uri.query()) {
    let report = page_report(&state.site.pages, &state.index, page.id, &before);
    return Ok(axum::Json(serde_json::json!({"ok": true, "data": report})).into_response());
  }

  let mut record = before.clone();
  record.mark_visited(page.id);

  let evaluator = IndexedEvaluator::new(&state.index);
  let request_uri = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or_else(|| uri.path());
  let (capture, region_complete, record) = if state.trigger.in_request_uri(request_uri) {
    let outcome = state.trigger.capture(page.id, region, &evaluator, record);
    (outcome.state, outcome.region_complete, outcome.record)
  } else if let Some(region) = region {
    // Flags may lag behind captures made elsewhere; settle on every view.
    let (complete, record) = evaluator.evaluate(region, record);
    let capture = if record.captured.contains(&page.id) {
      CaptureState::Captured
    } else {
      CaptureState::Idle
    };
    (capture, complete, record)
  } else {
    (CaptureState::Idle, false, record)
  };

  let render = RenderState { page, region, capture, region_complete };
  let html = render_html(&state, &render, &record);
  Ok(with_cookies(Html(html).into_response(), &progress_cookies(&before, &record)))
}
