/* src/server/adapter/axum/src/handler/mod.rs */

mod page;
mod progress;
mod region;
mod reset;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::Response;
use axum::routing::{get, post};
use flu_engine::{CaptureTrigger, RegionIndex, SyncOptions};
use flu_server::{HuntParts, HuntSettings, NonceKeeper, SetCookie, Site};
use time::OffsetDateTime;
use tower_http::trace::TraceLayer;

pub(crate) const REGION_PAGES_ROUTE: &str = "/_flu/region-pages";
pub(crate) const VISIT_ROUTE: &str = "/_flu/visit";
pub(crate) const CAPTURE_ROUTE: &str = "/_flu/capture";
pub(crate) const RESET_ROUTE: &str = "/_flu/reset";

pub(crate) struct AppState {
  pub site: Site,
  pub index: RegionIndex,
  pub settings: HuntSettings,
  pub nonce: NonceKeeper,
  pub trigger: CaptureTrigger,
  pub sync: SyncOptions,
}

pub(crate) fn build_router(parts: HuntParts) -> Router {
  let HuntParts { site, index, settings, nonce } = parts;
  let state = Arc::new(AppState {
    trigger: settings.trigger(),
    sync: settings.sync_options(),
    site,
    index,
    settings,
    nonce,
  });

  // Everything outside /_flu/* is a content page, so pages go through the
  // fallback rather than claiming routes of their own.
  Router::new()
    .route(REGION_PAGES_ROUTE, get(region::handle_region_pages))
    .route(VISIT_ROUTE, post(progress::handle_visit))
    .route(CAPTURE_ROUTE, post(progress::handle_capture))
    .route(RESET_ROUTE, post(reset::handle_reset))
    .fallback(page::handle_page)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

/// Every `Cookie:` header of the request, joined. HTTP/2 clients may split
/// the jar across several headers.
pub(super) fn cookie_header(headers: &HeaderMap) -> Option<String> {
  let parts: Vec<&str> =
    headers.get_all(header::COOKIE).iter().filter_map(|v| v.to_str().ok()).collect();
  (!parts.is_empty()).then(|| parts.join("; "))
}

/// Append one `Set-Cookie` header per cookie.
pub(super) fn with_cookies(mut response: Response, cookies: &[SetCookie]) -> Response {
  let now = OffsetDateTime::now_utc();
  for cookie in cookies {
    match HeaderValue::from_str(&cookie.header_value(now)) {
      Ok(value) => {
        response.headers_mut().append(header::SET_COOKIE, value);
      }
      Err(e) => tracing::error!(cookie = %cookie.name, %e, "unrepresentable Set-Cookie value"),
    }
  }
  response
}
