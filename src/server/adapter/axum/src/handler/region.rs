/* src/server/adapter/axum/src/handler/region.rs */

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use flu_engine::{Region, RegionPagesResponse};
use flu_server::FluError;
use serde::Deserialize;

use super::AppState;
use crate::error::AxumError;

#[derive(Deserialize)]
pub(super) struct RegionQuery {
  region: Option<String>,
  language: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String, FluError> {
  value
    .map(|v| v.trim().to_string())
    .filter(|v| !v.is_empty())
    .ok_or_else(|| FluError::validation(format!("missing query parameter '{name}'")))
}

/// Member page ids of a region, for the client-side evaluator.
pub(super) async fn handle_region_pages(
  State(state): State<Arc<AppState>>,
  query: Result<Query<RegionQuery>, QueryRejection>,
) -> Result<Response, AxumError> {
  let Query(query) = query.map_err(|e| FluError::validation(e.body_text()))?;
  let key = required(query.region, "region")?;
  let language = required(query.language, "language")?;
  let region = Region::parse(&key, &language)?;

  let members = state.index.resolve_region_pages(&region);
  tracing::debug!(%region, total = members.len(), "region pages queried");
  let data = RegionPagesResponse::new(&region, members);
  Ok(axum::Json(serde_json::json!({"ok": true, "data": data})).into_response())
}
