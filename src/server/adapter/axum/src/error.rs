/* src/server/adapter/axum/src/error.rs */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use flu_server::FluError;

/// `FluError` rendered as the JSON error envelope. Error responses never
/// carry `Set-Cookie`.
pub(crate) struct AxumError(pub FluError);

impl IntoResponse for AxumError {
  fn into_response(self) -> Response {
    let err = self.0;
    let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = serde_json::json!({
      "ok": false,
      "error": {
        "code": err.code(),
        "message": err.message(),
        "transient": false,
      }
    });
    (status, axum::Json(body)).into_response()
  }
}

impl From<FluError> for AxumError {
  fn from(err: FluError) -> Self {
    Self(err)
  }
}

impl From<flu_engine::ParseError> for AxumError {
  fn from(err: flu_engine::ParseError) -> Self {
    Self(err.into())
  }
}
