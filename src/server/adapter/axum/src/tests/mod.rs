/* src/server/adapter/axum/src/tests/mod.rs */


use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use flu_server::{HuntServer, HuntSettings, parse_site};
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::IntoAxumRouter;

pub(super) const SECRET: &str = "test-secret";

/// `/virus/arga/` has members 10, 11, 12; `/eu/virus/arga/` has member 20;
/// `ultzama` is configured but has no parent page in either language.
pub(super) const SITE: &str = r#"{"pages": [
  {"id": 1, "slug": "virus", "url": "/virus/", "title": "Virus"},
  {"id": 3, "slug": "arga", "parent": 1, "url": "/virus/arga/", "title": "Arga"},
  {"id": 10, "slug": "molino", "parent": 3, "title": "Molino", "content": "<p>Molino de Caparroso</p>"},
  {"id": 11, "slug": "puente", "parent": 3, "title": "Puente"},
  {"id": 12, "slug": "presa", "parent": 3, "title": "Presa"},
  {"id": 4, "slug": "virus", "url": "/eu/virus/", "language": "eu"},
  {"id": 5, "slug": "arga", "parent": 4, "language": "eu", "title": "Arga"},
  {"id": 20, "slug": "zubia", "parent": 5, "language": "eu", "title": "Zubia"},
  {"id": 99, "slug": "noticias", "url": "/noticias/", "title": "Noticias"}
]}"#;

pub(super) fn settings() -> HuntSettings {
  HuntSettings {
    known_regions: vec!["ultzama".into()],
    reset_extra_cookies: vec!["flu_camera_permission".into()],
    ..Default::default()
  }
}

pub(super) fn router_with(settings: HuntSettings) -> Router {
  let site = parse_site(SITE).unwrap();
  HuntServer::new(site).settings(settings).nonce_secret(SECRET).into_axum_router()
}

pub(super) fn router() -> Router {
  router_with(settings())
}

pub(super) struct Reply {
  pub status: StatusCode,
  pub headers: HeaderMap,
  pub body: String,
}

impl Reply {
  pub fn json(&self) -> serde_json::Value {
    serde_json::from_str(&self.body).unwrap()
  }

  pub fn set_cookies(&self) -> Vec<String> {
    self
      .headers
      .get_all(header::SET_COOKIE)
      .iter()
      .map(|v| v.to_str().unwrap().to_string())
      .collect()
  }

  /// `Set-Cookie` value for `name`, without attributes.
  pub fn cookie(&self, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    self.set_cookies().into_iter().find_map(|line| {
      let pair = line.split(';').next()?.to_string();
      pair.strip_prefix(&prefix).map(str::to_string)
    })
  }
}

pub(super) async fn send(router: &Router, req: Request<Body>) -> Reply {
  let resp = router.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let headers = resp.headers().clone();
  let bytes = resp.into_body().collect().await.unwrap().to_bytes();
  Reply { status, headers, body: String::from_utf8(bytes.to_vec()).unwrap() }
}

pub(super) fn get(uri: &str, cookies: Option<&str>) -> Request<Body> {
  let mut req = Request::get(uri);
  if let Some(c) = cookies {
    req = req.header(header::COOKIE, c);
  }
  req.body(Body::empty()).unwrap()
}

pub(super) fn post(uri: &str, body: &str, cookies: Option<&str>) -> Request<Body> {
  let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
  if let Some(c) = cookies {
    req = req.header(header::COOKIE, c);
  }
  req.body(Body::from(body.to_string())).unwrap()
}
