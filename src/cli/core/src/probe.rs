/* src/cli/core/src/probe.rs */

// The client-side completion path, run against a live server: optionally
// capture through the server, wait out the debounce, then evaluate the region
// from the query endpoint and the resulting cookie jar.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use flu_engine::{
  CAPTURED_COOKIE, ClientEvaluator, CompletionEvaluator, PageId, ProgressRecord, Region,
  RegionPagesResponse, Tally, write_set,
};
use reqwest::header::{COOKIE, SET_COOKIE};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::ui;

pub struct ProbeArgs {
  pub url: String,
  pub region: String,
  pub language: String,
  pub captured: Vec<PageId>,
  pub capture: Option<PageId>,
  pub debounce_ms: u64,
}

#[derive(Deserialize)]
struct Envelope<T> {
  ok: bool,
  data: Option<T>,
  error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
  code: String,
  message: String,
}

#[derive(Deserialize)]
struct CaptureData {
  region_complete: bool,
}

fn unwrap_envelope<T>(envelope: Envelope<T>, what: &str) -> Result<T> {
  match (envelope.ok, envelope.data, envelope.error) {
    (true, Some(data), _) => Ok(data),
    (_, _, Some(err)) => bail!("{what}: {} {}", err.code, err.message),
    _ => bail!("{what}: malformed response"),
  }
}

/// Client-side cookie jar: later `Set-Cookie` lines win, expirations delete.
#[derive(Default)]
struct Jar(BTreeMap<String, String>);

impl Jar {
  fn absorb(&mut self, headers: &reqwest::header::HeaderMap) {
    for line in headers.get_all(SET_COOKIE).iter().filter_map(|v| v.to_str().ok()) {
      let Some((name, value)) = line.split(';').next().and_then(|p| p.split_once('=')) else {
        continue;
      };
      if line.contains("Max-Age=0") {
        self.0.remove(name.trim());
      } else {
        self.0.insert(name.trim().to_string(), value.to_string());
      }
    }
  }

  fn header(&self) -> String {
    self.0.iter().map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>().join("; ")
  }
}

async fn read_envelope<T: DeserializeOwned>(resp: reqwest::Response, what: &str) -> Result<T> {
  let envelope: Envelope<T> =
    resp.json().await.with_context(|| format!("{what}: response is not JSON"))?;
  unwrap_envelope(envelope, what)
}

pub async fn run_probe(args: &ProbeArgs) -> Result<()> {
  ui::banner("probe");
  let region = Region::parse(&args.region, &args.language)?;
  let base = args.url.trim_end_matches('/');
  let client = reqwest::Client::new();

  let mut jar = Jar::default();
  if !args.captured.is_empty() {
    let set: BTreeSet<PageId> = args.captured.iter().copied().collect();
    jar.0.insert(CAPTURED_COOKIE.to_string(), write_set(&set));
  }

  let mut server_says = None;
  if let Some(page_id) = args.capture {
    let url = format!("{base}/_flu/capture");
    ui::arrow(&format!("POST {url} page {page_id}"));
    let resp = client
      .post(&url)
      .header(COOKIE, jar.header())
      .json(&serde_json::json!({ "page_id": page_id }))
      .send()
      .await
      .with_context(|| format!("failed to reach {url}"))?;
    jar.absorb(resp.headers());
    let data: CaptureData = read_envelope(resp, "capture").await?;
    ui::detail(&format!("server verdict: complete = {}", data.region_complete));
    server_says = Some(data.region_complete);
  }

  if args.debounce_ms > 0 {
    ui::arrow(&format!("waiting {} ms", args.debounce_ms));
    tokio::time::sleep(Duration::from_millis(args.debounce_ms)).await;
  }

  // Region keys are slugs, so the query needs no escaping.
  let url = format!("{base}/_flu/region-pages?region={}&language={}", region.key, region.language);
  ui::arrow(&format!("GET {url}"));
  let resp = client
    .get(&url)
    .send()
    .await
    .with_context(|| format!("failed to reach {url}"))?;
  let response: RegionPagesResponse = read_envelope(resp, "region-pages").await?;
  let members = response.region_pages.clone();

  let record = ProgressRecord::from_cookie_header(&jar.header());
  let tally = Tally::of(&members, &record.captured);
  let (client_says, record) = ClientEvaluator::new(response).evaluate(&region, record);
  ui::detail(&format!("{}/{} member pages captured", tally.matched, tally.total));

  if client_says {
    ui::ok(&format!("{region} complete (flag {})", region.completion_cookie()));
  } else {
    ui::warn(&format!("{region} incomplete"));
  }
  tracing::debug!(completed = record.completed.len(), "client record settled");

  if let Some(server_says) = server_says
    && server_says != client_says
  {
    bail!("server and client disagree: server {server_says}, client {client_says}");
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn jar_applies_set_cookie_lines() {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.append(SET_COOKIE, "flu_captured_pages=%5B10%5D; Path=/; Max-Age=31536000".parse().unwrap());
    headers.append(SET_COOKIE, "arga_completado=si; Path=/; Max-Age=31536000".parse().unwrap());
    let mut jar = Jar::default();
    jar.0.insert("flu_visited_pages".into(), "%5B1%5D".into());
    jar.absorb(&headers);
    assert_eq!(
      jar.header(),
      "arga_completado=si; flu_captured_pages=%5B10%5D; flu_visited_pages=%5B1%5D"
    );

    let mut expire = reqwest::header::HeaderMap::new();
    expire.append(SET_COOKIE, "arga_completado=; Path=/; Max-Age=0".parse().unwrap());
    jar.absorb(&expire);
    assert!(!jar.0.contains_key("arga_completado"));
  }

  #[test]
  fn envelope_errors_surface_code() {
    let env: Envelope<RegionPagesResponse> = serde_json::from_str(
      r#"{"ok": false, "error": {"code": "VALIDATION_ERROR", "message": "bad", "transient": false}}"#,
    )
    .unwrap();
    let err = unwrap_envelope(env, "region-pages").unwrap_err();
    assert!(err.to_string().contains("VALIDATION_ERROR"));
  }

  #[test]
  fn envelope_data_is_returned() {
    let env: Envelope<CaptureData> =
      serde_json::from_str(r#"{"ok": true, "data": {"region_complete": true}}"#).unwrap();
    assert!(unwrap_envelope(env, "capture").unwrap().region_complete);
  }
}
