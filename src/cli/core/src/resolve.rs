/* src/cli/core/src/resolve.rs */

use std::path::Path;

use anyhow::Result;
use flu_engine::{CompletionEvaluator, IndexedEvaluator, ParentMatch, Region};
use flu_server::{HuntServer, read_record, region_report};

use crate::config::FluConfig;
use crate::{load_site, ui};

/// Show how a region resolves against the content export, optionally
/// evaluated against a client's `Cookie:` header.
pub fn run_resolve(
  config: &FluConfig,
  base_dir: &Path,
  region: &str,
  language: &str,
  cookies: Option<&str>,
  as_json: bool,
) -> Result<()> {
  let region = Region::parse(region, language)?;
  let site = load_site(config, base_dir)?;
  let parts = HuntServer::new(site).settings(config.hunt_settings()).into_parts();
  let record = read_record(cookies);
  let report = region_report(&parts.site.pages, &parts.index, &region, &record);

  if as_json {
    ui::json(&serde_json::to_value(&report)?);
    return Ok(());
  }

  ui::banner("resolve");
  ui::arrow(&format!("{region}  root {}  flag {}", report.root_path, report.completion_cookie));
  if report.candidates.is_empty() {
    ui::fail("no parent page; region resolves to no members");
    return Ok(());
  }
  for candidate in &report.candidates {
    let how = match candidate.matched_by {
      ParentMatch::ExactPath => "exact path",
      ParentMatch::Slug => "slug",
    };
    let Some(page) = candidate.page else { continue };
    let line = format!("#{} {} ({how})", page.id, page.url_path);
    if candidate.chosen { ui::ok(&line) } else { ui::detail(&line) }
  }
  for member in &report.members {
    let title = member.page.map_or("", |p| p.title.as_str());
    let line = format!("#{} {title}", member.id);
    if member.captured { ui::detail_ok(&line) } else { ui::detail(&line) }
  }
  ui::blank();
  ui::arrow(&format!("{}/{} captured", report.tally.matched, report.tally.total));
  if cookies.is_some() {
    let (complete, _) = IndexedEvaluator::new(&parts.index).evaluate(&region, record);
    if complete { ui::ok("region complete") } else { ui::warn("region incomplete") }
  }
  Ok(())
}
