/* src/cli/core/src/check.rs */

use std::path::Path;

use anyhow::{Result, bail};
use flu_server::HuntServer;

use crate::config::FluConfig;
use crate::{load_site, ui};

/// Validate the config and content export, and report every region's resolution.
pub fn run_check(config: &FluConfig, base_dir: &Path) -> Result<()> {
  ui::banner("check");
  ui::ok("config valid");
  let site = load_site(config, base_dir)?;
  ui::ok(&format!("{} pages loaded", site.pages.len()));
  if site.pages.len() > config.game.max_pages {
    ui::warn(&format!(
      "{} pages exceed game.max_pages = {}; trailing pages are ignored",
      site.pages.len(),
      config.game.max_pages
    ));
  }

  let parts = HuntServer::new(site).settings(config.hunt_settings()).into_parts();
  let mut unresolved = Vec::new();
  for region in parts.index.known_regions() {
    let candidates = parts.index.candidates(region);
    let members = parts.index.resolve_region_pages(region);
    match candidates.first() {
      None => {
        ui::fail(&format!("{region}: no parent page at {}", region.root_path()));
        unresolved.push(region.to_string());
      }
      Some(parent) => {
        ui::ok(&format!("{region}: parent #{} with {} members", parent.page_id, members.len()));
        if candidates.len() > 1 {
          ui::detail(&format!("{} candidates, lowest id with best match wins", candidates.len()));
        }
        if members.is_empty() {
          ui::warn(&format!("{region} has no member pages and can never complete"));
        }
        if members.len() == config.game.max_children {
          ui::warn(&format!("{region} hit game.max_children; extra children are ignored"));
        }
      }
    }
  }

  // Configured regions must resolve in at least one language.
  let missing: Vec<&String> = config
    .game
    .regions
    .iter()
    .filter(|key| parts.index.regions().all(|r| &r.key != *key))
    .collect();
  if !missing.is_empty() {
    bail!("configured regions without any parent page: {missing:?}");
  }
  if !unresolved.is_empty() {
    ui::blank();
    ui::warn(&format!("{} region/language pairs unresolved", unresolved.len()));
  }
  Ok(())
}
