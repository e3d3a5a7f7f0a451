/* src/cli/core/src/config/loader.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use super::types::FluConfig;

pub const CONFIG_FILE: &str = "flu.toml";

/// Walk upward from `start` to find `flu.toml`, like Cargo.toml discovery
pub fn find_flu_config(start: &Path) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  loop {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      bail!("{CONFIG_FILE} not found (searched upward from {})", start.display());
    }
  }
}

pub fn parse_flu_config(content: &str) -> Result<FluConfig> {
  let config: FluConfig = toml::from_str(content)?;
  config.validate()?;
  Ok(config)
}

/// Read, apply environment overrides, validate.
pub fn load_flu_config(path: &Path) -> Result<FluConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let mut config: FluConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
  apply_overrides(&mut config, |key| std::env::var(key).ok())?;
  config.validate().with_context(|| format!("invalid {}", path.display()))?;
  Ok(config)
}

/// `FLU_NONCE_SECRET` replaces the configured secret, `PORT` the port.
pub fn apply_overrides(
  config: &mut FluConfig,
  lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
  if let Some(secret) = lookup("FLU_NONCE_SECRET").filter(|s| !s.is_empty()) {
    config.security.nonce_secret = secret;
  }
  if let Some(port) = lookup("PORT") {
    config.server.port = port.trim().parse().with_context(|| format!("PORT=\"{port}\" is not a port"))?;
  }
  Ok(())
}

impl FluConfig {
  pub fn validate(&self) -> Result<()> {
    if self.content.pages.trim().is_empty() {
      bail!("content.pages must not be empty");
    }
    for key in &self.game.regions {
      flu_engine::Region::new(key, flu_engine::Language::Es)
        .with_context(|| format!("game.regions contains \"{key}\""))?;
    }
    if self.game.capture_anchor.trim_start_matches('#').is_empty() {
      bail!("game.capture_anchor must not be empty");
    }
    if self.game.progress_marker.is_empty()
      || self.game.progress_marker.contains(char::is_whitespace)
    {
      bail!("game.progress_marker must be a single class name");
    }
    if self.game.max_pages == 0 || self.game.max_children == 0 {
      bail!("game.max_pages and game.max_children must be positive");
    }
    if self.security.nonce_lifetime_secs < 2 {
      bail!("security.nonce_lifetime_secs must be at least 2");
    }
    if self.debug.query_flag.is_empty() {
      bail!("debug.query_flag must not be empty");
    }
    if let Some(url) = &self.server.site_url
      && !(url.starts_with("http://") || url.starts_with("https://"))
    {
      bail!("server.site_url \"{url}\" must start with http:// or https://");
    }
    Ok(())
  }
}
