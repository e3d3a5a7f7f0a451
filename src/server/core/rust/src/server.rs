/* src/server/core/rust/src/server.rs */

use flu_engine::RegionIndex;

use crate::content::Site;
use crate::nonce::{NonceKeeper, RESET_ACTION};
use crate::settings::{DEFAULT_NONCE_LIFETIME_SECS, HuntSettings};

/// Framework-agnostic parts extracted from `HuntServer`.
/// Adapter crates consume this to build framework-specific routers.
pub struct HuntParts {
  pub site: Site,
  /// Resolved once at build time; read-only afterwards.
  pub index: RegionIndex,
  pub settings: HuntSettings,
  pub nonce: NonceKeeper,
}

impl HuntParts {
  pub fn reset_action(&self) -> &'static str {
    RESET_ACTION
  }
}

pub struct HuntServer {
  site: Site,
  settings: HuntSettings,
  nonce_secret: String,
  nonce_lifetime_secs: u64,
}

impl HuntServer {
  pub fn new(site: Site) -> Self {
    Self {
      site,
      settings: HuntSettings::default(),
      nonce_secret: String::new(),
      nonce_lifetime_secs: DEFAULT_NONCE_LIFETIME_SECS,
    }
  }

  pub fn settings(mut self, settings: HuntSettings) -> Self {
    self.settings = settings;
    self
  }

  pub fn nonce_secret(mut self, secret: impl Into<String>) -> Self {
    self.nonce_secret = secret.into();
    self
  }

  pub fn nonce_lifetime(mut self, secs: u64) -> Self {
    self.nonce_lifetime_secs = secs;
    self
  }

  /// Consume the builder, resolving every region against the site once.
  pub fn into_parts(self) -> HuntParts {
    if self.nonce_secret.is_empty() {
      tracing::warn!("reset nonce secret is empty; reset tokens are guessable");
    }
    let index =
      RegionIndex::build(&self.site.pages, &self.settings.limits, &self.settings.known_regions);
    tracing::info!(
      pages = self.site.pages.len(),
      regions = index.regions().count(),
      "region index built"
    );
    HuntParts {
      site: self.site,
      index,
      settings: self.settings,
      nonce: NonceKeeper::new(self.nonce_secret, self.nonce_lifetime_secs),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::parse_site;

  #[test]
  fn into_parts_indexes_regions() {
    let site = parse_site(
      r#"[
        {"id": 1, "slug": "virus"},
        {"id": 2, "slug": "arga", "parent": 1},
        {"id": 10, "slug": "molino", "parent": 2}
      ]"#,
    )
    .unwrap();
    let settings = HuntSettings { known_regions: vec!["ultzama".into()], ..Default::default() };
    let parts = HuntServer::new(site).settings(settings).nonce_secret("k").into_parts();

    let arga = flu_engine::Region::parse("arga", "es").unwrap();
    assert_eq!(parts.index.resolve_region_pages(&arga), vec![10]);
    assert_eq!(parts.index.known_regions().count(), 3);
    assert_eq!(parts.reset_action(), "flu_reset_progress");
  }
}
