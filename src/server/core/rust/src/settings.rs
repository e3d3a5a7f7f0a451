/* src/server/core/rust/src/settings.rs */

use flu_engine::{
  CaptureTrigger, DEFAULT_CAPTURE_ANCHOR, DEFAULT_CLIENT_DEBOUNCE_MS, DEFAULT_PROGRESS_MARKER,
  ResolverLimits, SyncOptions,
};

pub const DEFAULT_DEBUG_QUERY_FLAG: &str = "flu_debug";
pub const DEFAULT_NONCE_LIFETIME_SECS: u64 = 24 * 60 * 60;

/// Runtime knobs of the hunt, independent of how they were configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuntSettings {
  pub limits: ResolverLimits,
  /// Region keys looked up even when no page sits at their root path.
  pub known_regions: Vec<String>,
  pub capture_anchor: String,
  pub progress_marker: String,
  pub site_url: Option<String>,
  pub client_debounce_ms: u64,
  pub debug_enabled: bool,
  pub debug_query_flag: String,
  /// Cookies cleared by the reset endpoint besides progress and flags.
  pub reset_extra_cookies: Vec<String>,
}

impl Default for HuntSettings {
  fn default() -> Self {
    Self {
      limits: ResolverLimits::default(),
      known_regions: Vec::new(),
      capture_anchor: DEFAULT_CAPTURE_ANCHOR.to_string(),
      progress_marker: DEFAULT_PROGRESS_MARKER.to_string(),
      site_url: None,
      client_debounce_ms: DEFAULT_CLIENT_DEBOUNCE_MS,
      debug_enabled: false,
      debug_query_flag: DEFAULT_DEBUG_QUERY_FLAG.to_string(),
      reset_extra_cookies: Vec::new(),
    }
  }
}

impl HuntSettings {
  pub fn trigger(&self) -> CaptureTrigger {
    CaptureTrigger::new(&self.capture_anchor)
  }

  pub fn sync_options(&self) -> SyncOptions {
    SyncOptions {
      marker: self.progress_marker.clone(),
      anchor: self.trigger().anchor().to_string(),
      site_url: self.site_url.clone(),
    }
  }

  /// True when debug output is on and `query` carries `flag=1`.
  pub fn wants_debug(&self, query: Option<&str>) -> bool {
    if !self.debug_enabled {
      return false;
    }
    let Some(query) = query else { return false };
    query.split('&').any(|pair| match pair.split_once('=') {
      Some((k, v)) => k == self.debug_query_flag && v == "1",
      None => false,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_the_hunt() {
    let s = HuntSettings::default();
    assert_eq!(s.capture_anchor, "atrapado");
    assert_eq!(s.progress_marker, "flu-progress");
    assert_eq!(s.client_debounce_ms, 1200);
    assert_eq!(s.limits.max_pages, 1000);
    assert_eq!(s.limits.max_children, 100);
  }

  #[test]
  fn sync_options_strip_hash_from_anchor() {
    let s = HuntSettings { capture_anchor: "#cazado".into(), ..Default::default() };
    assert_eq!(s.sync_options().anchor, "cazado");
  }

  #[test]
  fn debug_needs_switch_and_flag() {
    let mut s = HuntSettings::default();
    assert!(!s.wants_debug(Some("flu_debug=1")));
    s.debug_enabled = true;
    assert!(s.wants_debug(Some("a=b&flu_debug=1")));
    assert!(!s.wants_debug(Some("flu_debug=0")));
    assert!(!s.wants_debug(Some("flu_debug")));
    assert!(!s.wants_debug(None));
  }
}
