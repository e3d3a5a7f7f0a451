/* src/cli/core/src/config/types.rs */

use std::path::{Path, PathBuf};

use flu_server::{DEFAULT_DEBUG_QUERY_FLAG, DEFAULT_NONCE_LIFETIME_SECS, HuntSettings};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct FluConfig {
  #[serde(default)]
  pub server: ServerSection,
  pub content: ContentSection,
  #[serde(default)]
  pub game: GameSection,
  #[serde(default)]
  pub security: SecuritySection,
  #[serde(default)]
  pub reset: ResetSection,
  #[serde(default)]
  pub debug: DebugSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
  #[serde(default = "default_host")]
  pub host: String,
  #[serde(default = "default_port")]
  pub port: u16,
  /// Absolute site origin, e.g. `https://virus.example.org`.
  pub site_url: Option<String>,
  /// Directory served under `/_flu/static` (browser bundle, wasm).
  pub static_dir: Option<String>,
}

impl Default for ServerSection {
  fn default() -> Self {
    Self { host: default_host(), port: default_port(), site_url: None, static_dir: None }
  }
}

fn default_host() -> String {
  "0.0.0.0".to_string()
}

fn default_port() -> u16 {
  3000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentSection {
  /// JSON export of the page tree.
  pub pages: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameSection {
  #[serde(default)]
  pub regions: Vec<String>,
  #[serde(default = "default_anchor")]
  pub capture_anchor: String,
  #[serde(default = "default_marker")]
  pub progress_marker: String,
  #[serde(default = "default_debounce_ms")]
  pub client_debounce_ms: u64,
  #[serde(default = "default_max_pages")]
  pub max_pages: usize,
  #[serde(default = "default_max_children")]
  pub max_children: usize,
}

impl Default for GameSection {
  fn default() -> Self {
    Self {
      regions: Vec::new(),
      capture_anchor: default_anchor(),
      progress_marker: default_marker(),
      client_debounce_ms: default_debounce_ms(),
      max_pages: default_max_pages(),
      max_children: default_max_children(),
    }
  }
}

fn default_anchor() -> String {
  flu_engine::DEFAULT_CAPTURE_ANCHOR.to_string()
}

fn default_marker() -> String {
  flu_engine::DEFAULT_PROGRESS_MARKER.to_string()
}

fn default_debounce_ms() -> u64 {
  flu_engine::DEFAULT_CLIENT_DEBOUNCE_MS
}

fn default_max_pages() -> usize {
  flu_engine::ResolverLimits::default().max_pages
}

fn default_max_children() -> usize {
  flu_engine::ResolverLimits::default().max_children
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecuritySection {
  /// Overridden by `FLU_NONCE_SECRET`.
  #[serde(default)]
  pub nonce_secret: String,
  #[serde(default = "default_nonce_lifetime")]
  pub nonce_lifetime_secs: u64,
}

impl Default for SecuritySection {
  fn default() -> Self {
    Self { nonce_secret: String::new(), nonce_lifetime_secs: default_nonce_lifetime() }
  }
}

fn default_nonce_lifetime() -> u64 {
  DEFAULT_NONCE_LIFETIME_SECS
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetSection {
  /// Permission cookies cleared alongside progress.
  #[serde(default)]
  pub extra_cookies: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DebugSection {
  #[serde(default)]
  pub enabled: bool,
  #[serde(default = "default_query_flag")]
  pub query_flag: String,
}

impl Default for DebugSection {
  fn default() -> Self {
    Self { enabled: false, query_flag: default_query_flag() }
  }
}

fn default_query_flag() -> String {
  DEFAULT_DEBUG_QUERY_FLAG.to_string()
}

impl FluConfig {
  /// Content export path, relative paths taken from the config's directory.
  pub fn pages_path(&self, base_dir: &Path) -> PathBuf {
    base_dir.join(&self.content.pages)
  }

  pub fn static_dir(&self, base_dir: &Path) -> Option<PathBuf> {
    self.server.static_dir.as_ref().map(|d| base_dir.join(d))
  }

  pub fn addr(&self) -> String {
    format!("{}:{}", self.server.host, self.server.port)
  }

  pub fn hunt_settings(&self) -> HuntSettings {
    HuntSettings {
      limits: flu_engine::ResolverLimits {
        max_pages: self.game.max_pages,
        max_children: self.game.max_children,
      },
      known_regions: self.game.regions.clone(),
      capture_anchor: self.game.capture_anchor.clone(),
      progress_marker: self.game.progress_marker.clone(),
      site_url: self.server.site_url.clone(),
      client_debounce_ms: self.game.client_debounce_ms,
      debug_enabled: self.debug.enabled,
      debug_query_flag: self.debug.query_flag.clone(),
      reset_extra_cookies: self.reset.extra_cookies.clone(),
    }
  }
}
