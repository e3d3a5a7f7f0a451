/* src/cli/core/src/main.rs */

mod check;
mod config;
mod probe;
mod resolve;
mod serve;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use flu_engine::PageId;
use flu_server::Site;
use tracing_subscriber::EnvFilter;

use config::{FluConfig, find_flu_config, load_flu_config};

#[derive(Parser)]
#[command(name = "flu", about = "Virus hunt region-completion server")]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the hunt: content pages, progress endpoints, reset
  Serve {
    /// Path to flu.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Show how a region resolves against the content export
  Resolve {
    /// Region key, e.g. `arga`
    region: String,
    /// `es` or `eu`
    language: String,
    /// Evaluate against this `Cookie:` header
    #[arg(long)]
    cookies: Option<String>,
    /// Print the full resolution report as JSON
    #[arg(long)]
    json: bool,
    /// Path to flu.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Validate flu.toml and the content export
  Check {
    /// Path to flu.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// Run the client-side completion check against a running server
  Probe {
    /// Base URL of the server (e.g. http://localhost:3000)
    #[arg(short, long)]
    url: Option<String>,
    region: String,
    language: String,
    /// Page ids already in the captured cookie
    #[arg(long, value_delimiter = ',')]
    captured: Vec<PageId>,
    /// Capture this page through the server first
    #[arg(long)]
    capture: Option<PageId>,
    /// Delay before the client evaluates (defaults to game.client_debounce_ms)
    #[arg(long)]
    debounce_ms: Option<u64>,
  },
}

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Try to load flu.toml from cwd upward; returns None if not found
fn try_load_config() -> Option<FluConfig> {
  let cwd = std::env::current_dir().ok()?;
  let path = find_flu_config(&cwd).ok()?;
  load_flu_config(&path).ok()
}

/// Resolve config path (explicit or auto-detected) and parse it
fn resolve_config(explicit: Option<PathBuf>) -> Result<(PathBuf, FluConfig)> {
  let path = match explicit {
    Some(p) => p,
    None => {
      let cwd = std::env::current_dir().context("failed to get cwd")?;
      find_flu_config(&cwd)?
    }
  };
  let config = load_flu_config(&path)?;
  Ok((path, config))
}

fn base_dir(config_path: &Path) -> &Path {
  config_path.parent().unwrap_or_else(|| Path::new("."))
}

pub(crate) fn load_site(config: &FluConfig, base_dir: &Path) -> Result<Site> {
  let path = config.pages_path(base_dir);
  flu_server::load_site(&path)
    .map_err(|e| anyhow::anyhow!("{e}"))
    .with_context(|| format!("failed to load content from {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
  init_tracing();
  let cli = Cli::parse();

  match cli.command {
    Command::Serve { config } => {
      let (path, config) = resolve_config(config)?;
      serve::run_serve(&config, base_dir(&path)).await?;
    }
    Command::Resolve { region, language, cookies, json, config } => {
      let (path, config) = resolve_config(config)?;
      resolve::run_resolve(&config, base_dir(&path), &region, &language, cookies.as_deref(), json)?;
    }
    Command::Check { config } => {
      let (path, config) = resolve_config(config)?;
      check::run_check(&config, base_dir(&path))?;
    }
    Command::Probe { url, region, language, captured, capture, debounce_ms } => {
      let cfg = try_load_config();
      let url = url.unwrap_or_else(|| {
        let port = cfg.as_ref().map_or(3000, |c| c.server.port);
        format!("http://localhost:{port}")
      });
      let debounce_ms = debounce_ms
        .or_else(|| cfg.as_ref().map(|c| c.game.client_debounce_ms))
        .unwrap_or(flu_engine::DEFAULT_CLIENT_DEBOUNCE_MS);
      let args = probe::ProbeArgs { url, region, language, captured, capture, debounce_ms };
      probe::run_probe(&args).await?;
    }
  }

  Ok(())
}
