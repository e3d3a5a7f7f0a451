/* src/cli/core/src/serve.rs */

use std::path::Path;

use anyhow::{Context, Result};
use axum::routing::get_service;
use flu_server::HuntServer;
use flu_server_axum::IntoAxumRouter;
use tower_http::services::ServeDir;

use crate::config::FluConfig;
use crate::{load_site, ui};

pub async fn run_serve(config: &FluConfig, base_dir: &Path) -> Result<()> {
  ui::banner("serve");
  let site = load_site(config, base_dir)?;
  ui::ok(&format!("{} pages", site.pages.len()));

  if config.security.nonce_secret.is_empty() {
    ui::warn("security.nonce_secret is empty; set FLU_NONCE_SECRET in production");
  }
  let server = HuntServer::new(site)
    .settings(config.hunt_settings())
    .nonce_secret(config.security.nonce_secret.clone())
    .nonce_lifetime(config.security.nonce_lifetime_secs);

  let mut router = server.into_axum_router();
  if let Some(dir) = config.static_dir(base_dir) {
    ui::arrow(&format!("static assets from {}", dir.display()));
    router = router.nest_service("/_flu/static", get_service(ServeDir::new(dir)));
  }

  let addr = config.addr();
  let listener =
    tokio::net::TcpListener::bind(&addr).await.with_context(|| format!("failed to bind {addr}"))?;
  let port = listener.local_addr()?.port();
  ui::ok(&format!("listening on http://localhost:{port}"));
  ui::blank();
  axum::serve(listener, router).await.context("server error")?;
  Ok(())
}
