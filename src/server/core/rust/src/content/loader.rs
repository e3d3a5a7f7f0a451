/* src/server/core/rust/src/content/loader.rs */

use std::collections::HashMap;
use std::path::Path;

use flu_engine::{Language, Page, PageCollection, PageId, normalize_path};

use super::types::{ContentExport, PageEntry};

/// Page tree plus the HTML body of each page.
#[derive(Debug, Clone, Default)]
pub struct Site {
  pub pages: PageCollection,
  bodies: HashMap<PageId, String>,
}

impl Site {
  pub fn new(pages: Vec<Page>) -> Self {
    Self { pages: PageCollection::new(pages), bodies: HashMap::new() }
  }

  pub fn with_bodies(pages: Vec<Page>, bodies: HashMap<PageId, String>) -> Self {
    Self { pages: PageCollection::new(pages), bodies }
  }

  pub fn body(&self, id: PageId) -> &str {
    self.bodies.get(&id).map(String::as_str).unwrap_or("")
  }
}

/// Strip scheme and host from an absolute permalink.
pub(super) fn path_of_url(url: &str) -> String {
  let path = match url.split_once("://") {
    Some((_, rest)) => rest.find('/').map_or("/", |i| &rest[i..]),
    None => url,
  };
  normalize_path(path)
}

/// Build `/slug/of/ancestors/` for a page without an explicit URL. Basque
/// trees live under `/eu`.
pub(super) fn derive_url_path(entry: &PageEntry, by_id: &HashMap<PageId, &PageEntry>) -> String {
  let mut slugs = vec![entry.slug.as_str()];
  let mut language = entry.language;
  let mut current = entry.parent_id();
  // Depth guard against parent cycles in a broken export.
  let mut hops = 0;
  while let Some(parent) = current.and_then(|id| by_id.get(&id)) {
    hops += 1;
    if hops > by_id.len() {
      tracing::warn!(page_id = entry.id, "parent chain loops; truncating derived path");
      break;
    }
    slugs.push(parent.slug.as_str());
    language = language.or(parent.language);
    current = parent.parent_id();
  }
  slugs.reverse();
  let prefix = language.map_or("", Language::path_prefix);
  normalize_path(&format!("{prefix}/{}", slugs.join("/")))
}

fn into_site(entries: Vec<PageEntry>) -> Site {
  let by_id: HashMap<PageId, &PageEntry> = entries.iter().map(|e| (e.id, e)).collect();
  let mut pages = Vec::with_capacity(entries.len());
  let mut bodies = HashMap::new();
  for entry in &entries {
    let url_path = match entry.url.as_deref() {
      Some(url) if !url.trim().is_empty() => path_of_url(url),
      _ => derive_url_path(entry, &by_id),
    };
    pages.push(Page {
      id: entry.id,
      slug: entry.slug.clone(),
      parent_id: entry.parent_id(),
      url_path,
      title: entry.title.clone(),
    });
    if !entry.content.is_empty() {
      bodies.insert(entry.id, entry.content.clone());
    }
  }
  Site::with_bodies(pages, bodies)
}

pub fn parse_site(json: &str) -> Result<Site, serde_json::Error> {
  let export: ContentExport = serde_json::from_str(json)?;
  Ok(into_site(export.into_entries()))
}

/// Read a content export (`{"pages": [...]}` or a bare array) from disk.
pub fn load_site(path: &Path) -> Result<Site, Box<dyn std::error::Error>> {
  let content = std::fs::read_to_string(path)?;
  let site = parse_site(&content)?;
  tracing::info!(pages = site.pages.len(), path = %path.display(), "content loaded");
  Ok(site)
}
