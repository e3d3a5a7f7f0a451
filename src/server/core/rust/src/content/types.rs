/* src/server/core/rust/src/content/types.rs */

use flu_engine::{Language, PageId};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum ContentExport {
  Wrapped { pages: Vec<PageEntry> },
  Bare(Vec<PageEntry>),
}

impl ContentExport {
  pub(super) fn into_entries(self) -> Vec<PageEntry> {
    match self {
      Self::Wrapped { pages } | Self::Bare(pages) => pages,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct PageEntry {
  pub(super) id: PageId,
  pub(super) slug: String,
  /// `0` and `null` both mean a top-level page.
  #[serde(default, alias = "parent_id")]
  pub(super) parent: Option<PageId>,
  #[serde(default, alias = "url_path", alias = "link")]
  pub(super) url: Option<String>,
  #[serde(default)]
  pub(super) language: Option<Language>,
  #[serde(default)]
  pub(super) title: String,
  #[serde(default)]
  pub(super) content: String,
}

impl PageEntry {
  pub(super) fn parent_id(&self) -> Option<PageId> {
    self.parent.filter(|&p| p != 0 && p != self.id)
  }
}
