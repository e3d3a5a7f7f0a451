/* src/server/engine/rust/src/hierarchy.rs */

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::region::{Language, PageId, Region};

/// One content node of the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
  pub id: PageId,
  pub slug: String,
  #[serde(default)]
  pub parent_id: Option<PageId>,
  /// Site-relative URL path with leading and trailing slash.
  pub url_path: String,
  #[serde(default)]
  pub title: String,
}

/// Ensure `/leading/` and `/trailing/` slashes, dropping any query or fragment.
pub fn normalize_path(path: &str) -> String {
  let path = path.split(['?', '#']).next().unwrap_or("");
  let trimmed = path.trim_matches('/');
  if trimmed.is_empty() { "/".to_string() } else { format!("/{trimmed}/") }
}

/// Pages in the order the content source supplied them.
#[derive(Debug, Clone, Default)]
pub struct PageCollection {
  pages: Vec<Page>,
  by_id: HashMap<PageId, usize>,
  by_path: HashMap<String, usize>,
}

impl PageCollection {
  pub fn new(pages: Vec<Page>) -> Self {
    let mut by_id = HashMap::with_capacity(pages.len());
    let mut by_path = HashMap::with_capacity(pages.len());
    for (idx, page) in pages.iter().enumerate() {
      by_id.entry(page.id).or_insert(idx);
      by_path.entry(normalize_path(&page.url_path)).or_insert(idx);
    }
    Self { pages, by_id, by_path }
  }

  pub fn len(&self) -> usize {
    self.pages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pages.is_empty()
  }

  pub fn pages(&self) -> &[Page] {
    &self.pages
  }

  pub fn get(&self, id: PageId) -> Option<&Page> {
    self.by_id.get(&id).map(|&idx| &self.pages[idx])
  }

  pub fn find_by_path(&self, path: &str) -> Option<&Page> {
    self.by_path.get(&normalize_path(path)).map(|&idx| &self.pages[idx])
  }

  pub fn children(&self, parent: PageId) -> impl Iterator<Item = &Page> {
    self.pages.iter().filter(move |p| p.parent_id == Some(parent))
  }
}

/// Upper bounds on how much of the collection a resolution may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverLimits {
  pub max_pages: usize,
  pub max_children: usize,
}

impl Default for ResolverLimits {
  fn default() -> Self {
    Self { max_pages: 1000, max_children: 100 }
  }
}

/// How a page qualified as a region parent. Lower sorts first and wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentMatch {
  ExactPath,
  Slug,
}

fn parent_match(page: &Page, region: &Region) -> Option<ParentMatch> {
  let path = normalize_path(&page.url_path);
  if path == region.root_path() {
    return Some(ParentMatch::ExactPath);
  }
  let under_root = match region.language {
    Language::Es => path.starts_with("/virus/"),
    Language::Eu => path.starts_with("/eu/virus/"),
  };
  (under_root && page.slug == region.key).then_some(ParentMatch::Slug)
}

/// Region key a page would carry if it sat exactly at a region root.
fn exact_root_key(path: &str, language: Language) -> Option<&str> {
  let rest = path.strip_prefix(language.virus_root().as_str())?;
  let key = rest.strip_suffix('/')?;
  (!key.is_empty() && !key.contains('/')).then_some(key)
}

#[derive(Debug, Clone, Serialize)]
pub struct ParentCandidate {
  pub page_id: PageId,
  pub matched_by: ParentMatch,
}

/// Region membership resolved once from a page collection.
///
/// Parents are chosen deterministically: an exact root-path match beats a
/// slug match, then the lowest page id wins.
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
  candidates: BTreeMap<Region, Vec<ParentCandidate>>,
  members: BTreeMap<Region, Vec<PageId>>,
  member_of: HashMap<PageId, Region>,
}

impl RegionIndex {
  /// Scan at most `limits.max_pages` pages. Region keys are discovered from
  /// pages sitting exactly at a region root, plus any `known_keys`.
  pub fn build(pages: &PageCollection, limits: &ResolverLimits, known_keys: &[String]) -> Self {
    let scanned = &pages.pages()[..pages.len().min(limits.max_pages)];
    if pages.len() > limits.max_pages {
      tracing::warn!(
        total = pages.len(),
        max_pages = limits.max_pages,
        "page collection exceeds scan limit; trailing pages ignored"
      );
    }

    let mut regions = BTreeSet::new();
    for language in Language::ALL {
      for key in known_keys {
        match Region::new(key, language) {
          Ok(region) => {
            regions.insert(region);
          }
          Err(e) => tracing::warn!(%e, "skipping configured region"),
        }
      }
      for page in scanned {
        if let Some(key) = exact_root_key(&normalize_path(&page.url_path), language)
          && let Ok(region) = Region::new(key, language)
        {
          regions.insert(region);
        }
      }
    }

    let mut index = Self::default();
    for region in regions {
      let mut found: Vec<ParentCandidate> = scanned
        .iter()
        .filter_map(|page| {
          parent_match(page, &region)
            .map(|matched_by| ParentCandidate { page_id: page.id, matched_by })
        })
        .collect();
      found.sort_by_key(|c| (c.matched_by, c.page_id));

      if let Some(parent) = found.first() {
        if found.len() > 1 {
          tracing::warn!(
            %region,
            chosen = parent.page_id,
            candidates = found.len(),
            "several pages qualify as region parent"
          );
        }
        let members: Vec<PageId> =
          pages.children(parent.page_id).take(limits.max_children).map(|p| p.id).collect();
        for &id in &members {
          index.member_of.entry(id).or_insert_with(|| region.clone());
        }
        index.members.insert(region.clone(), members);
      }
      index.candidates.insert(region, found);
    }
    index
  }

  /// Member page ids of a region, in collection order. A region without a
  /// resolvable parent yields an empty list.
  pub fn resolve_region_pages(&self, region: &Region) -> Vec<PageId> {
    match self.members.get(region) {
      Some(members) => members.clone(),
      None => {
        tracing::warn!(%region, path = %region.root_path(), "no parent page for region");
        Vec::new()
      }
    }
  }

  pub fn parent_of(&self, region: &Region) -> Option<PageId> {
    self.candidates.get(region).and_then(|c| c.first()).map(|c| c.page_id)
  }

  /// Every parent candidate considered for a region, best first.
  pub fn candidates(&self, region: &Region) -> &[ParentCandidate] {
    self.candidates.get(region).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Region a member page belongs to.
  pub fn region_of(&self, page_id: PageId) -> Option<&Region> {
    self.member_of.get(&page_id)
  }

  /// Regions with a resolved parent.
  pub fn regions(&self) -> impl Iterator<Item = &Region> {
    self.members.keys()
  }

  /// Regions that were looked for, resolved or not.
  pub fn known_regions(&self) -> impl Iterator<Item = &Region> {
    self.candidates.keys()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn page(id: PageId, slug: &str, parent_id: Option<PageId>, url_path: &str) -> Page {
    Page { id, slug: slug.into(), parent_id, url_path: url_path.into(), title: String::new() }
  }

  fn site() -> PageCollection {
    PageCollection::new(vec![
      page(1, "virus", None, "/virus/"),
      page(2, "arga", Some(1), "/virus/arga/"),
      page(10, "puente", Some(2), "/virus/arga/puente/"),
      page(11, "molino", Some(2), "/virus/arga/molino/"),
      page(12, "plaza", Some(2), "/virus/arga/plaza/"),
      page(3, "virus", None, "/eu/virus/"),
      page(4, "arga", Some(3), "/eu/virus/arga/"),
      page(20, "zubia", Some(4), "/eu/virus/arga/zubia/"),
    ])
  }

  fn region(key: &str, lang: &str) -> Region {
    Region::parse(key, lang).unwrap()
  }

  #[test]
  fn normalize_adds_slashes_and_drops_query() {
    assert_eq!(normalize_path("virus/arga"), "/virus/arga/");
    assert_eq!(normalize_path("/virus/arga/?x=1#atrapado"), "/virus/arga/");
    assert_eq!(normalize_path(""), "/");
  }

  #[test]
  fn resolves_spanish_members_in_collection_order() {
    let index = RegionIndex::build(&site(), &ResolverLimits::default(), &[]);
    assert_eq!(index.resolve_region_pages(&region("arga", "es")), vec![10, 11, 12]);
    assert_eq!(index.parent_of(&region("arga", "es")), Some(2));
  }

  #[test]
  fn resolves_basque_tree_separately() {
    let index = RegionIndex::build(&site(), &ResolverLimits::default(), &[]);
    assert_eq!(index.resolve_region_pages(&region("arga", "eu")), vec![20]);
    assert_eq!(index.parent_of(&region("arga", "eu")), Some(4));
  }

  #[test]
  fn missing_parent_yields_empty() {
    let keys = vec!["ultzama".to_string()];
    let index = RegionIndex::build(&site(), &ResolverLimits::default(), &keys);
    assert!(index.resolve_region_pages(&region("ultzama", "eu")).is_empty());
    assert!(index.candidates(&region("ultzama", "eu")).is_empty());
    assert!(index.known_regions().any(|r| *r == region("ultzama", "eu")));
  }

  #[test]
  fn slug_match_found_for_configured_key() {
    let pages = PageCollection::new(vec![
      page(5, "ultzama", None, "/virus/zonas/ultzama/"),
      page(50, "borda", Some(5), "/virus/zonas/ultzama/borda/"),
    ]);
    let keys = vec!["ultzama".to_string()];
    let index = RegionIndex::build(&pages, &ResolverLimits::default(), &keys);
    assert_eq!(index.resolve_region_pages(&region("ultzama", "es")), vec![50]);
    assert_eq!(index.candidates(&region("ultzama", "es"))[0].matched_by, ParentMatch::Slug);
  }

  #[test]
  fn exact_path_beats_slug_match_regardless_of_order() {
    let pages = PageCollection::new(vec![
      page(7, "arga", None, "/virus/old/arga/"),
      page(70, "viejo", Some(7), "/virus/old/arga/viejo/"),
      page(8, "arga", None, "/virus/arga/"),
      page(80, "nuevo", Some(8), "/virus/arga/nuevo/"),
    ]);
    let index = RegionIndex::build(&pages, &ResolverLimits::default(), &[]);
    assert_eq!(index.parent_of(&region("arga", "es")), Some(8));
    assert_eq!(index.candidates(&region("arga", "es")).len(), 2);
    assert_eq!(index.resolve_region_pages(&region("arga", "es")), vec![80]);
  }

  #[test]
  fn lowest_id_wins_among_equal_matches() {
    let pages = PageCollection::new(vec![
      page(9, "arga", None, "/virus/a/arga/"),
      page(6, "arga", None, "/virus/b/arga/"),
    ]);
    let keys = vec!["arga".to_string()];
    let index = RegionIndex::build(&pages, &ResolverLimits::default(), &keys);
    assert_eq!(index.parent_of(&region("arga", "es")), Some(6));
  }

  #[test]
  fn spanish_rule_ignores_basque_tree() {
    let pages = PageCollection::new(vec![page(4, "arga", None, "/eu/virus/arga/")]);
    let keys = vec!["arga".to_string()];
    let index = RegionIndex::build(&pages, &ResolverLimits::default(), &keys);
    assert_eq!(index.parent_of(&region("arga", "es")), None);
    assert_eq!(index.parent_of(&region("arga", "eu")), Some(4));
  }

  #[test]
  fn limits_cap_scan_and_children() {
    let limits = ResolverLimits { max_pages: 4, max_children: 2 };
    let index = RegionIndex::build(&site(), &limits, &[]);
    assert_eq!(index.resolve_region_pages(&region("arga", "es")), vec![10, 11]);
    // The Basque parent sits beyond the scan limit.
    assert_eq!(index.parent_of(&region("arga", "eu")), None);
  }

  #[test]
  fn reverse_lookup_of_member_region() {
    let index = RegionIndex::build(&site(), &ResolverLimits::default(), &[]);
    assert_eq!(index.region_of(11), Some(&region("arga", "es")));
    assert_eq!(index.region_of(20), Some(&region("arga", "eu")));
    assert_eq!(index.region_of(2), None);
  }

  #[test]
  fn finds_page_by_request_path() {
    let pages = site();
    assert_eq!(pages.find_by_path("/virus/arga/molino").map(|p| p.id), Some(11));
    assert_eq!(pages.find_by_path("/virus/arga/molino/?atrapado").map(|p| p.id), Some(11));
    assert!(pages.find_by_path("/nope/").is_none());
  }
}
