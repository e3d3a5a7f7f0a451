/* src/server/core/rust/src/debug.rs */

// Diagnostic dump for the render path: how a page's region was resolved and
// how far the current client got through it.

use flu_engine::{
  Page, PageCollection, PageId, ParentMatch, ProgressRecord, Region, RegionIndex, Tally,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CandidateReport<'a> {
  pub matched_by: ParentMatch,
  pub chosen: bool,
  pub page: Option<&'a Page>,
}

#[derive(Debug, Serialize)]
pub struct MemberReport<'a> {
  pub id: PageId,
  pub visited: bool,
  pub captured: bool,
  pub page: Option<&'a Page>,
}

#[derive(Debug, Serialize)]
pub struct RegionReport<'a> {
  pub region: String,
  pub language: &'static str,
  pub root_path: String,
  pub completion_cookie: String,
  pub parent_id: Option<PageId>,
  pub candidates: Vec<CandidateReport<'a>>,
  pub members: Vec<MemberReport<'a>>,
  pub tally: Tally,
  pub completed: bool,
}

#[derive(Debug, Serialize)]
pub struct DebugReport<'a> {
  pub page: Option<&'a Page>,
  pub region: Option<RegionReport<'a>>,
  pub progress: &'a ProgressRecord,
}

pub fn region_report<'a>(
  pages: &'a PageCollection,
  index: &RegionIndex,
  region: &Region,
  record: &ProgressRecord,
) -> RegionReport<'a> {
  let parent_id = index.parent_of(region);
  let candidates = index
    .candidates(region)
    .iter()
    .map(|c| CandidateReport {
      matched_by: c.matched_by,
      chosen: Some(c.page_id) == parent_id,
      page: pages.get(c.page_id),
    })
    .collect();
  let ids = index.resolve_region_pages(region);
  let members = ids
    .iter()
    .map(|&id| MemberReport {
      id,
      visited: record.visited.contains(&id),
      captured: record.captured.contains(&id),
      page: pages.get(id),
    })
    .collect();
  RegionReport {
    region: region.key.clone(),
    language: region.language.as_str(),
    root_path: region.root_path(),
    completion_cookie: region.completion_cookie(),
    parent_id,
    candidates,
    members,
    tally: Tally::of(&ids, &record.captured),
    completed: record.is_completed(region),
  }
}

/// Report for one rendered page: the page, its region (if any), and progress.
pub fn page_report<'a>(
  pages: &'a PageCollection,
  index: &RegionIndex,
  page_id: PageId,
  record: &'a ProgressRecord,
) -> DebugReport<'a> {
  let region = index.region_of(page_id).map(|r| region_report(pages, index, r, record));
  DebugReport { page: pages.get(page_id), region, progress: record }
}
