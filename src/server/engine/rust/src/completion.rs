/* src/server/engine/rust/src/completion.rs */

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::hierarchy::RegionIndex;
use crate::progress::ProgressRecord;
use crate::region::{Language, PageId, Region};

/// Decides whether a region is complete for a client and records the flag.
///
/// `evaluate` returns `true` iff the region has at least one member page and
/// every member id is in `record.captured`. On `true` the region is added to
/// `record.completed`; nothing is ever removed. Implementations must agree on
/// every input.
pub trait CompletionEvaluator {
  fn evaluate(&self, region: &Region, record: ProgressRecord) -> (bool, ProgressRecord);
}

/// How far a client got through a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tally {
  pub matched: usize,
  pub total: usize,
}

impl Tally {
  pub fn of(members: &[PageId], captured: &BTreeSet<PageId>) -> Self {
    Self { matched: members.iter().filter(|id| captured.contains(id)).count(), total: members.len() }
  }
}

fn settle(region: &Region, complete: bool, mut record: ProgressRecord) -> (bool, ProgressRecord) {
  if complete && record.mark_completed(region) {
    tracing::info!(%region, "region completed");
  }
  (complete, record)
}

/// Server-side evaluator: members come from the in-process region index.
pub struct IndexedEvaluator<'a> {
  index: &'a RegionIndex,
}

impl<'a> IndexedEvaluator<'a> {
  pub fn new(index: &'a RegionIndex) -> Self {
    Self { index }
  }
}

impl CompletionEvaluator for IndexedEvaluator<'_> {
  fn evaluate(&self, region: &Region, record: ProgressRecord) -> (bool, ProgressRecord) {
    let members = self.index.resolve_region_pages(region);
    if members.is_empty() {
      tracing::warn!(%region, "region has no member pages; treating as incomplete");
      return (false, record);
    }
    let complete = members.iter().all(|id| record.captured.contains(id));
    settle(region, complete, record)
  }
}

/// Payload of the region query endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionPagesResponse {
  pub region_pages: Vec<PageId>,
  pub total_pages: usize,
  pub region: String,
  pub language: Language,
}

impl RegionPagesResponse {
  pub fn new(region: &Region, region_pages: Vec<PageId>) -> Self {
    Self {
      total_pages: region_pages.len(),
      region_pages,
      region: region.key.clone(),
      language: region.language,
    }
  }

  fn answers(&self, region: &Region) -> bool {
    self.region == region.key && self.language == region.language
  }
}

/// Client-side evaluator: members come from a query endpoint response, the
/// captured set from the client's own cookie jar.
pub struct ClientEvaluator {
  response: RegionPagesResponse,
}

impl ClientEvaluator {
  pub fn new(response: RegionPagesResponse) -> Self {
    Self { response }
  }
}

impl CompletionEvaluator for ClientEvaluator {
  fn evaluate(&self, region: &Region, record: ProgressRecord) -> (bool, ProgressRecord) {
    if !self.response.answers(region) {
      tracing::warn!(
        %region,
        answered = %format!("{}/{}", self.response.region, self.response.language),
        "response is for another region"
      );
      return (false, record);
    }
    let members = &self.response.region_pages;
    if members.is_empty() {
      return (false, record);
    }
    let mut match_count = 0;
    for id in members {
      if record.captured.contains(id) {
        match_count += 1;
      }
    }
    settle(region, match_count == members.len(), record)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::hierarchy::{Page, PageCollection, ResolverLimits};

  fn arga_index() -> RegionIndex {
    let mut pages = vec![Page {
      id: 2,
      slug: "arga".into(),
      parent_id: None,
      url_path: "/virus/arga/".into(),
      title: String::new(),
    }];
    for id in [10, 11, 12] {
      pages.push(Page {
        id,
        slug: format!("p{id}"),
        parent_id: Some(2),
        url_path: format!("/virus/arga/p{id}/"),
        title: String::new(),
      });
    }
    RegionIndex::build(&PageCollection::new(pages), &ResolverLimits::default(), &[])
  }

  fn captured(ids: &[PageId]) -> ProgressRecord {
    ProgressRecord { captured: ids.iter().copied().collect(), ..Default::default() }
  }

  fn arga() -> Region {
    Region::parse("arga", "es").unwrap()
  }

  #[test]
  fn partial_capture_is_incomplete() {
    let index = arga_index();
    let (done, record) = IndexedEvaluator::new(&index).evaluate(&arga(), captured(&[10, 11]));
    assert!(!done);
    assert!(!record.is_completed(&arga()));
  }

  #[test]
  fn full_capture_with_extras_completes() {
    let index = arga_index();
    let (done, record) =
      IndexedEvaluator::new(&index).evaluate(&arga(), captured(&[10, 11, 12, 99]));
    assert!(done);
    assert!(record.is_completed(&arga()));
  }

  #[test]
  fn unresolvable_region_is_incomplete() {
    let index = arga_index();
    let ultzama = Region::parse("ultzama", "eu").unwrap();
    let (done, record) = IndexedEvaluator::new(&index).evaluate(&ultzama, captured(&[10, 11, 12]));
    assert!(!done);
    assert!(record.completed.is_empty());
  }

  #[test]
  fn evaluation_is_idempotent() {
    let index = arga_index();
    let eval = IndexedEvaluator::new(&index);
    let (first, once) = eval.evaluate(&arga(), captured(&[10, 11, 12]));
    let (second, twice) = eval.evaluate(&arga(), once.clone());
    assert_eq!(first, second);
    assert_eq!(once, twice);
  }

  #[test]
  fn client_counts_matches_from_response() {
    let response = RegionPagesResponse::new(&arga(), vec![10, 11, 12]);
    assert_eq!(response.total_pages, 3);
    let eval = ClientEvaluator::new(response);
    assert!(!eval.evaluate(&arga(), captured(&[10, 12])).0);
    assert!(eval.evaluate(&arga(), captured(&[12, 11, 10])).0);
  }

  #[test]
  fn client_rejects_response_for_other_region() {
    let other = Region::parse("arga", "eu").unwrap();
    let eval = ClientEvaluator::new(RegionPagesResponse::new(&other, vec![10]));
    assert!(!eval.evaluate(&arga(), captured(&[10])).0);
  }

  #[test]
  fn tally_counts_members_only() {
    let tally = Tally::of(&[10, 11, 12], &[11, 12, 99].into_iter().collect());
    assert_eq!(tally, Tally { matched: 2, total: 3 });
  }

  #[test]
  fn response_serializes_with_wire_field_names() {
    let json = serde_json::to_value(RegionPagesResponse::new(&arga(), vec![10])).unwrap();
    assert_eq!(
      json,
      serde_json::json!({"region_pages": [10], "total_pages": 1, "region": "arga", "language": "es"})
    );
  }
}
