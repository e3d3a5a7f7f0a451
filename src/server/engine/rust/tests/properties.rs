/* src/server/engine/rust/tests/properties.rs */

use std::collections::BTreeSet;

use flu_engine::{
  CaptureTrigger, ClientEvaluator, CompletionEvaluator, IndexedEvaluator, Page, PageCollection,
  PageId, ProgressRecord, Region, RegionIndex, RegionPagesResponse, ResolverLimits, read_set,
  write_set,
};
use proptest::prelude::*;

const PARENT: PageId = 1;

fn arga() -> Region {
  Region::parse("arga", "es").unwrap()
}

fn index_with_members(members: &[PageId]) -> RegionIndex {
  let mut pages = vec![Page {
    id: PARENT,
    slug: "arga".into(),
    parent_id: None,
    url_path: "/virus/arga/".into(),
    title: String::new(),
  }];
  pages.extend(members.iter().map(|&id| Page {
    id,
    slug: format!("p{id}"),
    parent_id: Some(PARENT),
    url_path: format!("/virus/arga/p{id}/"),
    title: String::new(),
  }));
  RegionIndex::build(&PageCollection::new(pages), &ResolverLimits::default(), &[])
}

fn members_strategy() -> impl Strategy<Value = Vec<PageId>> {
  prop::collection::btree_set(10u64..40, 0..8).prop_map(|s| s.into_iter().collect())
}

fn captured_strategy() -> impl Strategy<Value = BTreeSet<PageId>> {
  prop::collection::btree_set(5u64..45, 0..20)
}

fn record(captured: BTreeSet<PageId>) -> ProgressRecord {
  ProgressRecord { captured, ..Default::default() }
}

proptest! {
  #[test]
  fn complete_iff_members_are_captured(members in members_strategy(), captured in captured_strategy()) {
    let index = index_with_members(&members);
    let expected = !members.is_empty() && members.iter().all(|id| captured.contains(id));
    let (done, after) = IndexedEvaluator::new(&index).evaluate(&arga(), record(captured));
    prop_assert_eq!(done, expected);
    prop_assert_eq!(after.is_completed(&arga()), expected);
  }

  #[test]
  fn server_and_client_evaluators_agree(members in members_strategy(), captured in captured_strategy()) {
    let index = index_with_members(&members);
    let server = IndexedEvaluator::new(&index);
    let client = ClientEvaluator::new(RegionPagesResponse::new(&arga(), index.resolve_region_pages(&arga())));
    let left = server.evaluate(&arga(), record(captured.clone()));
    let right = client.evaluate(&arga(), record(captured));
    prop_assert_eq!(left, right);
  }

  #[test]
  fn evaluation_is_idempotent(members in members_strategy(), captured in captured_strategy()) {
    let index = index_with_members(&members);
    let eval = IndexedEvaluator::new(&index);
    let (first, once) = eval.evaluate(&arga(), record(captured));
    let (second, twice) = eval.evaluate(&arga(), once.clone());
    prop_assert_eq!(first, second);
    prop_assert_eq!(once, twice);
  }

  #[test]
  fn captures_never_shrink_progress(
    members in members_strategy(),
    captured in captured_strategy(),
    hits in prop::collection::vec(5u64..45, 0..10),
  ) {
    let index = index_with_members(&members);
    let eval = IndexedEvaluator::new(&index);
    let trigger = CaptureTrigger::default();
    let mut current = record(captured);
    for hit in hits {
      let before = current.clone();
      let outcome = trigger.capture(hit, index.region_of(hit), &eval, current);
      prop_assert!(outcome.record.captured.is_superset(&before.captured));
      prop_assert!(outcome.record.completed.is_superset(&before.completed));
      prop_assert!(outcome.record.captured.contains(&hit));
      current = outcome.record;
    }
  }

  #[test]
  fn cookie_codec_round_trips(set in prop::collection::btree_set(any::<u32>().prop_map(u64::from), 0..30)) {
    prop_assert_eq!(read_set(&write_set(&set)), set.clone());
    let encoded = write_set(&read_set(&write_set(&set)));
    prop_assert_eq!(encoded, write_set(&set));
  }

  #[test]
  fn arbitrary_cookie_text_never_panics(raw in ".*") {
    let _ = read_set(&raw);
  }
}

#[test]
fn scenario_partial_capture() {
  let index = index_with_members(&[10, 11, 12]);
  let (done, after) =
    IndexedEvaluator::new(&index).evaluate(&arga(), record([10, 11].into_iter().collect()));
  assert!(!done);
  assert!(after.completed.is_empty());
}

#[test]
fn scenario_full_capture_with_extra_page() {
  let index = index_with_members(&[10, 11, 12]);
  let (done, after) =
    IndexedEvaluator::new(&index).evaluate(&arga(), record([10, 11, 12, 99].into_iter().collect()));
  assert!(done);
  assert_eq!(after.completed.iter().map(Region::completion_cookie).collect::<Vec<_>>(), [
    "arga_completado"
  ]);
}

#[test]
fn scenario_unresolvable_basque_region() {
  let index = index_with_members(&[10, 11, 12]);
  let ultzama = Region::parse("ultzama", "eu").unwrap();
  assert!(index.resolve_region_pages(&ultzama).is_empty());
  let (done, _) =
    IndexedEvaluator::new(&index).evaluate(&ultzama, record([10, 11, 12].into_iter().collect()));
  assert!(!done);
}

#[test]
fn scenario_malformed_captured_cookie() {
  let record = ProgressRecord::from_cookies([("flu_captured_pages", "not-json")]);
  assert!(record.captured.is_empty());
}
