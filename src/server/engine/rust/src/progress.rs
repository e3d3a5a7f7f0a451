/* src/server/engine/rust/src/progress.rs */

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::region::{COMPLETION_FLAG_VALUE, PageId, Region};

pub const VISITED_COOKIE: &str = "flu_visited_pages";
pub const CAPTURED_COOKIE: &str = "flu_captured_pages";

/// Lifetime of every progress and completion cookie: 365 days.
pub const COOKIE_MAX_AGE_SECS: u64 = 365 * 24 * 60 * 60;

/// Decode a progress cookie value into a set of page ids.
///
/// Accepts the percent-encoded form browsers send back as well as raw JSON.
/// Anything that is not a JSON array decodes to the empty set; array entries
/// that are neither non-negative integers nor numeric strings are skipped.
pub fn read_set(raw: &str) -> BTreeSet<PageId> {
  let decoded = urlencoding::decode(raw).map(|s| s.into_owned()).unwrap_or_else(|_| raw.to_string());
  let items = match serde_json::from_str::<Value>(&decoded) {
    Ok(Value::Array(items)) => items,
    Ok(other) => {
      tracing::debug!(kind = json_kind(&other), "progress cookie is not an array");
      return BTreeSet::new();
    }
    Err(e) => {
      tracing::debug!(%e, "progress cookie is not JSON");
      return BTreeSet::new();
    }
  };
  items
    .iter()
    .filter_map(|item| match item {
      Value::Number(n) => n.as_u64(),
      Value::String(s) => s.trim().parse().ok(),
      _ => None,
    })
    .collect()
}

/// Encode a set of page ids as the cookie value: a percent-encoded JSON array.
pub fn write_set(set: &BTreeSet<PageId>) -> String {
  let json = serde_json::to_string(set).unwrap_or_else(|_| "[]".to_string());
  urlencoding::encode(&json).into_owned()
}

/// Split a `Cookie:` header (or `document.cookie`) into trimmed `(name, value)` pairs.
pub fn cookie_pairs(header: &str) -> impl Iterator<Item = (&str, &str)> {
  header.split(';').filter_map(|pair| {
    let (k, v) = pair.split_once('=')?;
    let k = k.trim();
    (!k.is_empty()).then(|| (k, v.trim()))
  })
}

fn json_kind(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "bool",
    Value::Number(_) => "number",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

/// Everything the client has achieved, as carried in its cookie jar.
///
/// All three sets only grow; the only way to shrink them is the global reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
  pub visited: BTreeSet<PageId>,
  pub captured: BTreeSet<PageId>,
  pub completed: BTreeSet<Region>,
}

/// Which cookies differ between two records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressDelta {
  pub visited: bool,
  pub captured: bool,
  pub completed: Vec<Region>,
}

impl ProgressDelta {
  pub fn is_empty(&self) -> bool {
    !self.visited && !self.captured && self.completed.is_empty()
  }
}

impl ProgressRecord {
  /// Build a record from `(name, value)` cookie pairs. Unrelated cookies are ignored.
  pub fn from_cookies<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
    let mut record = Self::default();
    for (name, value) in pairs {
      match name {
        VISITED_COOKIE => record.visited.extend(read_set(value)),
        CAPTURED_COOKIE => record.captured.extend(read_set(value)),
        _ => {
          if value == COMPLETION_FLAG_VALUE
            && let Some(region) = Region::from_completion_cookie(name)
          {
            record.completed.insert(region);
          }
        }
      }
    }
    record
  }

  pub fn from_cookie_header(header: &str) -> Self {
    Self::from_cookies(cookie_pairs(header))
  }

  pub fn mark_visited(&mut self, page_id: PageId) -> bool {
    self.visited.insert(page_id)
  }

  pub fn mark_captured(&mut self, page_id: PageId) -> bool {
    self.captured.insert(page_id)
  }

  pub fn mark_completed(&mut self, region: &Region) -> bool {
    if self.completed.contains(region) {
      return false;
    }
    self.completed.insert(region.clone())
  }

  pub fn is_completed(&self, region: &Region) -> bool {
    self.completed.contains(region)
  }

  /// Union with another view of the same jar. Grow-only sets make this
  /// order-independent, so two writers merging never lose an entry.
  pub fn merge(&mut self, other: &ProgressRecord) {
    self.visited.extend(other.visited.iter().copied());
    self.captured.extend(other.captured.iter().copied());
    self.completed.extend(other.completed.iter().cloned());
  }

  pub fn delta_since(&self, before: &ProgressRecord) -> ProgressDelta {
    ProgressDelta {
      visited: self.visited != before.visited,
      captured: self.captured != before.captured,
      completed: self.completed.difference(&before.completed).cloned().collect(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ids(v: &[PageId]) -> BTreeSet<PageId> {
    v.iter().copied().collect()
  }

  #[test]
  fn reads_plain_json() {
    assert_eq!(read_set("[10,11,12]"), ids(&[10, 11, 12]));
  }

  #[test]
  fn reads_percent_encoded_json() {
    assert_eq!(read_set("%5B10%2C11%5D"), ids(&[10, 11]));
  }

  #[test]
  fn numeric_strings_are_accepted() {
    assert_eq!(read_set(r#"["10", 11, " 12 "]"#), ids(&[10, 11, 12]));
  }

  #[test]
  fn malformed_values_decode_empty() {
    assert!(read_set("not-json").is_empty());
    assert!(read_set("").is_empty());
    assert!(read_set(r#"{"a":1}"#).is_empty());
    assert!(read_set("42").is_empty());
    assert!(read_set("%E0%A4%A").is_empty());
  }

  #[test]
  fn junk_entries_are_skipped() {
    assert_eq!(read_set(r#"[1, -2, 2.5, null, "x", [3], 4]"#), ids(&[1, 4]));
  }

  #[test]
  fn write_is_sorted_and_encoded() {
    assert_eq!(write_set(&ids(&[12, 10])), "%5B10%2C12%5D");
    assert_eq!(write_set(&BTreeSet::new()), "%5B%5D");
  }

  #[test]
  fn record_from_cookie_pairs() {
    let record = ProgressRecord::from_cookies([
      ("flu_visited_pages", "%5B10%2C11%5D"),
      ("flu_captured_pages", "[10]"),
      ("arga_completado", "si"),
      ("ultzama_eu_completado", "no"),
      ("session", "abc"),
    ]);
    assert_eq!(record.visited, ids(&[10, 11]));
    assert_eq!(record.captured, ids(&[10]));
    assert_eq!(record.completed.len(), 1);
    assert!(record.is_completed(&Region::parse("arga", "es").unwrap()));
  }

  #[test]
  fn cookie_header_pairs() {
    let pairs: Vec<_> = cookie_pairs("a=1; b = 2 ;junk; =x; c=").collect();
    assert_eq!(pairs, vec![("a", "1"), ("b", "2"), ("c", "")]);
  }

  #[test]
  fn record_from_header_with_malformed_capture() {
    let record = ProgressRecord::from_cookie_header(
      "flu_visited_pages=%5B3%5D; flu_captured_pages=not-json; arga_eu_completado=si",
    );
    assert_eq!(record.visited, ids(&[3]));
    assert!(record.captured.is_empty());
    assert!(record.is_completed(&Region::parse("arga", "eu").unwrap()));
  }

  #[test]
  fn repeated_cookie_names_are_unioned() {
    let record =
      ProgressRecord::from_cookies([("flu_captured_pages", "[1]"), ("flu_captured_pages", "[2]")]);
    assert_eq!(record.captured, ids(&[1, 2]));
  }

  #[test]
  fn merge_is_a_union() {
    let mut a = ProgressRecord { visited: ids(&[1]), captured: ids(&[1]), ..Default::default() };
    let b = ProgressRecord { visited: ids(&[2]), captured: ids(&[]), ..Default::default() };
    a.merge(&b);
    assert_eq!(a.visited, ids(&[1, 2]));
    assert_eq!(a.captured, ids(&[1]));
  }

  #[test]
  fn delta_reports_only_changes() {
    let before = ProgressRecord { visited: ids(&[1]), ..Default::default() };
    let mut after = before.clone();
    assert!(after.delta_since(&before).is_empty());
    after.mark_captured(1);
    let region = Region::parse("arga", "es").unwrap();
    after.mark_completed(&region);
    let delta = after.delta_since(&before);
    assert!(!delta.visited);
    assert!(delta.captured);
    assert_eq!(delta.completed, vec![region]);
  }
}
