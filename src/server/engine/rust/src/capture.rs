/* src/server/engine/rust/src/capture.rs */

use serde::Serialize;

use crate::completion::CompletionEvaluator;
use crate::progress::ProgressRecord;
use crate::region::{PageId, Region};

pub const DEFAULT_CAPTURE_ANCHOR: &str = "atrapado";

/// Default delay the client waits before evaluating, so the server's capture
/// write lands first.
pub const DEFAULT_CLIENT_DEBOUNCE_MS: u64 = 1200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
  #[default]
  Idle,
  Capturing,
  Captured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
  /// The visitor reached the capture anchor.
  AnchorReached,
  /// The page id landed in the captured set.
  Persisted,
}

impl CaptureState {
  pub fn next(self, event: CaptureEvent) -> Self {
    match (self, event) {
      (Self::Idle, CaptureEvent::AnchorReached) => Self::Capturing,
      (Self::Capturing, CaptureEvent::Persisted) => Self::Captured,
      (state, _) => state,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureOutcome {
  pub state: CaptureState,
  /// False when the page was already in the captured set.
  pub newly_captured: bool,
  pub region: Option<Region>,
  pub region_complete: bool,
  pub record: ProgressRecord,
}

/// Detects the capture anchor and applies a capture to a progress record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTrigger {
  anchor: String,
}

impl Default for CaptureTrigger {
  fn default() -> Self {
    Self::new(DEFAULT_CAPTURE_ANCHOR)
  }
}

impl CaptureTrigger {
  pub fn new(anchor: &str) -> Self {
    Self { anchor: anchor.trim_start_matches('#').to_string() }
  }

  pub fn anchor(&self) -> &str {
    &self.anchor
  }

  pub fn fragment(&self) -> String {
    format!("#{}", self.anchor)
  }

  /// Server-side detection: the anchor identifier appears anywhere in the
  /// request path or query.
  pub fn in_request_uri(&self, uri: &str) -> bool {
    !self.anchor.is_empty() && uri.contains(self.anchor.as_str())
  }

  /// Client-side detection: `location.hash` names the anchor.
  pub fn in_hash(&self, hash: &str) -> bool {
    !self.anchor.is_empty() && hash.trim_start_matches('#') == self.anchor
  }

  /// Move `page_id` through the capture states and evaluate its region.
  pub fn capture<E: CompletionEvaluator + ?Sized>(
    &self,
    page_id: PageId,
    region: Option<&Region>,
    evaluator: &E,
    mut record: ProgressRecord,
  ) -> CaptureOutcome {
    let mut state = CaptureState::Idle.next(CaptureEvent::AnchorReached);
    let newly_captured = record.mark_captured(page_id);
    state = state.next(CaptureEvent::Persisted);
    if newly_captured {
      tracing::debug!(page_id, "page captured");
    }

    let Some(region) = region else {
      tracing::debug!(page_id, "captured page belongs to no region");
      return CaptureOutcome { state, newly_captured, region: None, region_complete: false, record };
    };
    let (region_complete, record) = evaluator.evaluate(region, record);
    CaptureOutcome { state, newly_captured, region: Some(region.clone()), region_complete, record }
  }
}
