/* src/server/engine/rust/src/lib.rs */

pub mod capture;
pub mod completion;
pub mod escape;
pub mod hierarchy;
pub mod progress;
pub mod region;
pub mod sync;

// Public API re-exports
pub use capture::{
  CaptureEvent, CaptureOutcome, CaptureState, CaptureTrigger, DEFAULT_CAPTURE_ANCHOR,
  DEFAULT_CLIENT_DEBOUNCE_MS,
};
pub use completion::{
  ClientEvaluator, CompletionEvaluator, IndexedEvaluator, RegionPagesResponse, Tally,
};
pub use escape::script_safe_json;
pub use hierarchy::{
  Page, PageCollection, ParentCandidate, ParentMatch, RegionIndex, ResolverLimits, normalize_path,
};
pub use progress::{
  CAPTURED_COOKIE, COOKIE_MAX_AGE_SECS, ProgressDelta, ProgressRecord, VISITED_COOKIE,
  cookie_pairs, read_set, write_set,
};
pub use region::{COMPLETION_FLAG_VALUE, Language, PageId, ParseError, Region};
pub use sync::{DEFAULT_PROGRESS_MARKER, SyncOptions, decorate};
