/* src/server/core/rust/src/lib.rs */

pub mod content;
pub mod cookie;
pub mod debug;
pub mod errors;
pub mod nonce;
pub mod server;
pub mod settings;

// Re-exports for ergonomic use
pub use content::{Site, load_site, parse_site};
pub use cookie::{SetCookie, progress_cookies, read_record, reset_cookies};
pub use debug::{DebugReport, RegionReport, page_report, region_report};
pub use errors::FluError;
pub use nonce::{NonceKeeper, RESET_ACTION};
pub use server::{HuntParts, HuntServer};
pub use settings::{DEFAULT_DEBUG_QUERY_FLAG, DEFAULT_NONCE_LIFETIME_SECS, HuntSettings};
