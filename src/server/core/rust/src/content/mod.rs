/* src/server/core/rust/src/content/mod.rs */

// Load the site's page tree from a CMS content export on disk.
// Pages missing a URL get one derived from their ancestors' slugs.

mod loader;
mod types;


pub use loader::{Site, load_site, parse_site};
