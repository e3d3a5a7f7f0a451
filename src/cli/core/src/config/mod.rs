/* src/cli/core/src/config/mod.rs */

mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use loader::{apply_overrides, find_flu_config, load_flu_config, parse_flu_config};
pub use types::FluConfig;
