mod loader;
mod types;

pub use loader::{ConfigError, MAX_CATALOG_DEPTH};
pub use types::{BrowserConfig, Defaults};
