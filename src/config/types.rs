use serde::{Deserialize, Serialize};

use crate::filter::SortPolicy;
use crate::list::DEFAULT_LAYOUT;

/// Root configuration container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub defaults: Defaults,
    /// Default direction for a newly added sort column.
    #[serde(default)]
    pub sort: SortPolicy,
}

/// Defaults applied to every new list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Records per page (default: 20).
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Layout name handed to the renderer (default: "table").
    #[serde(default = "default_layout")]
    pub layout: String,
    /// Foreign hops followed when building the catalog (default: 1).
    #[serde(default = "default_catalog_depth")]
    pub catalog_depth: usize,
}

fn default_page_size() -> usize {
    20
}

fn default_layout() -> String {
    DEFAULT_LAYOUT.to_string()
}

fn default_catalog_depth() -> usize {
    1
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            layout: default_layout(),
            catalog_depth: default_catalog_depth(),
        }
    }
}
