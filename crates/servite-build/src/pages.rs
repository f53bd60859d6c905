//! Pages discovered by the pages plugin.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One routable page (or layout) of the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// URL path, e.g. `/about`; unique across pages
    pub route_path: String,
    pub file_path: PathBuf,
    /// Layouts wrap other pages and are never prerendered on their own
    #[serde(default)]
    pub is_layout: bool,
    #[serde(default, rename = "is404")]
    pub is_404: bool,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub meta: Map<String, Value>,
}

impl Page {
    pub fn new(route_path: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            route_path: route_path.into(),
            file_path: file_path.into(),
            is_layout: false,
            is_404: false,
            meta: Map::new(),
        }
    }

    pub fn layout(mut self) -> Self {
        self.is_layout = true;
        self
    }

    pub fn not_found(mut self) -> Self {
        self.is_404 = true;
        self
    }
}
