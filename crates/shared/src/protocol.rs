use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// The two documents a page-builder session loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Layout,
    Components,
}

impl Resource {
    pub fn path(self) -> &'static str {
        match self {
            Self::Layout => "/layout",
            Self::Components => "/components",
        }
    }

    /// Fixture file backing the resource on the layout server.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Layout => "layout.json",
            Self::Components => "components.json",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layout => f.write_str("layout"),
            Self::Components => f.write_str("components"),
        }
    }
}
