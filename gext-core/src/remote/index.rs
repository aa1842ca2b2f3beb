//! Structured add-ons index
//!
//! ```xml
//! <addons version="7">
//!   <task name="r.example">
//!     <description>Example raster module</description>
//!     <keywords>raster,example</keywords>
//!     <binary>
//!       <file>bin/r.example</file>
//!       <file>docs/html/r.example.html</file>
//!     </binary>
//!   </task>
//! </addons>
//! ```

use serde::Deserialize;
use tracing::{debug, warn};

use super::Fetcher;
use crate::error::FetchError;
use crate::metadata::{split_keywords, ModuleMetadata};

/// The parsed index document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteIndex {
    /// Task entries in document order
    #[serde(rename = "task", default)]
    pub tasks: Vec<TaskEntry>,
}

/// One module entry of the index
#[derive(Debug, Clone, Deserialize)]
pub struct TaskEntry {
    #[serde(rename = "@name", default)]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub keywords: Option<String>,

    /// Installed-file manifest
    #[serde(default)]
    pub binary: Option<BinaryManifest>,
}

/// Relative paths of the files a module installs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BinaryManifest {
    #[serde(rename = "file", default)]
    pub files: Vec<String>,
}

impl RemoteIndex {
    /// Parse index XML
    pub fn from_xml(content: &str) -> Result<Self, quick_xml::DeError> {
        quick_xml::de::from_str(content)
    }

    pub fn find(&self, name: &str) -> Option<&TaskEntry> {
        self.tasks.iter().find(|task| task.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl TaskEntry {
    /// Description and keywords taken directly from the entry
    pub fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            keywords: self
                .keywords
                .as_deref()
                .map(|k| split_keywords(k).collect())
                .unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Non-empty manifest file paths; empty when the entry has no manifest
    pub fn manifest_files(&self) -> Vec<&str> {
        self.binary
            .as_ref()
            .map(|binary| {
                binary
                    .files
                    .iter()
                    .map(|f| f.trim())
                    .filter(|f| !f.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Result of trying the structured index
#[derive(Debug)]
pub enum IndexStatus {
    Loaded(RemoteIndex),
    /// Transport or HTTP status failure
    Unreachable(FetchError),
    /// Fetched, but not a valid index document
    Malformed(String),
}

impl IndexStatus {
    pub fn into_index(self) -> Option<RemoteIndex> {
        match self {
            Self::Loaded(index) => Some(index),
            Self::Unreachable(_) | Self::Malformed(_) => None,
        }
    }
}

/// Fetch and parse the structured index; never fails
pub async fn fetch_index(fetcher: &dyn Fetcher, url: &str) -> IndexStatus {
    let content = match fetcher.fetch_text(url).await {
        Ok(content) => content,
        Err(e) => {
            debug!("Structured index unavailable: {}", e);
            return IndexStatus::Unreachable(e);
        }
    };

    match RemoteIndex::from_xml(&content) {
        Ok(index) => {
            debug!("Fetched index from {}: {} modules", url, index.tasks.len());
            IndexStatus::Loaded(index)
        }
        Err(e) => {
            warn!("Failed to parse add-ons index from {}: {}", url, e);
            IndexStatus::Malformed(e.to_string())
        }
    }
}
