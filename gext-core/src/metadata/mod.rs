//! Module metadata extraction
//!
//! Remote modules do not share one metadata format. Script modules carry a
//! `#%module ... #%end` header; compiled modules register their description
//! and keywords in `main.c`. Both parsers are best-effort: they never fail
//! and return an empty record when nothing is recognised.

mod native;
mod script;

pub use native::parse_native_source;
pub use script::parse_script_header;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description and keywords of one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// Any other declared field (`label`, `overwrite`, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl ModuleMetadata {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.keywords.is_empty() && self.extra.is_empty()
    }

    /// Keywords joined for single-line output
    pub fn keywords_display(&self) -> String {
        self.keywords.join(",")
    }

    fn assign(&mut self, key: &str, value: String) {
        match key {
            "description" => self.description = value,
            "keywords" => self.keywords.extend(split_keywords(&value)),
            _ => {
                self.extra.insert(key.to_string(), value);
            }
        }
    }
}

/// Split a comma-delimited keyword list, dropping empty items
pub(crate) fn split_keywords(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
}
