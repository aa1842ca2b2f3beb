//! Parser for script module headers
//!
//! ```text
//! #%module
//! #% description: Computes a buffer around raster cells.
//! #% keywords: raster, buffer
//! #%end
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

use super::ModuleMetadata;

static BEGIN_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*#%\s*module\s*$").expect("valid begin marker regex"));

static END_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*#%\s*end\s*$").expect("valid end marker regex"));

/// Extract the `#%module` declaration block of a script
pub fn parse_script_header(text: &str) -> ModuleMetadata {
    let mut meta = ModuleMetadata::default();
    let mut in_block = false;

    for line in text.lines() {
        if !in_block {
            in_block = BEGIN_MARKER.is_match(line);
            continue;
        }
        if END_MARKER.is_match(line) {
            break;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().trim_start_matches("#%").trim();
        if key.is_empty() {
            continue;
        }
        meta.assign(key, value.trim().to_string());
    }

    meta
}
