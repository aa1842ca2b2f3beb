//! Repository directory listing scrape
//!
//! Listing pages are plain HTML with one entry per line:
//! `<li><a href="r.buffer/">r.buffer/</a></li>`. Only the anchor text is used.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::category::module_code;

static LISTING_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<li><a href="[^"]+">([^<]+)</a></li>"#).expect("valid listing regex")
});

/// Entries excluded from the GUI listing
const LISTING_ARTIFACTS: [&str; 2] = ["..", "Makefile"];

/// Anchor texts of a listing page, trailing `/` removed
pub fn listing_names(html: &str) -> Vec<String> {
    html.lines()
        .filter_map(|line| LISTING_ITEM.captures(line))
        .map(|caps| caps[1].trim().trim_end_matches('/').to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Listing entries belonging to the category `code`
///
/// A sibling directory or stray link on the page is rejected unless its
/// name starts with `<code>.`.
pub fn category_modules(html: &str, code: &str) -> Vec<String> {
    listing_names(html)
        .into_iter()
        .filter(|name| module_code(name) == code && name.contains('.'))
        .collect()
}

/// Listing entries of the GUI extensions page
pub fn gui_modules(html: &str) -> Vec<String> {
    listing_names(html)
        .into_iter()
        .filter(|name| !LISTING_ARTIFACTS.contains(&name.as_str()))
        .collect()
}
