//! Manual page link rewriting
//!
//! A manual page installed outside the host tree refers to the host's style
//! assets and to other modules' pages by bare file name. Both are pointed at
//! the host documentation directory.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;
use tracing::debug;

static STYLE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)((?:href|src)=")(grassdocs\.css|grass_logo\.png)""#)
        .expect("valid style reference regex")
});

static CROSS_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<a href="((?:d|db|g|i|m|p|ps|r|r3|s|v|wxGUI)\.[^"/]+\.html)">"#)
        .expect("valid cross reference regex")
});

/// Point style assets and module cross references at `host_docs`
///
/// Each link is visited once; a rewritten link never matches again.
pub fn rewrite_links(html: &str, host_docs: &Path) -> String {
    let styled = STYLE_REFERENCE.replace_all(html, |caps: &Captures| {
        format!("{}{}\"", &caps[1], host_docs.join(&caps[2]).display())
    });

    CROSS_REFERENCE
        .replace_all(&styled, |caps: &Captures| {
            format!("<a href=\"{}\">", host_docs.join(&caps[1]).display())
        })
        .into_owned()
}

/// Rewrite an installed manual page in place
pub fn rewrite_manual_page(page: &Path, host_docs: &Path) -> Result<()> {
    let html = std::fs::read_to_string(page)
        .with_context(|| format!("Failed to read manual page: {}", page.display()))?;

    let rewritten = rewrite_links(&html, host_docs);
    if rewritten == html {
        debug!("No links to rewrite in {}", page.display());
        return Ok(());
    }

    std::fs::write(page, rewritten)
        .with_context(|| format!("Failed to write manual page: {}", page.display()))?;
    debug!("Rewrote links in {}", page.display());
    Ok(())
}
