//! Remote sources: the structured index and repository directory listings
//!
//! # Overview
//!
//! ```text
//! Add-ons site
//!     │
//!     ├── grass<major>.xml        ← structured index (authoritative)
//!     └── <svnurl>/<category>/    ← HTML directory listings (fallback)
//!            │
//!            ▼
//!     Fetcher (HTTP)
//!            │
//!            ▼
//!     IndexStatus / listing names
//! ```
//!
//! Every fetch goes through the [`Fetcher`] trait so discovery and removal
//! can be exercised without a network.

mod index;
mod listing;

pub use index::{fetch_index, BinaryManifest, IndexStatus, RemoteIndex, TaskEntry};
pub use listing::{category_modules, gui_modules, listing_names};

use async_trait::async_trait;

use crate::error::FetchError;

/// Retrieves remote documents by URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the raw body of a URL
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError>;

    /// Fetch a URL as text, replacing invalid UTF-8
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let bytes = self.fetch_bytes(url).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use std::time::Duration;
    use tracing::debug;

    use super::Fetcher;
    use crate::error::FetchError;

    /// [`Fetcher`] backed by a shared `reqwest` client
    pub struct HttpFetcher {
        client: reqwest::Client,
    }

    impl HttpFetcher {
        pub fn new(timeout: Duration) -> Result<Self> {
            let client = reqwest::Client::builder()
                .user_agent(concat!("gext/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .context("Failed to create HTTP client")?;

            Ok(Self { client })
        }
    }

    #[async_trait]
    impl Fetcher for HttpFetcher {
        async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            debug!("url = {}", url);

            let transport = |e: reqwest::Error| FetchError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            };

            let response = self.client.get(url).send().await.map_err(transport)?;

            if !response.status().is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: response.status().as_u16(),
                });
            }

            let bytes = response.bytes().await.map_err(transport)?;
            Ok(bytes.to_vec())
        }
    }
}
