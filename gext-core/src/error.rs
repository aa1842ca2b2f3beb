//! Extension manager error types with clear, actionable messages

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised while installing or removing an extension
#[derive(Error, Debug)]
pub enum ExtensionError {
    /// A required condition does not hold; nothing has been changed yet
    #[error("{0}")]
    Precondition(String),

    /// A required external program is not on PATH
    #[error("'{tool}' required. Please install '{tool}' first.")]
    MissingTool { tool: String },

    /// The extension does not exist remotely or is not installed locally
    #[error("Extension <{name}> not found")]
    NotFound { name: String },

    /// The build tool exited with a nonzero status
    #[error("Compilation of <{name}> failed, sorry. Please check above error messages.")]
    Build { name: String },

    /// A directory or file under the install prefix could not be created
    #[error("Unable to create '{path}'")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtensionError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub fn not_found(name: &str) -> Self {
        Self::NotFound {
            name: name.to_string(),
        }
    }

    /// Whether the error belongs to the precondition class (nothing was attempted)
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_) | Self::MissingTool { .. })
    }
}

// ExtensionError travels inside anyhow::Error; callers recover the kind with
// `err.downcast_ref::<ExtensionError>()`.

/// Failure of a single remote fetch. Never fatal on its own.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, DNS, TLS or body read failure
    #[error("failed to fetch {url}: {reason}")]
    Transport { url: String, reason: String },

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}
