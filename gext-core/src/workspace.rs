//! Scratch directory for checked-out sources
//!
//! A [`Workspace`] is removed when dropped. A retained workspace is left in
//! place and the module's checkout directory is logged instead.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    module: String,
    retain: bool,
}

impl Workspace {
    /// Create a fresh workspace for `module` under the system temp directory
    pub fn create(module: &str, retain: bool) -> Result<Self> {
        Self::create_in(&std::env::temp_dir(), module, retain)
    }

    pub fn create_in(parent: &Path, module: &str, retain: bool) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("gext-")
            .keep(retain)
            .tempdir_in(parent)
            .with_context(|| format!("Failed to create workspace in {}", parent.display()))?;
        debug!("Workspace created at {}", dir.path().display());

        Ok(Self {
            dir,
            module: module.to_string(),
            retain,
        })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Checkout directory of the module
    pub fn module_dir(&self) -> PathBuf {
        self.root().join(&self.module)
    }

    pub fn is_retained(&self) -> bool {
        self.retain
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.retain {
            info!("Path to the source code: {}", self.module_dir().display());
        }
    }
}
