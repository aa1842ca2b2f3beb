//! Extension removal
//!
//! The index manifest names exactly which files a module installed. Without
//! one, the conventional executable, script and manual page are removed.

use anyhow::Result;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::{Platform, RunContext};
use crate::error::ExtensionError;
use crate::remote::{fetch_index, Fetcher, IndexStatus};

/// How the files to delete were determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalStrategy {
    Manifest,
    Convention,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovalReport {
    pub name: String,
    pub strategy: RemovalStrategy,
    pub removed: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl RemovalReport {
    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Apply platform suffixes to a manifest entry and resolve it under `prefix`
///
/// Returns `None` for entries that are absolute or contain `.` or `..`
/// components, since those could resolve outside the prefix.
pub fn manifest_path(prefix: &Path, entry: &str, platform: Platform) -> Option<PathBuf> {
    let parts: Vec<&str> = entry.split('/').filter(|p| !p.is_empty()).collect();
    if parts.is_empty() || entry.starts_with('/') {
        return None;
    }
    let confined = parts.iter().all(|part| {
        let mut components = Path::new(part).components();
        matches!(components.next(), Some(Component::Normal(_))) && components.next().is_none()
    });
    if !confined {
        return None;
    }

    let suffix = match parts.first() {
        Some(&"bin") => platform.executable_suffix(),
        Some(&"scripts") => platform.script_suffix(),
        _ => "",
    };

    let mut path = prefix.to_path_buf();
    for (i, part) in parts.iter().enumerate() {
        if i + 1 == parts.len() {
            path.push(format!("{part}{suffix}"));
        } else {
            path.push(part);
        }
    }
    Some(path)
}

/// Uninstall `name` from the run's prefix
pub async fn remove_extension(
    ctx: &RunContext,
    fetcher: &dyn Fetcher,
    name: &str,
) -> Result<RemovalReport> {
    let mut warnings = Vec::new();

    let manifest: Vec<String> = match fetch_index(fetcher, &ctx.index_url()).await {
        IndexStatus::Loaded(index) => index
            .find(name)
            .map(|task| task.manifest_files().into_iter().map(str::to_string).collect())
            .unwrap_or_default(),
        IndexStatus::Unreachable(e) => {
            warnings.push(format!("Unable to fetch add-ons index: {e}"));
            Vec::new()
        }
        IndexStatus::Malformed(reason) => {
            warnings.push(format!("Unable to parse add-ons index: {reason}"));
            Vec::new()
        }
    };

    let mut report = if manifest.is_empty() {
        debug!("No manifest for {}, removing by convention", name);
        remove_by_convention(ctx, name)?
    } else {
        remove_by_manifest(ctx, name, &manifest)?
    };

    for warning in warnings {
        report.warn(warning);
    }

    info!("Extension <{}> successfully uninstalled.", name);
    Ok(report)
}

fn remove_by_manifest(ctx: &RunContext, name: &str, manifest: &[String]) -> Result<RemovalReport> {
    let mut report = RemovalReport {
        name: name.to_string(),
        strategy: RemovalStrategy::Manifest,
        removed: Vec::new(),
        warnings: Vec::new(),
    };
    let mut errors = Vec::new();

    for entry in manifest {
        let Some(path) = manifest_path(&ctx.prefix.root, entry, ctx.platform) else {
            report.warn(format!("Skipping manifest entry outside the prefix: '{entry}'"));
            continue;
        };
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                report.removed.push(path);
            }
            Err(e) => errors.push(format!("Unable to remove file '{}': {}", path.display(), e)),
        }
    }

    if report.removed.is_empty() {
        return Err(ExtensionError::not_found(name).into());
    }

    for error in errors {
        report.warn(error);
    }
    Ok(report)
}

fn remove_by_convention(ctx: &RunContext, name: &str) -> Result<RemovalReport> {
    let executable = ctx.prefix.bin_dir().join(name);
    if !executable.exists() {
        return Err(ExtensionError::not_found(name).into());
    }

    let mut report = RemovalReport {
        name: name.to_string(),
        strategy: RemovalStrategy::Convention,
        removed: Vec::new(),
        warnings: Vec::new(),
    };

    for path in [
        executable,
        ctx.prefix.scripts_dir().join(name),
        ctx.prefix.manual_page(name),
    ] {
        if !path.is_file() {
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Removed {}", path.display());
                report.removed.push(path);
            }
            Err(e) => report.warn(format!("Unable to remove file '{}': {}", path.display(), e)),
        }
    }

    Ok(report)
}
