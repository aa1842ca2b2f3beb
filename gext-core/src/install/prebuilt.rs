//! Precompiled add-ons for Windows hosts

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::error::ExtensionError;
use crate::prefix::InstallPrefix;
use crate::remote::Fetcher;

/// Component directory, file suffix, and whether the file makes the module runnable
const COMPONENTS: [(&[&str], &str, bool); 4] = [
    (&["bin"], ".exe", true),
    (&["docs", "html"], ".html", false),
    (&["man", "man1"], "", false),
    (&["scripts"], ".py", true),
];

/// Download the precompiled files of `name` from `base_url` into `prefix`
///
/// Files missing on the server are skipped. Fails with
/// [`ExtensionError::NotFound`] when neither the executable nor the script
/// was downloaded.
pub async fn download_prebuilt(
    fetcher: &dyn Fetcher,
    base_url: &str,
    name: &str,
    prefix: &InstallPrefix,
) -> Result<Vec<PathBuf>> {
    info!("Downloading precompiled GRASS Addons <{}>...", name);

    let base_url = base_url.trim_end_matches('/');
    let mut installed = Vec::new();
    let mut runnable = false;

    for (dirs, suffix, makes_runnable) in COMPONENTS {
        let file_name = format!("{name}{suffix}");
        let url = format!("{}/{}/{}", base_url, dirs.join("/"), file_name);

        let bytes = match fetcher.fetch_bytes(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!("Skipping {}: {}", url, e);
                continue;
            }
        };

        let target = dirs
            .iter()
            .fold(prefix.root.clone(), |path, dir| path.join(dir))
            .join(&file_name);
        std::fs::write(&target, bytes).map_err(|e| ExtensionError::Filesystem {
            path: target.clone(),
            source: e,
        })?;
        debug!("Downloaded {} to {}", url, target.display());

        runnable |= makes_runnable;
        installed.push(target);
    }

    if !runnable {
        return Err(ExtensionError::not_found(name).into());
    }
    Ok(installed)
}
