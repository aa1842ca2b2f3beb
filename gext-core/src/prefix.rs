//! Install prefix resolution and layout
//!
//! Resolution order (first match wins):
//! 1. System-wide flag: install into `GISBASE`
//! 2. Explicit `--prefix`
//! 3. First entry of `GRASS_ADDON_PATH`
//! 4. Per-user default `~/.grass<major>/addons`

use anyhow::Result;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::HostEnvironment;
use crate::error::ExtensionError;

/// Documentation styling assets shared with the host manual
pub const STYLE_FILES: [&str; 2] = ["grass_logo.png", "grassdocs.css"];

/// Which rule picked the install prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixSource {
    SystemWide,
    Explicit,
    AddonPath,
    UserDefault,
}

impl fmt::Display for PrefixSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::SystemWide => "system-wide (GISBASE)",
            Self::Explicit => "--prefix",
            Self::AddonPath => "GRASS_ADDON_PATH",
            Self::UserDefault => "per-user default",
        };
        f.write_str(label)
    }
}

/// Root directory receiving installed extension artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPrefix {
    pub root: PathBuf,
    pub source: PrefixSource,
}

impl InstallPrefix {
    pub fn new(root: impl Into<PathBuf>, source: PrefixSource) -> Self {
        Self {
            root: root.into(),
            source,
        }
    }

    /// Pick the install prefix for this run
    pub fn resolve(
        system_wide: bool,
        explicit: Option<&Path>,
        host: &HostEnvironment,
    ) -> Result<Self> {
        if system_wide {
            let gisbase = host.gisbase.as_ref().ok_or_else(|| {
                ExtensionError::precondition("$GISBASE not defined; required for system-wide install")
            })?;
            return Ok(Self::new(gisbase, PrefixSource::SystemWide));
        }

        if let Some(path) = explicit {
            return Ok(Self::new(path, PrefixSource::Explicit));
        }

        let addon_paths = host.addon_paths();
        if let Some(first) = addon_paths.first() {
            if addon_paths.len() > 1 {
                warn!(
                    "GRASS_ADDON_PATH has more items, using first defined - '{}'",
                    first.display()
                );
            }
            return Ok(Self::new(first, PrefixSource::AddonPath));
        }

        let home = host.home.as_ref().ok_or_else(|| {
            ExtensionError::precondition(
                "GRASS_ADDON_PATH is not defined and the home directory is unknown",
            )
        })?;
        let root = home
            .join(format!(".grass{}", host.version.major()))
            .join("addons");
        warn!(
            "GRASS_ADDON_PATH is not defined, installing to {}",
            root.display()
        );
        Ok(Self::new(root, PrefixSource::UserDefault))
    }

    pub fn bin_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.root.join("scripts")
    }

    pub fn html_dir(&self) -> PathBuf {
        self.root.join("docs").join("html")
    }

    pub fn man_dir(&self) -> PathBuf {
        self.root.join("man").join("man1")
    }

    /// Installed manual page of a module
    pub fn manual_page(&self, name: &str) -> PathBuf {
        self.html_dir().join(format!("{name}.html"))
    }

    /// Create the prefix tree and seed documentation styling assets
    ///
    /// Style files are copied from `host_docs` only when missing under the
    /// prefix; existing copies are never overwritten.
    pub fn ensure_layout(&self, host_docs: Option<&Path>) -> Result<()> {
        for dir in [
            self.bin_dir(),
            self.html_dir(),
            self.man_dir(),
            self.scripts_dir(),
        ] {
            create_dir(&dir)?;
        }

        let Some(host_docs) = host_docs else {
            debug!("Host documentation directory unknown, skipping style files");
            return Ok(());
        };

        for file in STYLE_FILES {
            let target = self.html_dir().join(file);
            if target.is_file() {
                continue;
            }
            let source = host_docs.join(file);
            if !source.is_file() {
                warn!("Style file {} not found, skipping", source.display());
                continue;
            }
            std::fs::copy(&source, &target).map_err(|e| ExtensionError::Filesystem {
                path: target.clone(),
                source: e,
            })?;
            debug!("Copied {} to {}", source.display(), target.display());
        }

        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|e| ExtensionError::Filesystem {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!("'{}' created", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HostVersion;
    use std::ffi::OsString;
    use tempfile::TempDir;

    fn host(gisbase: Option<&Path>, addon_path: Option<OsString>, home: Option<&Path>) -> HostEnvironment {
        HostEnvironment {
            gisbase: gisbase.map(Path::to_path_buf),
            addon_path,
            home: home.map(Path::to_path_buf),
            version: HostVersion::new("7.0.svn"),
            verbose: false,
        }
    }

    #[test]
    fn test_system_wide_wins() {
        let env = host(
            Some(Path::new("/usr/lib/grass70")),
            Some(OsString::from("/opt/addons")),
            Some(Path::new("/home/u")),
        );
        let prefix = InstallPrefix::resolve(true, Some(Path::new("/explicit")), &env).unwrap();
        assert_eq!(prefix.root, PathBuf::from("/usr/lib/grass70"));
        assert_eq!(prefix.source, PrefixSource::SystemWide);
    }

    #[test]
    fn test_system_wide_without_gisbase_is_precondition() {
        let env = host(None, None, Some(Path::new("/home/u")));
        let err = InstallPrefix::resolve(true, None, &env).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ExtensionError>(),
            Some(ExtensionError::Precondition(_))
        ));
    }

    #[test]
    fn test_explicit_beats_addon_path() {
        let env = host(None, Some(OsString::from("/opt/addons")), None);
        let prefix = InstallPrefix::resolve(false, Some(Path::new("/explicit")), &env).unwrap();
        assert_eq!(prefix.root, PathBuf::from("/explicit"));
        assert_eq!(prefix.source, PrefixSource::Explicit);
    }

    #[test]
    fn test_first_addon_path_entry() {
        let joined = std::env::join_paths(["/opt/one", "/opt/two"]).unwrap();
        let env = host(None, Some(joined), None);
        let prefix = InstallPrefix::resolve(false, None, &env).unwrap();
        assert_eq!(prefix.root, PathBuf::from("/opt/one"));
        assert_eq!(prefix.source, PrefixSource::AddonPath);
    }

    #[test]
    fn test_user_default_keyed_by_major_version() {
        let env = host(None, Some(OsString::new()), Some(Path::new("/home/u")));
        let prefix = InstallPrefix::resolve(false, None, &env).unwrap();
        assert_eq!(prefix.root, PathBuf::from("/home/u/.grass7/addons"));
        assert_eq!(prefix.source, PrefixSource::UserDefault);
    }

    #[test]
    fn test_ensure_layout_copies_style_files_once() {
        let temp_dir = TempDir::new().unwrap();
        let host_docs = temp_dir.path().join("gisbase/docs/html");
        std::fs::create_dir_all(&host_docs).unwrap();
        std::fs::write(host_docs.join("grassdocs.css"), "body {}").unwrap();
        std::fs::write(host_docs.join("grass_logo.png"), "png").unwrap();

        let prefix = InstallPrefix::new(temp_dir.path().join("addons"), PrefixSource::Explicit);
        prefix.ensure_layout(Some(&host_docs)).unwrap();

        assert!(prefix.bin_dir().is_dir());
        assert!(prefix.scripts_dir().is_dir());
        assert!(prefix.man_dir().is_dir());
        assert_eq!(
            std::fs::read_to_string(prefix.html_dir().join("grassdocs.css")).unwrap(),
            "body {}"
        );

        // A local edit survives a second run
        std::fs::write(prefix.html_dir().join("grassdocs.css"), "custom").unwrap();
        prefix.ensure_layout(Some(&host_docs)).unwrap();
        assert_eq!(
            std::fs::read_to_string(prefix.html_dir().join("grassdocs.css")).unwrap(),
            "custom"
        );
    }

    #[test]
    fn test_ensure_layout_without_host_docs() {
        let temp_dir = TempDir::new().unwrap();
        let prefix = InstallPrefix::new(temp_dir.path(), PrefixSource::Explicit);
        prefix.ensure_layout(None).unwrap();
        assert!(prefix.html_dir().is_dir());
        assert!(!prefix.html_dir().join("grassdocs.css").exists());
    }
}
