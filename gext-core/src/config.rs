//! Configuration for a single run
//!
//! Three layers feed a run, lowest precedence first:
//! 1. Built-in defaults ([`Settings::default`])
//! 2. The settings file (`settings.yaml` in the platform config directory)
//! 3. CLI flags, applied by the caller on top of the loaded [`Settings`]
//!
//! The host environment (`GISBASE`, `GRASS_ADDON_PATH`, ...) is captured once
//! into [`HostEnvironment`] and handed down inside a [`RunContext`]; nothing
//! below this module reads environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::prefix::InstallPrefix;

/// Default add-ons repository
pub const DEFAULT_SVN_URL: &str = "http://svn.osgeo.org/grass/grass-addons/grass7";

/// Default structured index location; `{major}` is the host major version
pub const DEFAULT_INDEX_URL: &str = "http://grass.osgeo.org/addons/grass{major}.xml";

/// Default location of precompiled add-ons for Windows hosts
pub const DEFAULT_PREBUILT_URL: &str = "http://wingrass.fsv.cvut.cz/grass{major}{minor}/addons";

/// Host version assumed when neither `GRASS_VERSION` nor the settings file provide one
pub const DEFAULT_HOST_VERSION: &str = "7.0.0";

/// Default HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Persistent settings (`settings.yaml`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Add-ons source repository URL
    pub svn_url: String,

    /// Structured index URL template
    pub index_url: String,

    /// Precompiled add-ons URL template
    pub prebuilt_url: String,

    /// Timeout applied to every HTTP request
    pub http_timeout_seconds: u64,

    /// Host version used when `GRASS_VERSION` is not set
    pub host_version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            svn_url: DEFAULT_SVN_URL.to_string(),
            index_url: DEFAULT_INDEX_URL.to_string(),
            prebuilt_url: DEFAULT_PREBUILT_URL.to_string(),
            http_timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECONDS,
            host_version: DEFAULT_HOST_VERSION.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!("No config directory available, using default settings");
                Ok(Self::default())
            }
        }
    }

    /// Load settings from a specific path; a missing file yields defaults
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("Settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(content).context("Failed to parse settings YAML")
    }

    /// `settings.yaml` inside the platform config directory
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "osgeo", "gext")
            .map(|dirs| dirs.config_dir().join("settings.yaml"))
    }

    /// Structured index URL for a host version
    pub fn index_url_for(&self, version: &HostVersion) -> String {
        self.index_url.replace("{major}", version.major())
    }

    /// Precompiled add-ons base URL for a host version
    pub fn prebuilt_url_for(&self, version: &HostVersion) -> String {
        self.prebuilt_url
            .replace("{major}", version.major())
            .replace("{minor}", version.minor())
    }
}

/// Host application version string, e.g. `7.0.svn`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostVersion(String);

impl HostVersion {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn major(&self) -> &str {
        self.0.split('.').next().unwrap_or_default()
    }

    pub fn minor(&self) -> &str {
        self.0.split('.').nth(1).unwrap_or_default()
    }
}

/// Target platform conventions for installed file names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Unix,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    /// Suffix appended to files installed under `bin/`
    pub fn executable_suffix(&self) -> &'static str {
        match self {
            Self::Unix => "",
            Self::Windows => ".exe",
        }
    }

    /// Suffix appended to files installed under `scripts/`
    pub fn script_suffix(&self) -> &'static str {
        match self {
            Self::Unix => "",
            Self::Windows => ".py",
        }
    }
}

/// Snapshot of the host environment taken at startup
#[derive(Debug, Clone)]
pub struct HostEnvironment {
    /// Host installation directory (`GISBASE`)
    pub gisbase: Option<PathBuf>,

    /// Raw `GRASS_ADDON_PATH` value
    pub addon_path: Option<OsString>,

    /// User home directory
    pub home: Option<PathBuf>,

    pub version: HostVersion,

    /// Show build tool output
    pub verbose: bool,
}

impl HostEnvironment {
    /// Read the process environment
    pub fn from_env(settings: &Settings) -> Self {
        let version = std::env::var("GRASS_VERSION")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| settings.host_version.clone());

        let verbose = std::env::var("GRASS_VERBOSE")
            .ok()
            .and_then(|v| v.trim().parse::<i32>().ok())
            .is_some_and(|level| level >= 3);

        Self {
            gisbase: std::env::var_os("GISBASE")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            addon_path: std::env::var_os("GRASS_ADDON_PATH"),
            home: dirs::home_dir(),
            version: HostVersion::new(version),
            verbose,
        }
    }

    /// Entries of `GRASS_ADDON_PATH`, empty items dropped
    pub fn addon_paths(&self) -> Vec<PathBuf> {
        self.addon_path
            .as_ref()
            .map(|raw| {
                std::env::split_paths(raw)
                    .filter(|p| !p.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First `GRASS_ADDON_PATH` entry, if the variable is set and non-empty
    pub fn primary_addon_path(&self) -> Option<PathBuf> {
        self.addon_paths().into_iter().next()
    }

    /// Host documentation directory (`$GISBASE/docs/html`)
    pub fn host_docs_dir(&self) -> Option<PathBuf> {
        self.gisbase.as_ref().map(|g| g.join("docs").join("html"))
    }
}

/// Everything one install/remove run needs, threaded explicitly
#[derive(Debug, Clone)]
pub struct RunContext {
    pub settings: Settings,
    pub host: HostEnvironment,
    pub prefix: InstallPrefix,
    pub platform: Platform,

    /// Keep the scratch workspace after the run and report its path
    pub keep_workspace: bool,
}

impl RunContext {
    pub fn new(settings: Settings, host: HostEnvironment, prefix: InstallPrefix) -> Self {
        Self {
            settings,
            host,
            prefix,
            platform: Platform::current(),
            keep_workspace: false,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn index_url(&self) -> String {
        self.settings.index_url_for(&self.host.version)
    }

    pub fn svn_url(&self) -> &str {
        self.settings.svn_url.trim_end_matches('/')
    }
}
