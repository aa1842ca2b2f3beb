//! Shared fixtures for integration tests: an in-memory fetcher, a recording
//! command runner and a ready-made run context.

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use gext_core::config::{HostEnvironment, HostVersion, Platform, RunContext, Settings};
use gext_core::error::FetchError;
use gext_core::prefix::{InstallPrefix, PrefixSource};
use gext_core::process::{CommandRunner, CommandStatus, Invocation};
use gext_core::remote::Fetcher;
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once};

pub const SVN_URL: &str = "http://svn.test/grass7";
pub const INDEX_URL: &str = "http://index.test/grass7.xml";

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Serves fixed documents by URL; every other URL answers 404
#[derive(Default)]
pub struct StaticFetcher {
    pages: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.pages.insert(url.to_string(), body.as_bytes().to_vec());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
            url: url.to_string(),
            status: 404,
        })
    }
}

/// Build step an invocation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Checkout,
    Compile,
    Install,
}

impl Step {
    pub fn of(invocation: &Invocation) -> Self {
        if invocation.program == "svn" {
            Self::Checkout
        } else if invocation.args.last().map(String::as_str) == Some("install") {
            Self::Install
        } else {
            Self::Compile
        }
    }
}

/// Records invocations; every step succeeds unless told otherwise
pub struct MockRunner {
    programs: HashSet<String>,
    failures: HashMap<Step, i32>,
    invocations: Mutex<Vec<Invocation>>,
}

impl MockRunner {
    /// A runner on whose PATH all build tools are present
    pub fn new() -> Self {
        Self {
            programs: ["svn", "make", "gcc"].iter().map(|s| s.to_string()).collect(),
            failures: HashMap::new(),
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn without_program(mut self, name: &str) -> Self {
        self.programs.remove(name);
        self
    }

    pub fn with_program(mut self, name: &str) -> Self {
        self.programs.insert(name.to_string());
        self
    }

    pub fn failing(mut self, step: Step, code: i32) -> Self {
        self.failures.insert(step, code);
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    pub fn steps(&self) -> Vec<Step> {
        self.invocations().iter().map(Step::of).collect()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandStatus> {
        self.invocations.lock().unwrap().push(invocation.clone());
        Ok(match self.failures.get(&Step::of(invocation)) {
            Some(code) => CommandStatus::failure(*code),
            None => CommandStatus::success(),
        })
    }

    fn find_program(&self, name: &str) -> Option<PathBuf> {
        self.programs
            .contains(name)
            .then(|| PathBuf::from("/usr/bin").join(name))
    }
}

pub fn test_settings() -> Settings {
    Settings {
        svn_url: SVN_URL.to_string(),
        index_url: INDEX_URL.to_string(),
        prebuilt_url: "http://prebuilt.test/grass{major}{minor}/addons".to_string(),
        ..Settings::default()
    }
}

/// Host with `gisbase` set and, optionally, `GRASS_ADDON_PATH`
pub fn test_host(gisbase: Option<&Path>, addon_path: Option<&Path>) -> HostEnvironment {
    HostEnvironment {
        gisbase: gisbase.map(Path::to_path_buf),
        addon_path: addon_path.map(|p| OsString::from(p.as_os_str())),
        home: None,
        version: HostVersion::new("7.0.svn"),
        verbose: false,
    }
}

pub fn test_context(prefix: &Path, host: HostEnvironment) -> RunContext {
    RunContext::new(
        test_settings(),
        host,
        InstallPrefix::new(prefix, PrefixSource::Explicit),
    )
    .with_platform(Platform::Unix)
}

/// A host tree with the documentation style files in place
pub fn create_gisbase(root: &Path) -> PathBuf {
    let gisbase = root.join("gisbase");
    let docs = gisbase.join("docs").join("html");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("grassdocs.css"), "body {}").unwrap();
    std::fs::write(docs.join("grass_logo.png"), "png").unwrap();
    gisbase
}
