//! Module discovery
//!
//! The structured index is tried first. When it cannot be used, discovery
//! scrapes the repository directory listing of every category, then the GUI
//! extensions page, and resolves metadata per module from its sources.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::category::{Category, LISTED_CATEGORIES};
use crate::error::FetchError;
use crate::metadata::{parse_native_source, parse_script_header, ModuleMetadata};
use crate::remote::{category_modules, fetch_index, gui_modules, Fetcher, IndexStatus};

/// What a listing should show per module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMode {
    /// Module names only
    Names,
    /// `name - description`
    Described,
    /// `key=value` lines for machine consumption
    MachineReadable,
}

impl ListMode {
    pub fn needs_metadata(&self) -> bool {
        !matches!(self, Self::Names)
    }
}

/// Where a discovery result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverySource {
    Index,
    Listing,
}

/// One discovered module
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleSummary {
    pub name: String,

    #[serde(flatten)]
    pub metadata: ModuleMetadata,
}

impl ModuleSummary {
    pub fn new(name: impl Into<String>, metadata: ModuleMetadata) -> Self {
        Self {
            name: name.into(),
            metadata,
        }
    }

    /// Text form of the summary in the given mode, without a trailing newline
    pub fn render(&self, mode: ListMode) -> String {
        match mode {
            ListMode::Names => self.name.clone(),
            ListMode::Described => format!("{} - {}", self.name, self.metadata.description),
            ListMode::MachineReadable => format!(
                "name={}\ndescription={}\nkeywords={}",
                self.name,
                self.metadata.description,
                self.metadata.keywords_display()
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryResult {
    pub source: DiscoverySource,
    pub modules: Vec<ModuleSummary>,
}

impl DiscoveryResult {
    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }
}

/// Progress callback, receives a percentage in `0..=100`
pub type ProgressFn = Box<dyn Fn(u8) + Send + Sync>;

/// Lists the extensions available in the add-ons repository
pub struct ModuleDiscovery<'a> {
    fetcher: &'a dyn Fetcher,
    index_url: String,
    svn_url: String,
    progress: Option<ProgressFn>,
}

impl<'a> ModuleDiscovery<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, index_url: impl Into<String>, svn_url: &str) -> Self {
        Self {
            fetcher,
            index_url: index_url.into(),
            svn_url: svn_url.trim_end_matches('/').to_string(),
            progress: None,
        }
    }

    /// Report scan progress; only used in machine-readable mode
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub async fn run(&self, mode: ListMode) -> DiscoveryResult {
        match fetch_index(self.fetcher, &self.index_url).await {
            IndexStatus::Loaded(index) if !index.is_empty() => {
                let modules = index
                    .tasks
                    .iter()
                    .map(|task| {
                        let metadata = if mode.needs_metadata() {
                            task.metadata()
                        } else {
                            ModuleMetadata::default()
                        };
                        ModuleSummary::new(&task.name, metadata)
                    })
                    .collect();
                return DiscoveryResult {
                    source: DiscoverySource::Index,
                    modules,
                };
            }
            IndexStatus::Loaded(_) => debug!("Structured index is empty"),
            IndexStatus::Unreachable(_) | IndexStatus::Malformed(_) => {}
        }

        info!("Structured index not available, scanning repository listings");
        self.scan_listings(mode).await
    }

    async fn scan_listings(&self, mode: ListMode) -> DiscoveryResult {
        let mut modules = Vec::new();
        let total = LISTED_CATEGORIES.len();

        for (i, category) in LISTED_CATEGORIES.iter().enumerate() {
            if mode == ListMode::MachineReadable {
                self.report_progress((i * 100 / total) as u8);
            }

            let url = self.category_url(category);
            let html = match self.fetcher.fetch_text(&url).await {
                Ok(html) => html,
                Err(e) => {
                    debug!("Skipping category {}: {}", category, e);
                    continue;
                }
            };

            for name in category_modules(&html, category.code()) {
                let metadata = if mode.needs_metadata() {
                    self.module_metadata(&url, &name).await
                } else {
                    ModuleMetadata::default()
                };
                modules.push(ModuleSummary::new(name, metadata));
            }
        }

        match self.gui_extensions().await {
            Ok(names) => {
                let url = self.category_url(&Category::Gui);
                for name in names {
                    let metadata = if mode.needs_metadata() {
                        self.module_metadata(&url, &name).await
                    } else {
                        ModuleMetadata::default()
                    };
                    modules.push(ModuleSummary::new(name, metadata));
                }
            }
            Err(e) => warn!("Unable to list GUI extensions: {}", e),
        }

        if mode == ListMode::MachineReadable {
            self.report_progress(100);
        }

        DiscoveryResult {
            source: DiscoverySource::Listing,
            modules,
        }
    }

    /// Names on the GUI extensions listing page
    pub async fn gui_extensions(&self) -> Result<Vec<String>, FetchError> {
        let html = self
            .fetcher
            .fetch_text(&self.category_url(&Category::Gui))
            .await?;
        Ok(gui_modules(&html))
    }

    /// Script header first, `main.c` when the header yields nothing
    async fn module_metadata(&self, category_url: &str, name: &str) -> ModuleMetadata {
        let script_url = format!("{category_url}/{name}/{name}");
        if let Ok(text) = self.fetcher.fetch_text(&script_url).await {
            let metadata = parse_script_header(&text);
            if !metadata.is_empty() {
                return metadata;
            }
        }

        let source_url = format!("{category_url}/{name}/main.c");
        match self.fetcher.fetch_text(&source_url).await {
            Ok(text) => parse_native_source(&text),
            Err(e) => {
                debug!("No metadata for {}: {}", name, e);
                ModuleMetadata::default()
            }
        }
    }

    fn category_url(&self, category: &Category) -> String {
        format!("{}/{}", self.svn_url, category.path())
    }

    fn report_progress(&self, percent: u8) {
        if let Some(progress) = &self.progress {
            progress(percent);
        }
    }
}
