//! Extension installation
//!
//! # Lifecycle
//!
//! ```text
//! Idle ─► Resolved ─► Fetched ─┬─► Staged                 (download only)
//!                              └─► Compiled ─┬─► (stop)    (compile only, GUI)
//!                                            └─► Installed ─► DocsRewritten
//! ```
//!
//! Fatal conditions surface as [`ExtensionError`] inside `anyhow::Error`.
//! Everything else is collected as warnings on the [`InstallReport`].

mod commands;
mod docs;
mod prebuilt;

pub use commands::BuildPlan;
pub use docs::{rewrite_links, rewrite_manual_page};
pub use prebuilt::download_prebuilt;

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::category::Category;
use crate::config::{Platform, RunContext};
use crate::discovery::ModuleDiscovery;
use crate::error::ExtensionError;
use crate::process::{check_required_tools, CommandRunner, Invocation};
use crate::remote::Fetcher;
use crate::workspace::Workspace;

/// What the caller asked for
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    pub name: String,
    pub system_wide: bool,
    /// Fetch sources and report the build commands without running them
    pub download_only: bool,
    /// Compile but skip the install step
    pub compile_only: bool,
    /// Download precompiled files instead of building
    pub prebuilt: bool,
}

impl InstallRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Category extension or wxGUI extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionKind {
    Module(Category),
    Gui,
}

impl ExtensionKind {
    pub fn is_gui(&self) -> bool {
        matches!(self, Self::Gui)
    }

    /// Repository category the sources live under
    pub fn category(&self) -> Category {
        match self {
            Self::Module(category) => category.clone(),
            Self::Gui => Category::Gui,
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Module(category) => write!(f, "{category}"),
            Self::Gui => f.write_str("wxGUI"),
        }
    }
}

/// Where the install stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Sources fetched; commands reported instead of run
    Staged {
        compile: Invocation,
        install: Invocation,
    },
    Compiled,
    Installed,
    /// Compiled, but the install step failed
    InstallFailed,
    /// Precompiled files written under the prefix
    Prebuilt { files: Vec<PathBuf> },
}

#[derive(Debug, Clone)]
pub struct InstallReport {
    pub name: String,
    pub kind: ExtensionKind,
    pub outcome: InstallOutcome,
    pub warnings: Vec<String>,
}

impl InstallReport {
    fn new(name: &str, kind: ExtensionKind, outcome: InstallOutcome) -> Self {
        Self {
            name: name.to_string(),
            kind,
            outcome,
            warnings: Vec::new(),
        }
    }

    fn warn(&mut self, message: String) {
        warn!("{}", message);
        self.warnings.push(message);
    }
}

/// Summary for `--json` output
#[derive(Debug, Serialize)]
pub struct InstallSummary<'a> {
    pub name: &'a str,
    pub kind: String,
    pub outcome: &'static str,
    pub warnings: &'a [String],
}

impl InstallReport {
    pub fn summary(&self) -> InstallSummary<'_> {
        InstallSummary {
            name: &self.name,
            kind: self.kind.to_string(),
            outcome: match self.outcome {
                InstallOutcome::Staged { .. } => "staged",
                InstallOutcome::Compiled => "compiled",
                InstallOutcome::Installed => "installed",
                InstallOutcome::InstallFailed => "install_failed",
                InstallOutcome::Prebuilt { .. } => "prebuilt",
            },
            warnings: &self.warnings,
        }
    }
}

/// Drives one extension through fetch, build, install and docs rewrite
pub struct Installer<'a> {
    ctx: &'a RunContext,
    fetcher: &'a dyn Fetcher,
    runner: &'a dyn CommandRunner,
}

impl<'a> Installer<'a> {
    pub fn new(ctx: &'a RunContext, fetcher: &'a dyn Fetcher, runner: &'a dyn CommandRunner) -> Self {
        Self {
            ctx,
            fetcher,
            runner,
        }
    }

    /// Install from precompiled files on Windows or when asked to, otherwise build from source
    pub async fn install(&self, request: &InstallRequest, workspace: &Workspace) -> Result<InstallReport> {
        if request.prebuilt || self.ctx.platform == Platform::Windows {
            self.install_prebuilt(request).await
        } else {
            self.install_from_source(request, workspace).await
        }
    }

    pub async fn install_from_source(
        &self,
        request: &InstallRequest,
        workspace: &Workspace,
    ) -> Result<InstallReport> {
        let name = request.name.as_str();

        let gisbase = self
            .ctx
            .host
            .gisbase
            .as_deref()
            .ok_or_else(|| ExtensionError::precondition("$GISBASE not defined"))?;

        if self.ctx.platform != Platform::Windows {
            check_required_tools(self.runner)?;
        }

        let kind = self.classify(name).await;
        if kind.is_gui() && !request.system_wide {
            return Err(ExtensionError::precondition(
                "Installation of wxGUI extension requires -s flag.",
            )
            .into());
        }
        debug!("{} resolved to {}", name, kind);

        let mut report = InstallReport::new(name, kind.clone(), InstallOutcome::Compiled);
        if self.is_installed(name) {
            report.warn(format!(
                "Extension <{name}> already installed. Will be updated..."
            ));
        }

        self.ctx
            .prefix
            .ensure_layout(self.ctx.host.host_docs_dir().as_deref())?;

        let plan = BuildPlan::new(name, gisbase, workspace.root(), &self.ctx.prefix.root);

        info!("Fetching '{}' from GRASS-Addons SVN (be patient)...", name);
        let source_url = format!("{}/{}/{}", self.ctx.svn_url(), kind.category().path(), name);
        let status = self.run(&plan.checkout(&source_url)).await?;
        if !status {
            return Err(ExtensionError::not_found(name).into());
        }

        let compile = plan.compile(&kind);
        if request.download_only {
            report.outcome = InstallOutcome::Staged {
                compile,
                install: plan.install(),
            };
            return Ok(report);
        }

        info!("Compiling '{}'...", name);
        if !self.run(&compile).await? {
            return Err(ExtensionError::Build {
                name: name.to_string(),
            }
            .into());
        }

        if request.compile_only || kind.is_gui() {
            return Ok(report);
        }

        info!("Installing '{}'...", name);
        if self.run(&plan.install()).await? {
            info!("Installation of '{}' successfully finished.", name);
            report.outcome = InstallOutcome::Installed;
        } else {
            report.warn("Installation failed, sorry. Please check above error messages.".to_string());
            report.outcome = InstallOutcome::InstallFailed;
        }

        self.finish_docs(name, &mut report)?;
        Ok(report)
    }

    /// Download precompiled files into the prefix
    pub async fn install_prebuilt(&self, request: &InstallRequest) -> Result<InstallReport> {
        let name = request.name.as_str();
        self.ctx
            .prefix
            .ensure_layout(self.ctx.host.host_docs_dir().as_deref())?;

        let base_url = self.ctx.settings.prebuilt_url_for(&self.ctx.host.version);
        let files = download_prebuilt(self.fetcher, &base_url, name, &self.ctx.prefix).await?;
        info!("Installation of '{}' successfully finished.", name);

        Ok(InstallReport::new(
            name,
            ExtensionKind::Module(Category::of_module(name)),
            InstallOutcome::Prebuilt { files },
        ))
    }

    /// Names starting with `wx` and the `gui` code are resolved offline;
    /// other unknown codes are looked up on the GUI listing
    async fn classify(&self, name: &str) -> ExtensionKind {
        if name.starts_with("wx") {
            return ExtensionKind::Gui;
        }

        let category = Category::of_module(name);
        if category == Category::Gui {
            return ExtensionKind::Gui;
        }
        if category.is_known() {
            return ExtensionKind::Module(category);
        }

        let discovery = ModuleDiscovery::new(self.fetcher, self.ctx.index_url(), self.ctx.svn_url());
        match discovery.gui_extensions().await {
            Ok(gui) if gui.iter().any(|g| g == name) => ExtensionKind::Gui,
            Ok(_) => ExtensionKind::Module(category),
            Err(e) => {
                warn!("Unable to list GUI extensions: {}", e);
                ExtensionKind::Module(category)
            }
        }
    }

    fn is_installed(&self, name: &str) -> bool {
        let executable = self
            .ctx
            .prefix
            .bin_dir()
            .join(format!("{}{}", name, self.ctx.platform.executable_suffix()));
        executable.exists() || self.runner.find_program(name).is_some()
    }

    async fn run(&self, invocation: &Invocation) -> Result<bool> {
        let status = self
            .runner
            .run(invocation)
            .await
            .with_context(|| format!("Failed to run: {invocation}"))?;
        Ok(status.is_success())
    }

    fn finish_docs(&self, name: &str, report: &mut InstallReport) -> Result<()> {
        let Some(addon_path) = self.ctx.host.primary_addon_path() else {
            report.warn(
                "This add-on module will not function until you set the \
                 GRASS_ADDON_PATH environment variable"
                    .to_string(),
            );
            return Ok(());
        };

        let page = addon_path
            .join("docs")
            .join("html")
            .join(format!("{name}.html"));
        match self.ctx.host.host_docs_dir() {
            Some(host_docs) if page.is_file() => rewrite_manual_page(&page, &host_docs),
            _ => {
                debug!("No manual page at {}", page.display());
                Ok(())
            }
        }
    }
}
