//! Operations behind the command line

use anyhow::{Context, Result};
use gext_core::config::{HostEnvironment, RunContext, Settings};
use gext_core::discovery::{ListMode, ModuleDiscovery};
use gext_core::error::ExtensionError;
use gext_core::install::{InstallOutcome, InstallReport, InstallRequest, Installer};
use gext_core::prefix::InstallPrefix;
use gext_core::process::SystemRunner;
use gext_core::remote::{Fetcher, HttpFetcher};
use gext_core::remove::remove_extension;
use gext_core::workspace::Workspace;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cli::{Cli, Operation};

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load()?,
    };
    if let Some(url) = &cli.svnurl {
        settings.svn_url = url.clone();
    }

    let fetcher = HttpFetcher::new(Duration::from_secs(settings.http_timeout_seconds))?;

    let mut host = HostEnvironment::from_env(&settings);
    host.verbose |= cli.verbose;

    if let Some(mode) = cli.list_mode() {
        let index_url = settings.index_url_for(&host.version);
        return list_command(&fetcher, &index_url, &settings.svn_url, mode, cli.json).await;
    }

    let name = cli.extension.clone().ok_or_else(|| {
        ExtensionError::precondition("You need to define an extension name or use -l")
    })?;

    let prefix = InstallPrefix::resolve(cli.system_wide, cli.prefix.as_deref(), &host)?;
    debug!("Install prefix {} ({})", prefix.root.display(), prefix.source);

    let mut ctx = RunContext::new(settings, host, prefix);

    match cli.operation {
        Operation::Add => {
            ctx.keep_workspace = cli.download_only;
            let request = InstallRequest {
                name,
                system_wide: cli.system_wide,
                download_only: cli.download_only,
                compile_only: cli.compile_only,
                prebuilt: cli.prebuilt,
            };
            add_command(&ctx, &fetcher, &request, cli.json).await
        }
        Operation::Remove => {
            if cli.download_only {
                warn!("Flag 'd' is relevant only to 'operation=add'. Ignoring this flag.");
            }
            remove_command(&ctx, &fetcher, &name, cli.json).await
        }
    }
}

async fn list_command(
    fetcher: &dyn Fetcher,
    index_url: &str,
    svn_url: &str,
    mode: ListMode,
    json: bool,
) -> Result<()> {
    let mut discovery = ModuleDiscovery::new(fetcher, index_url, svn_url);
    if mode == ListMode::MachineReadable {
        discovery = discovery.with_progress(Box::new(|percent: u8| {
            eprintln!("GRASS_INFO_PERCENT: {percent}");
        }));
    }

    let result = discovery.run(mode).await;
    debug!("{} modules from {:?}", result.modules.len(), result.source);

    if json {
        println!("{}", serde_json::to_string_pretty(&result.modules)?);
        return Ok(());
    }

    if result.modules.is_empty() {
        info!("No extensions found");
        return Ok(());
    }

    for module in &result.modules {
        println!("{}", module.render(mode));
    }
    Ok(())
}

async fn add_command(
    ctx: &RunContext,
    fetcher: &dyn Fetcher,
    request: &InstallRequest,
    json: bool,
) -> Result<()> {
    let workspace = Workspace::create(&request.name, ctx.keep_workspace)?;
    let runner = SystemRunner::new(ctx.host.verbose);

    let report = Installer::new(ctx, fetcher, &runner)
        .install(request, &workspace)
        .await
        .with_context(|| format!("Failed to install '{}'", request.name))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.summary())?);
    } else {
        print_install_report(&report);
    }
    Ok(())
}

fn print_install_report(report: &InstallReport) {
    match &report.outcome {
        InstallOutcome::Staged { compile, install } => {
            println!("To compile run:");
            println!("{compile}");
            println!();
            println!("To install run:");
            println!("{install}");
        }
        InstallOutcome::Compiled => println!("Compiled '{}'", report.name),
        InstallOutcome::Installed => println!("Installed '{}'", report.name),
        InstallOutcome::InstallFailed => {
            println!("Compiled '{}', installation failed", report.name)
        }
        InstallOutcome::Prebuilt { files } => {
            println!("Installed '{}':", report.name);
            for file in files {
                println!("  {}", file.display());
            }
        }
    }
}

async fn remove_command(ctx: &RunContext, fetcher: &dyn Fetcher, name: &str, json: bool) -> Result<()> {
    let report = remove_extension(ctx, fetcher, name)
        .await
        .with_context(|| format!("Failed to remove '{name}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for path in &report.removed {
        println!("Removed {}", path.display());
    }
    Ok(())
}
