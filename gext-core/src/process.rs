//! External program invocation
//!
//! The version-control client and the build tool are driven through the
//! [`CommandRunner`] trait. Only the exit status is consumed; standard
//! output is discarded unless the host asked for verbose output.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::debug;

use crate::error::ExtensionError;

/// Programs a source build depends on
pub const REQUIRED_TOOLS: [&str; 3] = ["svn", "make", "gcc"];

/// A fully parameterised external command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Value of a `KEY=value` argument
    pub fn param(&self, key: &str) -> Option<&str> {
        self.args.iter().find_map(|arg| {
            arg.split_once('=')
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v)
        })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Exit status of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    pub code: Option<i32>,
}

impl CommandStatus {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn failure(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external programs and locates them on PATH
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion and report the exit status
    async fn run(&self, invocation: &Invocation) -> Result<CommandStatus>;

    /// Resolve a program name on PATH
    fn find_program(&self, name: &str) -> Option<PathBuf>;
}

/// [`CommandRunner`] that spawns real processes
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    verbose: bool,
}

impl SystemRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandStatus> {
        debug!("Running: {}", invocation);

        let mut cmd = tokio::process::Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit());
        if self.verbose {
            cmd.stdout(Stdio::inherit());
        } else {
            cmd.stdout(Stdio::null());
        }
        if let Some(dir) = &invocation.current_dir {
            cmd.current_dir(dir);
        }

        let status = cmd
            .status()
            .await
            .with_context(|| format!("Failed to execute '{}'", invocation.program))?;

        debug!("'{}' exited with {:?}", invocation.program, status.code());
        Ok(CommandStatus {
            code: status.code(),
        })
    }

    fn find_program(&self, name: &str) -> Option<PathBuf> {
        which::which(name).ok()
    }
}

/// Fail with [`ExtensionError::MissingTool`] for the first required tool not on PATH
pub fn check_required_tools(runner: &dyn CommandRunner) -> Result<()> {
    for tool in REQUIRED_TOOLS {
        if runner.find_program(tool).is_none() {
            return Err(ExtensionError::MissingTool {
                tool: tool.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

/// Escape spaces for a path handed to make as a variable value
pub fn make_escape(path: &Path) -> String {
    path.to_string_lossy().replace(' ', "\\ ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_display_and_params() {
        let inv = Invocation::new("make")
            .arg("MODULE_TOPDIR=/usr/lib/grass70")
            .arg("install");
        assert_eq!(inv.to_string(), "make MODULE_TOPDIR=/usr/lib/grass70 install");
        assert_eq!(inv.param("MODULE_TOPDIR"), Some("/usr/lib/grass70"));
        assert_eq!(inv.param("INST_DIR"), None);
    }

    #[test]
    fn test_make_escape() {
        assert_eq!(
            make_escape(Path::new("/opt/GRASS 7/base")),
            "/opt/GRASS\\ 7/base"
        );
    }

    #[test]
    fn test_command_status() {
        assert!(CommandStatus::success().is_success());
        assert!(!CommandStatus::failure(2).is_success());
        assert!(!CommandStatus { code: None }.is_success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_reports_exit_status() {
        let runner = SystemRunner::new(false);
        let ok = runner.run(&Invocation::new("true")).await.unwrap();
        let failed = runner.run(&Invocation::new("false")).await.unwrap();
        assert!(ok.is_success());
        assert!(!failed.is_success());
    }

    #[tokio::test]
    async fn test_system_runner_missing_program_is_error() {
        let runner = SystemRunner::new(false);
        let result = runner
            .run(&Invocation::new("gext-definitely-not-a-real-program"))
            .await;
        assert!(result.is_err());
    }
}
