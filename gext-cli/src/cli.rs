//! Command line definition

use clap::{Parser, ValueEnum};
use gext_core::discovery::ListMode;
use std::path::PathBuf;

/// Maintains GRASS add-on extensions in a local installation
#[derive(Parser, Debug)]
#[clap(name = "gext", version, about, long_about = None)]
pub struct Cli {
    /// Name of the extension to install or remove
    pub extension: Option<String>,

    /// Operation to be performed
    #[clap(long, value_enum, default_value = "add")]
    pub operation: Operation,

    /// SVN repository URL (overrides the settings file)
    #[clap(long)]
    pub svnurl: Option<String>,

    /// Prefix where to install the extension (default: first GRASS_ADDON_PATH entry)
    #[clap(long)]
    pub prefix: Option<PathBuf>,

    /// List available extensions
    #[clap(short = 'l', long = "list")]
    pub list: bool,

    /// List available extensions including descriptions
    #[clap(short = 'c', long = "list-described")]
    pub list_described: bool,

    /// List available extensions in machine-readable format
    #[clap(short = 'g', long = "list-shell")]
    pub list_shell: bool,

    /// Install system-wide into GISBASE (may need write access)
    #[clap(short = 's', long = "system")]
    pub system_wide: bool,

    /// Download source code and print the build commands only
    #[clap(short = 'd', long = "download-only")]
    pub download_only: bool,

    /// Compile only, do not install
    #[clap(short = 'i', long = "compile-only")]
    pub compile_only: bool,

    /// Install precompiled files instead of building (default on Windows)
    #[clap(long)]
    pub prebuilt: bool,

    /// Print results as JSON
    #[clap(long)]
    pub json: bool,

    /// Settings file to use instead of the default location
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Show build tool output
    #[clap(short = 'v', long)]
    pub verbose: bool,

    /// Set log level
    #[clap(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    Add,
    Remove,
}

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl Cli {
    /// Requested listing, the most detailed flag wins
    pub fn list_mode(&self) -> Option<ListMode> {
        if self.list_shell {
            Some(ListMode::MachineReadable)
        } else if self.list_described {
            Some(ListMode::Described)
        } else if self.list {
            Some(ListMode::Names)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["gext", "r.foo"]).unwrap();
        assert_eq!(cli.extension.as_deref(), Some("r.foo"));
        assert_eq!(cli.operation, Operation::Add);
        assert_eq!(cli.list_mode(), None);
        assert!(!cli.system_wide);
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from(["gext", "-s", "-d", "-i", "wx.metadata"]).unwrap();
        assert!(cli.system_wide);
        assert!(cli.download_only);
        assert!(cli.compile_only);
    }

    #[test]
    fn test_remove_with_prefix() {
        let cli = Cli::try_parse_from([
            "gext",
            "v.foo",
            "--operation",
            "remove",
            "--prefix",
            "/opt/addons",
        ])
        .unwrap();
        assert_eq!(cli.operation, Operation::Remove);
        assert_eq!(cli.prefix, Some(PathBuf::from("/opt/addons")));
    }

    #[test]
    fn test_list_mode_precedence() {
        let cli = Cli::try_parse_from(["gext", "-l", "-g"]).unwrap();
        assert_eq!(cli.list_mode(), Some(ListMode::MachineReadable));
        let cli = Cli::try_parse_from(["gext", "-l", "-c"]).unwrap();
        assert_eq!(cli.list_mode(), Some(ListMode::Described));
        let cli = Cli::try_parse_from(["gext", "-l"]).unwrap();
        assert_eq!(cli.list_mode(), Some(ListMode::Names));
    }

    #[test]
    fn test_unknown_operation_rejected() {
        assert!(Cli::try_parse_from(["gext", "r.foo", "--operation", "upgrade"]).is_err());
    }
}
