//! gext core library: discovery, build, installation and removal of GRASS add-ons

pub mod category;
pub mod config;
pub mod discovery;
pub mod error;
pub mod install;
pub mod metadata;
pub mod prefix;
pub mod process;
pub mod remote;
pub mod remove;
pub mod workspace;

pub use error::{ExtensionError, FetchError};
