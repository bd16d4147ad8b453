pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{Cli, Command};

pub use config::{EnvFile, LauncherConfig, ProjectPaths};
pub use crate::core::bootstrap::{BootstrapSettings, Bootstrapper};
pub use utils::error::{LauncherError, Result};
