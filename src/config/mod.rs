#[cfg(feature = "cli")]
pub mod cli;
pub mod env_file;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{Cli, Command};
pub use env_file::EnvFile;
pub use toml_config::{LauncherConfig, ProjectPaths};
