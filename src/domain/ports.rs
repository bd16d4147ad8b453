use crate::domain::model::{Activation, AppExit, DirectoryStatus, InstallOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::net::IpAddr;

/// Creates and prepares the isolated dependency environment.
#[async_trait]
pub trait EnvironmentProvisioner: Send + Sync {
    async fn ensure_environment(&self) -> Result<DirectoryStatus>;
    fn activation(&self) -> Activation;
    async fn install_dependencies(&self, activation: &Activation) -> InstallOutcome;
}

pub trait LocalAddressResolver: Send + Sync {
    fn local_address(&self) -> Option<IpAddr>;
}

#[async_trait]
pub trait PublicAddressLookup: Send + Sync {
    /// `None` on any failure; callers print a placeholder instead.
    async fn public_address(&self) -> Option<IpAddr>;
}

#[async_trait]
pub trait AppLauncher: Send + Sync {
    async fn launch(&self, activation: &Activation) -> Result<AppExit>;
}

/// Answers whether a Python module can be imported inside the environment.
#[async_trait]
pub trait ModuleProbe: Send + Sync {
    async fn module_available(&self, module: &str) -> bool;
}
