pub mod bootstrap;

pub use crate::domain::model::{
    Activation, AppExit, BootstrapReport, DirectoryStatus, InstallOutcome, NetworkAddresses,
};
pub use crate::domain::ports::{
    AppLauncher, EnvironmentProvisioner, LocalAddressResolver, ModuleProbe, PublicAddressLookup,
};
pub use crate::utils::error::Result;
