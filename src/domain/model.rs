use std::ffi::OsString;
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryStatus {
    Created,
    AlreadyPresent,
}

impl DirectoryStatus {
    pub fn was_created(self) -> bool {
        matches!(self, DirectoryStatus::Created)
    }
}

/// Result of the dependency installation step. Failures are reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Succeeded,
    Failed { code: Option<i32> },
    Unavailable { reason: String },
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InstallOutcome::Succeeded)
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallOutcome::Succeeded => write!(f, "installed"),
            InstallOutcome::Failed { code: Some(code) } => {
                write!(f, "installer exited with status {}", code)
            }
            InstallOutcome::Failed { code: None } => write!(f, "installer was terminated"),
            InstallOutcome::Unavailable { reason } => write!(f, "installer unavailable: {}", reason),
        }
    }
}

/// An activated environment: what child processes need to run inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub venv_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub python: PathBuf,
    pub vars: Vec<(String, OsString)>,
    /// Variables removed from the child's environment.
    pub removed: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkAddresses {
    pub local: Option<IpAddr>,
    pub public: Option<IpAddr>,
}

impl NetworkAddresses {
    /// Host shown for the network URL; `localhost` when nothing was found.
    pub fn local_host(&self) -> String {
        self.local
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "localhost".to_string())
    }

    pub fn public_host(&self, placeholder: &str) -> String {
        self.public
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| placeholder.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppExit {
    pub code: Option<i32>,
    pub interrupted: bool,
}

impl AppExit {
    /// Shell-style exit code: the child's code, or 130 when it died from an interrupt.
    pub fn exit_code(&self) -> i32 {
        match self.code {
            Some(code) => code,
            None if self.interrupted => 130,
            None => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    pub environment: DirectoryStatus,
    pub install: InstallOutcome,
    pub uploads: DirectoryStatus,
    pub addresses: NetworkAddresses,
    pub port: u16,
    pub exit: AppExit,
}
