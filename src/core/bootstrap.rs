use crate::core::{
    AppLauncher, BootstrapReport, DirectoryStatus, EnvironmentProvisioner, LocalAddressResolver,
    NetworkAddresses, PublicAddressLookup,
};
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

const RULE: &str = "======================================================================";

#[derive(Debug, Clone)]
pub struct BootstrapSettings {
    pub uploads_dir: PathBuf,
    pub port: u16,
    pub public_lookup: bool,
    pub placeholder: String,
}

/// Runs the launch sequence: environment, dependencies, uploads directory,
/// address discovery, then the application itself.
pub struct Bootstrapper<P, R, Q, L>
where
    P: EnvironmentProvisioner,
    R: LocalAddressResolver,
    Q: PublicAddressLookup,
    L: AppLauncher,
{
    provisioner: P,
    resolver: R,
    lookup: Q,
    launcher: L,
    settings: BootstrapSettings,
}

impl<P, R, Q, L> Bootstrapper<P, R, Q, L>
where
    P: EnvironmentProvisioner,
    R: LocalAddressResolver,
    Q: PublicAddressLookup,
    L: AppLauncher,
{
    pub fn new(provisioner: P, resolver: R, lookup: Q, launcher: L, settings: BootstrapSettings) -> Self {
        Self {
            provisioner,
            resolver,
            lookup,
            launcher,
            settings,
        }
    }

    pub async fn run(&self) -> Result<BootstrapReport> {
        println!("🔧 Checking virtual environment...");
        let environment = self.provisioner.ensure_environment().await?;
        match environment {
            DirectoryStatus::Created => println!("✅ Virtual environment created"),
            DirectoryStatus::AlreadyPresent => println!("✅ Virtual environment found"),
        }

        let activation = self.provisioner.activation();
        tracing::debug!("Activated environment at {}", activation.venv_dir.display());

        println!("📦 Installing dependencies...");
        let install = self.provisioner.install_dependencies(&activation).await;
        if install.is_success() {
            println!("✅ Dependencies installed");
        } else {
            tracing::warn!("Dependency installation did not succeed: {}", install);
            println!("⚠️  Dependency installation reported a problem ({}), continuing", install);
        }

        let uploads = ensure_directory(&self.settings.uploads_dir)?;
        if uploads.was_created() {
            println!("📁 Created uploads directory");
        }

        let addresses = self.discover_addresses().await;
        for line in render_banner(&addresses, &self.settings) {
            println!("{}", line);
        }

        let exit = self.launcher.launch(&activation).await?;
        tracing::info!("Application exited with status {}", exit.exit_code());

        Ok(BootstrapReport {
            environment,
            install,
            uploads,
            addresses,
            port: self.settings.port,
            exit,
        })
    }

    async fn discover_addresses(&self) -> NetworkAddresses {
        let local = self.resolver.local_address();
        tracing::debug!("Local address: {:?}", local);

        let public = if self.settings.public_lookup {
            self.lookup.public_address().await
        } else {
            None
        };
        tracing::debug!("Public address: {:?}", public);

        NetworkAddresses { local, public }
    }
}

/// Create `path` unless it is already a directory.
pub fn ensure_directory(path: &Path) -> Result<DirectoryStatus> {
    if path.is_dir() {
        return Ok(DirectoryStatus::AlreadyPresent);
    }
    std::fs::create_dir_all(path)?;
    tracing::debug!("Created directory {}", path.display());
    Ok(DirectoryStatus::Created)
}

pub fn render_banner(addresses: &NetworkAddresses, settings: &BootstrapSettings) -> Vec<String> {
    let port = settings.port;
    let mut lines = vec![
        String::new(),
        RULE.to_string(),
        "🚀 Starting Research Assistant - Context Chatbot".to_string(),
        RULE.to_string(),
        format!("  Local:    http://localhost:{}", port),
        format!("  Network:  http://{}:{}", addresses.local_host(), port),
    ];

    if settings.public_lookup {
        match addresses.public {
            Some(ip) => {
                lines.push(format!("  Public:   http://{}:{}", ip, port));
                lines.push(format!(
                    "  ⚠️  Make sure port {} is open in your firewall to allow public access",
                    port
                ));
            }
            None => lines.push(format!(
                "  Public:   {}",
                addresses.public_host(&settings.placeholder)
            )),
        }
    }

    lines.push(RULE.to_string());
    lines.push("Press Ctrl+C to stop the server".to_string());
    lines.push(String::new());
    lines
}
