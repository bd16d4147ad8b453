use crate::adapters::{HttpPublicIpLookup, InterfaceResolver, PythonAppLauncher, PythonVenv};
use crate::config::{EnvFile, LauncherConfig, ProjectPaths};
use crate::core::bootstrap::{BootstrapSettings, Bootstrapper};
use crate::utils::error::Result;
use std::path::Path;

pub type ProjectBootstrapper =
    Bootstrapper<PythonVenv, InterfaceResolver, HttpPublicIpLookup, PythonAppLauncher>;

/// Port the application will listen on: `FLASK_PORT` from `.env` when set,
/// the configured port otherwise.
pub fn resolve_port(config: &LauncherConfig, env: Option<&EnvFile>) -> Result<u16> {
    match env {
        Some(env) => Ok(env.flask_port()?.unwrap_or(config.app.port)),
        None => Ok(config.app.port),
    }
}

/// Port shown in the launch banner. A `.env` the launcher cannot read never
/// stops the launch: the application has its own loader.
pub fn launch_port(config: &LauncherConfig, env_file: &Path) -> u16 {
    let resolved = EnvFile::load(env_file).and_then(|env| resolve_port(config, env.as_ref()));
    match resolved {
        Ok(port) => port,
        Err(e) => {
            tracing::warn!(
                "Could not read port from {} ({}), using {}",
                env_file.display(),
                e,
                config.app.port
            );
            config.app.port
        }
    }
}

/// Wire the real adapters for a project directory.
pub fn project_bootstrapper(config: &LauncherConfig, paths: &ProjectPaths) -> Result<ProjectBootstrapper> {
    let port = launch_port(config, &paths.env_file);

    let settings = BootstrapSettings {
        uploads_dir: paths.uploads_dir.clone(),
        port,
        public_lookup: config.network.public_ip_lookup,
        placeholder: config.network.placeholder.clone(),
    };

    Ok(Bootstrapper::new(
        PythonVenv::new(paths, &config.environment),
        InterfaceResolver::from_config(&config.network),
        HttpPublicIpLookup::from_config(&config.network)?,
        PythonAppLauncher::new(&paths.root, &paths.entry, config.shutdown_grace()),
        settings,
    ))
}
