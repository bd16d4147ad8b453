use crate::config::toml_config::EnvironmentConfig;
use crate::config::ProjectPaths;
use crate::core::{Activation, DirectoryStatus, EnvironmentProvisioner, InstallOutcome, ModuleProbe};
use crate::utils::error::{LauncherError, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// A `python -m venv` environment inside the project directory.
#[derive(Debug, Clone)]
pub struct PythonVenv {
    root: PathBuf,
    venv_dir: PathBuf,
    manifest: PathBuf,
    base_python: String,
    quiet: bool,
}

impl PythonVenv {
    pub fn new(paths: &ProjectPaths, config: &EnvironmentConfig) -> Self {
        Self {
            root: paths.root.clone(),
            venv_dir: paths.venv_dir.clone(),
            manifest: paths.manifest.clone(),
            base_python: config.python.clone(),
            quiet: config.quiet_install,
        }
    }

    /// Interpreter for module probes: the environment's when it exists,
    /// otherwise the one used to create it.
    fn probe_interpreter(&self) -> PathBuf {
        let venv_python = venv_python(&self.venv_dir);
        if venv_python.is_file() {
            venv_python
        } else {
            PathBuf::from(&self.base_python)
        }
    }

    fn install_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-m".into(), "pip".into(), "install".into()];
        if self.quiet {
            args.push("-q".into());
        }
        args.push("-r".into());
        args.push(self.manifest.clone().into_os_string());
        args
    }
}

#[async_trait]
impl EnvironmentProvisioner for PythonVenv {
    async fn ensure_environment(&self) -> Result<DirectoryStatus> {
        if self.venv_dir.is_dir() {
            tracing::debug!("Virtual environment present at {}", self.venv_dir.display());
            return Ok(DirectoryStatus::AlreadyPresent);
        }

        tracing::info!("Creating virtual environment at {}", self.venv_dir.display());
        let status = Command::new(&self.base_python)
            .arg("-m")
            .arg("venv")
            .arg(&self.venv_dir)
            .current_dir(&self.root)
            .status()
            .await
            .map_err(|e| LauncherError::EnvironmentError {
                message: format!("could not run '{}': {}", self.base_python, e),
            })?;

        if !status.success() {
            return Err(LauncherError::EnvironmentError {
                message: format!("'{} -m venv' exited with {}", self.base_python, status),
            });
        }

        Ok(DirectoryStatus::Created)
    }

    fn activation(&self) -> Activation {
        activation_for(&self.venv_dir, std::env::var_os("PATH"))
    }

    async fn install_dependencies(&self, activation: &Activation) -> InstallOutcome {
        if !self.manifest.is_file() {
            return InstallOutcome::Unavailable {
                reason: format!("{} not found", self.manifest.display()),
            };
        }

        let mut cmd = Command::new(&activation.python);
        cmd.args(self.install_args()).current_dir(&self.root);
        apply_activation(&mut cmd, activation);
        if self.quiet {
            cmd.stdout(Stdio::null());
        }

        tracing::debug!("Running {:?}", cmd);
        match cmd.status().await {
            Ok(status) if status.success() => InstallOutcome::Succeeded,
            Ok(status) => InstallOutcome::Failed {
                code: status.code(),
            },
            Err(e) => InstallOutcome::Unavailable {
                reason: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl ModuleProbe for PythonVenv {
    async fn module_available(&self, module: &str) -> bool {
        let python = self.probe_interpreter();
        let result = Command::new(&python)
            .arg("-c")
            .arg(format!("import {}", module))
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match result {
            Ok(status) => status.success(),
            Err(e) => {
                tracing::debug!("Could not run {}: {}", python.display(), e);
                false
            }
        }
    }
}

pub fn venv_bin_dir(venv_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_dir.join("Scripts")
    } else {
        venv_dir.join("bin")
    }
}

pub fn venv_python(venv_dir: &Path) -> PathBuf {
    if cfg!(windows) {
        venv_bin_dir(venv_dir).join("python.exe")
    } else {
        venv_bin_dir(venv_dir).join("python")
    }
}

/// Environment changes equivalent to sourcing the venv's `activate` script.
pub fn activation_for(venv_dir: &Path, current_path: Option<OsString>) -> Activation {
    let bin_dir = venv_bin_dir(venv_dir);

    let mut entries = vec![bin_dir.clone()];
    if let Some(path) = current_path.as_ref() {
        entries.extend(std::env::split_paths(path));
    }
    let path = std::env::join_paths(entries).unwrap_or_else(|e| {
        tracing::warn!("Could not extend PATH ({}), using the environment's bin only", e);
        bin_dir.clone().into_os_string()
    });

    Activation {
        venv_dir: venv_dir.to_path_buf(),
        python: venv_python(venv_dir),
        vars: vec![
            ("VIRTUAL_ENV".to_string(), venv_dir.as_os_str().to_owned()),
            ("PATH".to_string(), path),
        ],
        removed: vec!["PYTHONHOME".to_string()],
        bin_dir,
    }
}

pub fn apply_activation(cmd: &mut Command, activation: &Activation) {
    for key in &activation.removed {
        cmd.env_remove(key);
    }
    for (key, value) in &activation.vars {
        cmd.env(key, value);
    }
}
