use crate::adapters::venv::apply_activation;
use crate::core::{Activation, AppExit, AppLauncher};
use crate::utils::error::{LauncherError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::{Child, Command};

/// Runs the application entry point with the environment's interpreter,
/// attached to the launcher's terminal.
#[derive(Debug, Clone)]
pub struct PythonAppLauncher {
    root: PathBuf,
    entry: PathBuf,
    shutdown_grace: Duration,
}

impl PythonAppLauncher {
    pub fn new(root: impl Into<PathBuf>, entry: impl Into<PathBuf>, shutdown_grace: Duration) -> Self {
        Self {
            root: root.into(),
            entry: entry.into(),
            shutdown_grace,
        }
    }

    fn command_line(&self, activation: &Activation) -> String {
        format!("{} {}", activation.python.display(), self.entry.display())
    }

    /// After an interrupt the child got the same signal from the terminal.
    /// Give it the grace period, or a second Ctrl+C, before killing it.
    async fn wait_after_interrupt(&self, child: &mut Child) -> Result<ExitStatus> {
        println!("\n🛑 Stopping application...");

        let waited = tokio::select! {
            waited = tokio::time::timeout(self.shutdown_grace, child.wait()) => waited.ok(),
            _ = tokio::signal::ctrl_c() => None,
        };

        match waited {
            Some(status) => Ok(status?),
            None => {
                tracing::warn!("Application did not stop in time, killing it");
                child.kill().await?;
                Ok(child.wait().await?)
            }
        }
    }
}

#[async_trait]
impl AppLauncher for PythonAppLauncher {
    async fn launch(&self, activation: &Activation) -> Result<AppExit> {
        let command_line = self.command_line(activation);
        tracing::info!("Launching {}", command_line);

        let mut cmd = Command::new(&activation.python);
        cmd.arg(&self.entry)
            .current_dir(&self.root)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        apply_activation(&mut cmd, activation);

        let mut child = cmd.spawn().map_err(|e| LauncherError::LaunchError {
            command: command_line.clone(),
            message: e.to_string(),
        })?;

        let signal = tokio::select! {
            status = child.wait() => {
                let status = status?;
                return Ok(AppExit {
                    code: status.code(),
                    interrupted: false,
                });
            }
            signal = tokio::signal::ctrl_c() => signal,
        };

        let status = match signal {
            Ok(()) => self.wait_after_interrupt(&mut child).await?,
            Err(e) => {
                tracing::warn!("Could not listen for Ctrl+C ({}), waiting for the application", e);
                let status = child.wait().await?;
                return Ok(AppExit {
                    code: status.code(),
                    interrupted: false,
                });
            }
        };

        Ok(AppExit {
            code: status.code(),
            interrupted: true,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use tempfile::TempDir;

    // Launch tests listen for SIGINT, which one of them raises process-wide.
    static LAUNCH_LOCK: tokio::sync::Mutex<()> = tokio::sync::Mutex::const_new(());

    fn shell_activation(dir: &TempDir) -> Activation {
        Activation {
            venv_dir: dir.path().join("venv"),
            bin_dir: dir.path().join("venv/bin"),
            python: PathBuf::from("/bin/sh"),
            vars: vec![("VIRTUAL_ENV".to_string(), OsString::from("/tmp/test-venv"))],
            removed: vec!["PYTHONHOME".to_string()],
        }
    }

    #[tokio::test]
    async fn test_exit_code_is_forwarded() {
        let _lock = LAUNCH_LOCK.lock().await;
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.sh"), "exit 3\n").unwrap();

        let launcher = PythonAppLauncher::new(dir.path(), "app.sh", Duration::from_secs(1));
        let exit = launcher.launch(&shell_activation(&dir)).await.unwrap();

        assert_eq!(exit.code, Some(3));
        assert!(!exit.interrupted);
        assert_eq!(exit.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_child_sees_activation_and_working_directory() {
        let _lock = LAUNCH_LOCK.lock().await;
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("app.sh"),
            "printf '%s' \"$VIRTUAL_ENV\" > seen_env\n",
        )
        .unwrap();

        let launcher = PythonAppLauncher::new(dir.path(), "app.sh", Duration::from_secs(1));
        let exit = launcher.launch(&shell_activation(&dir)).await.unwrap();

        assert_eq!(exit.code, Some(0));
        let seen = std::fs::read_to_string(dir.path().join("seen_env")).unwrap();
        assert_eq!(seen, "/tmp/test-venv");
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_a_launch_error() {
        let _lock = LAUNCH_LOCK.lock().await;
        let dir = TempDir::new().unwrap();
        let mut activation = shell_activation(&dir);
        activation.python = dir.path().join("venv/bin/python");

        let launcher = PythonAppLauncher::new(dir.path(), "app.py", Duration::from_secs(1));
        let result = launcher.launch(&activation).await;

        assert!(matches!(result, Err(LauncherError::LaunchError { .. })));
    }

    /// `target` spelled relative to the working directory.
    fn relative_to_cwd(target: &std::path::Path) -> PathBuf {
        let cwd = std::env::current_dir().unwrap();
        let mut relative = PathBuf::new();
        for _ in cwd.components().skip(1) {
            relative.push("..");
        }
        relative.join(target.strip_prefix("/").unwrap())
    }

    #[tokio::test]
    async fn test_relative_project_root_launches_entry() {
        let _lock = LAUNCH_LOCK.lock().await;
        use crate::config::{LauncherConfig, ProjectPaths};

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.sh"), "exit 4\n").unwrap();
        let mut config = LauncherConfig::default();
        config.app.entry = "app.sh".to_string();

        let paths = ProjectPaths::resolve(relative_to_cwd(dir.path()), &config).unwrap();
        let launcher = PythonAppLauncher::new(&paths.root, &paths.entry, Duration::from_secs(1));
        let exit = launcher.launch(&shell_activation(&dir)).await.unwrap();

        assert_eq!(exit.code, Some(4));
    }

    #[tokio::test]
    async fn test_interrupt_kills_child_after_grace_period() {
        let _lock = LAUNCH_LOCK.lock().await;
        use tokio::signal::unix::{signal, SignalKind};

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.sh"), "trap '' INT\nexec sleep 30\n").unwrap();

        // Keeps SIGINT from terminating the test process.
        let _guard = signal(SignalKind::interrupt()).unwrap();

        let interrupter = tokio::spawn(async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            std::process::Command::new("kill")
                .arg("-INT")
                .arg(std::process::id().to_string())
                .status()
                .unwrap();
        });

        let launcher = PythonAppLauncher::new(dir.path(), "app.sh", Duration::from_millis(200));
        let started = std::time::Instant::now();
        let exit = launcher.launch(&shell_activation(&dir)).await.unwrap();
        interrupter.await.unwrap();

        assert!(exit.interrupted);
        assert_eq!(exit.code, None);
        assert_eq!(exit.exit_code(), 130);
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}
