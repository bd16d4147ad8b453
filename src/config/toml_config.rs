use crate::utils::error::{LauncherError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File picked up from the project directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "launcher.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub environment: EnvironmentConfig,
    pub app: AppConfig,
    pub network: NetworkConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Virtual environment directory, relative to the project root.
    pub dir: String,
    /// Interpreter used to create the environment.
    pub python: String,
    pub manifest: String,
    pub quiet_install: bool,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            dir: "venv".to_string(),
            python: if cfg!(windows) { "python" } else { "python3" }.to_string(),
            manifest: "requirements.txt".to_string(),
            quiet_install: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub entry: String,
    pub uploads_dir: String,
    pub port: u16,
    pub shutdown_grace_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            entry: "app.py".to_string(),
            uploads_dir: "uploads".to_string(),
            port: 5000,
            shutdown_grace_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Interfaces tried first, in order, when picking the local address.
    pub preferred_interfaces: Vec<String>,
    pub public_ip_lookup: bool,
    pub public_ip_service: String,
    pub lookup_timeout_seconds: u64,
    /// Remote address used to ask the OS which local address routes outbound.
    pub route_probe_target: String,
    /// Printed when the public address could not be determined.
    pub placeholder: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            preferred_interfaces: ["en0", "en1", "eth0", "wlan0"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            public_ip_lookup: true,
            public_ip_service: "https://api.ipify.org".to_string(),
            lookup_timeout_seconds: 5,
            route_probe_target: "8.8.8.8:80".to_string(),
            placeholder: "unavailable".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub api_url: String,
    pub name: String,
    pub timeout_seconds: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_url: "http://154.54.100.200:8090/v1/chat/completions".to_string(),
            name: "RedHatAI/Llama-4-Scout-17B-16E-Instruct-FP8-dynamic".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl LauncherConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(LauncherError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| LauncherError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Resolve the configuration for a project directory.
    ///
    /// An explicit path must exist. Without one, `launcher.toml` in `root` is
    /// used when present and the built-in defaults otherwise.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path.display());
                Self::from_file(path)
            }
            None => {
                let candidate = root.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    tracing::debug!("Loading configuration from {}", candidate.display());
                    Self::from_file(candidate)
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Replace `${VAR}` with the value of the environment variable. Unset
    /// variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| LauncherError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("environment.dir", &self.environment.dir)?;
        validation::validate_path("environment.manifest", &self.environment.manifest)?;
        validation::validate_non_empty_string("environment.python", &self.environment.python)?;
        validation::validate_path("app.entry", &self.app.entry)?;
        validation::validate_path("app.uploads_dir", &self.app.uploads_dir)?;
        validation::validate_port("app.port", self.app.port)?;

        if self.network.public_ip_lookup {
            validation::validate_url("network.public_ip_service", &self.network.public_ip_service)?;
            validation::validate_timeout("network.lookup_timeout_seconds", self.lookup_timeout())?;
        }
        validation::validate_non_empty_string(
            "network.route_probe_target",
            &self.network.route_probe_target,
        )?;

        Ok(())
    }

    /// Checks the `[model]` section. Only the connection test talks to the model.
    pub fn validate_model(&self) -> Result<()> {
        validation::validate_url("model.api_url", &self.model.api_url)?;
        validation::validate_timeout("model.timeout_seconds", self.model_timeout())?;
        Ok(())
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.network.lookup_timeout_seconds)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.app.shutdown_grace_seconds)
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model.timeout_seconds)
    }
}

impl Validate for LauncherConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

/// Absolute locations of everything the launcher touches inside a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub venv_dir: PathBuf,
    pub manifest: PathBuf,
    pub uploads_dir: PathBuf,
    pub entry: PathBuf,
    pub env_file: PathBuf,
}

impl ProjectPaths {
    pub fn new(root: impl Into<PathBuf>, config: &LauncherConfig) -> Self {
        let root = root.into();
        Self {
            venv_dir: root.join(&config.environment.dir),
            manifest: root.join(&config.environment.manifest),
            uploads_dir: root.join(&config.app.uploads_dir),
            entry: root.join(&config.app.entry),
            env_file: root.join(".env"),
            root,
        }
    }

    /// Like [`ProjectPaths::new`], with a relative `root` made absolute against the
    /// working directory. Child processes run inside `root`, so a relative root
    /// would be applied twice.
    pub fn resolve(root: impl AsRef<Path>, config: &LauncherConfig) -> Result<Self> {
        let root = std::path::absolute(root.as_ref())?;
        Ok(Self::new(root, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = LauncherConfig::from_toml_str("").unwrap();

        assert_eq!(config.environment.dir, "venv");
        assert_eq!(config.environment.manifest, "requirements.txt");
        assert_eq!(config.app.uploads_dir, "uploads");
        assert_eq!(config.app.port, 5000);
        assert!(config.network.public_ip_lookup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let toml_content = r#"
[app]
port = 8080

[network]
public_ip_lookup = false
preferred_interfaces = ["eth1"]
"#;

        let config = LauncherConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.app.port, 8080);
        assert_eq!(config.app.entry, "app.py");
        assert!(!config.network.public_ip_lookup);
        assert_eq!(config.network.preferred_interfaces, vec!["eth1".to_string()]);
        assert_eq!(config.network.placeholder, "unavailable");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LAUNCHER_TEST_MODEL_URL", "http://model.internal:8090/v1/chat/completions");

        let toml_content = r#"
[model]
api_url = "${LAUNCHER_TEST_MODEL_URL}"
"#;

        let config = LauncherConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.model.api_url, "http://model.internal:8090/v1/chat/completions");

        std::env::remove_var("LAUNCHER_TEST_MODEL_URL");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[network]
public_ip_service = "not-a-url"
"#;
        let config = LauncherConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[app]
port = 0
"#;
        let config = LauncherConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_disabled_lookup_skips_service_validation() {
        let toml_content = r#"
[network]
public_ip_lookup = false
public_ip_service = ""
"#;
        let config = LauncherConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let result = LauncherConfig::from_toml_str("[app\nport = 1");
        assert!(matches!(
            result,
            Err(LauncherError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[environment]\ndir = \".venv\"\n")
            .unwrap();

        let config = LauncherConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.environment.dir, ".venv");
    }

    #[test]
    fn test_load_prefers_project_file_then_defaults() {
        let dir = TempDir::new().unwrap();
        let config = LauncherConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.app.port, 5000);

        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[app]\nport = 7000\n").unwrap();
        let config = LauncherConfig::load(dir.path(), None).unwrap();
        assert_eq!(config.app.port, 7000);

        let missing = dir.path().join("nope.toml");
        assert!(LauncherConfig::load(dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_unresolved_model_url_only_fails_model_validation() {
        let toml_content = r#"
[model]
api_url = "${LAUNCHER_TEST_UNSET_MODEL_URL}"
"#;
        let config = LauncherConfig::from_toml_str(toml_content).unwrap();

        assert!(config.validate().is_ok());
        assert!(config.validate_model().is_err());
    }

    #[test]
    fn test_resolve_makes_relative_root_absolute() {
        let config = LauncherConfig::default();
        let paths = ProjectPaths::resolve("proj", &config).unwrap();
        let cwd = std::env::current_dir().unwrap();

        assert!(paths.root.is_absolute());
        assert_eq!(paths.root, cwd.join("proj"));
        assert_eq!(paths.entry, cwd.join("proj").join("app.py"));
        assert_eq!(paths.venv_dir, cwd.join("proj").join("venv"));
    }

    #[test]
    fn test_project_paths_are_rooted() {
        let config = LauncherConfig::default();
        let paths = ProjectPaths::new("/srv/chatbot", &config);

        assert_eq!(paths.venv_dir, PathBuf::from("/srv/chatbot/venv"));
        assert_eq!(paths.manifest, PathBuf::from("/srv/chatbot/requirements.txt"));
        assert_eq!(paths.uploads_dir, PathBuf::from("/srv/chatbot/uploads"));
        assert_eq!(paths.entry, PathBuf::from("/srv/chatbot/app.py"));
        assert_eq!(paths.env_file, PathBuf::from("/srv/chatbot/.env"));
    }
}
