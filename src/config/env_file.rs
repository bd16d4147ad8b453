use crate::utils::error::{LauncherError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const FLASK_PORT: &str = "FLASK_PORT";
pub const FLASK_DEBUG: &str = "FLASK_DEBUG";
pub const SECRET_KEY: &str = "SECRET_KEY";
pub const MODEL_API_URL: &str = "MODEL_API_URL";
pub const MODEL_NAME: &str = "MODEL_NAME";

/// The application's `.env` file.
///
/// Values are parsed with `dotenvy` without touching the process environment.
/// The raw lines are kept so that [`EnvFile::set`] can rewrite a single entry
/// and leave comments and ordering alone.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    values: BTreeMap<String, String>,
    lines: Vec<String>,
}

impl EnvFile {
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        Self::parse(path).map(Some)
    }

    pub fn parse(path: &Path) -> Result<Self> {
        let env_error = |message: String| LauncherError::EnvFileError {
            path: path.display().to_string(),
            message,
        };

        let iter = dotenvy::from_path_iter(path).map_err(|e| env_error(e.to_string()))?;
        let mut values = BTreeMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| env_error(e.to_string()))?;
            values.insert(key, value);
        }

        let content = std::fs::read_to_string(path)?;
        let lines = content.lines().map(str::to_string).collect();

        Ok(Self {
            path: path.to_path_buf(),
            values,
            lines,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Like [`EnvFile::get`], treating blank values as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn flask_port(&self) -> Result<Option<u16>> {
        match self.get_non_empty(FLASK_PORT) {
            None => Ok(None),
            Some(raw) => raw.parse::<u16>().map(Some).map_err(|e| {
                LauncherError::InvalidConfigValueError {
                    field: FLASK_PORT.to_string(),
                    value: raw.to_string(),
                    reason: e.to_string(),
                }
            }),
        }
    }

    /// The application runs in debug mode unless `FLASK_DEBUG` says `false`.
    pub fn debug_enabled(&self) -> bool {
        self.get(FLASK_DEBUG)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(true)
    }

    pub fn secret_key(&self) -> Option<&str> {
        self.get_non_empty(SECRET_KEY)
    }

    pub fn model_api_url(&self) -> Option<&str> {
        self.get_non_empty(MODEL_API_URL)
    }

    pub fn model_name(&self) -> Option<&str> {
        self.get_non_empty(MODEL_NAME)
    }

    /// Set `key` to `value`, rewriting its existing line or appending one.
    pub fn set(&mut self, key: &str, value: &str) {
        let replacement = format!("{}={}", key, value);
        match self.lines.iter().position(|line| line_defines(line, key)) {
            Some(index) => self.lines[index] = replacement,
            None => self.lines.push(replacement),
        }
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn save(&self) -> Result<()> {
        let mut content = self.lines.join("\n");
        content.push('\n');
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

fn line_defines(line: &str, key: &str) -> bool {
    let trimmed = line.trim_start();
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    trimmed
        .strip_prefix(key)
        .map(|rest| rest.trim_start().starts_with('='))
        .unwrap_or(false)
}
