use thiserror::Error;

#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Could not read env file '{path}': {message}")]
    EnvFileError { path: String, message: String },

    #[error("Environment setup failed: {message}")]
    EnvironmentError { message: String },

    #[error("Failed to launch '{command}': {message}")]
    LaunchError { command: String, message: String },

    #[error("Unexpected response from {service}: {message}")]
    UnexpectedResponse { service: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Environment,
    Network,
    Process,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LauncherError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LauncherError::HttpError(_) | LauncherError::UnexpectedResponse { .. } => {
                ErrorCategory::Network
            }
            LauncherError::IoError(_) => ErrorCategory::System,
            LauncherError::ConfigValidationError { .. }
            | LauncherError::InvalidConfigValueError { .. }
            | LauncherError::MissingConfigError { .. }
            | LauncherError::EnvFileError { .. } => ErrorCategory::Configuration,
            LauncherError::EnvironmentError { .. } => ErrorCategory::Environment,
            LauncherError::LaunchError { .. } => ErrorCategory::Process,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration
            | ErrorCategory::Environment
            | ErrorCategory::Process => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            LauncherError::HttpError(_) => {
                "Check your network connection and that the remote service is reachable"
            }
            LauncherError::IoError(_) => {
                "Check that the project directory exists and is writable"
            }
            LauncherError::UnexpectedResponse { .. } => {
                "The remote service returned an unexpected payload; try again later"
            }
            LauncherError::ConfigValidationError { .. }
            | LauncherError::InvalidConfigValueError { .. } => {
                "Fix the reported value in launcher.toml or on the command line"
            }
            LauncherError::MissingConfigError { .. } => {
                "Add the missing setting to launcher.toml or .env"
            }
            LauncherError::EnvFileError { .. } => {
                "Make sure .env uses KEY=value lines; start from .env.example if unsure"
            }
            LauncherError::EnvironmentError { .. } => {
                "Make sure Python 3 with the venv module is installed and on your PATH"
            }
            LauncherError::LaunchError { .. } => {
                "Make sure app.py exists and the virtual environment is intact (delete venv/ to rebuild it)"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            LauncherError::HttpError(e) if e.is_timeout() => {
                "The remote service did not answer in time".to_string()
            }
            LauncherError::HttpError(e) if e.is_connect() => {
                "Could not connect to the remote service".to_string()
            }
            LauncherError::IoError(e) => format!("File system error: {}", e),
            LauncherError::EnvironmentError { message } => {
                format!("Could not prepare the virtual environment: {}", message)
            }
            LauncherError::LaunchError { command, .. } => {
                format!("Could not start the application ({})", command)
            }
            other => other.to_string(),
        }
    }

    /// Process exit code for a failed run.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, LauncherError>;
