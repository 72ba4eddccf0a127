use crate::error::{Result, SvcLogsError};
use crate::logs::{DEFAULT_LIMIT, DEFAULT_POLL_INTERVAL, MAX_LIMIT, MIN_LIMIT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up when neither `--config` nor `SVCLOGS_CONFIG` is set
pub const DEFAULT_CONFIG_PATH: &str = "svclogs.toml";

/// Read access to the applications known to the workspace
pub trait Store {
    /// Look up an application by name
    fn get_application(&self, name: &str) -> Result<Application>;

    /// All applications, in declaration order
    fn list_applications(&self) -> Result<Vec<Application>>;
}

/// An application and the places its services are deployed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,

    #[serde(default)]
    pub deployments: Vec<Deployment>,
}

/// One service deployed to one environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub environment: String,
    pub service: String,
}

/// Workspace configuration with the local log store and known applications
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Root directory of the local log store
    pub log_dir: PathBuf,

    /// Delay between polls in follow mode (in milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Number of events to fetch when `--limit` is not given
    #[serde(default = "default_limit")]
    pub default_limit: i64,

    #[serde(default)]
    pub applications: Vec<Application>,
}

// Default value functions for serde
fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL.as_millis() as u64
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl WorkspaceConfig {
    /// Load the workspace configuration from a file (supports TOML and JSON)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SvcLogsError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let mut config = match extension {
            "toml" => Self::parse_toml(&contents)?,
            "json" => Self::parse_json(&contents)?,
            _ => {
                return Err(SvcLogsError::InvalidConfig(format!(
                    "Unsupported file format: {}. Use .toml or .json",
                    extension
                )))
            }
        };

        config.expand_env_vars();
        config.validate()?;

        tracing::debug!(
            path = %path.display(),
            applications = config.applications.len(),
            "loaded workspace config"
        );

        Ok(config)
    }

    fn parse_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| SvcLogsError::InvalidConfig(format!("Failed to parse TOML: {}", e)))
    }

    fn parse_json(contents: &str) -> Result<Self> {
        serde_json::from_str(contents)
            .map_err(|e| SvcLogsError::InvalidConfig(format!("Failed to parse JSON: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.log_dir.as_os_str().is_empty() {
            return Err(SvcLogsError::MissingConfigField("log_dir".to_string()));
        }

        if self.poll_interval_ms == 0 {
            return Err(SvcLogsError::ConfigValidationError(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }

        if !(MIN_LIMIT..=MAX_LIMIT).contains(&self.default_limit) {
            return Err(SvcLogsError::ConfigValidationError(format!(
                "default_limit must be between {} and {}",
                MIN_LIMIT, MAX_LIMIT
            )));
        }

        for (i, app) in self.applications.iter().enumerate() {
            if app.name.is_empty() {
                return Err(SvcLogsError::MissingConfigField(format!(
                    "applications[{}].name",
                    i
                )));
            }
            if self.applications[..i].iter().any(|a| a.name == app.name) {
                return Err(SvcLogsError::ConfigValidationError(format!(
                    "duplicate application: {}",
                    app.name
                )));
            }
            for deployment in &app.deployments {
                if deployment.environment.is_empty() || deployment.service.is_empty() {
                    return Err(SvcLogsError::ConfigValidationError(format!(
                        "deployment of application {} needs both environment and service",
                        app.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Expand `$VAR` and `${VAR}` in the log directory
    fn expand_env_vars(&mut self) {
        let path_str = self.log_dir.to_string_lossy().into_owned();
        self.log_dir = PathBuf::from(Self::expand_env_in_string(&path_str));
    }

    fn expand_env_in_string(s: &str) -> String {
        let mut result = s.to_string();

        // Longest names first so $HOME_DIR is not clobbered by $HOME
        let mut vars: Vec<(String, String)> = std::env::vars().collect();
        vars.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        for (key, value) in vars {
            result = result.replace(&format!("${{{}}}", key), &value);
            result = result.replace(&format!("${}", key), &value);
        }

        result
    }

    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Store for WorkspaceConfig {
    fn get_application(&self, name: &str) -> Result<Application> {
        self.applications
            .iter()
            .find(|app| app.name == name)
            .cloned()
            .ok_or_else(|| SvcLogsError::ApplicationNotFound(name.to_string()))
    }

    fn list_applications(&self) -> Result<Vec<Application>> {
        Ok(self.applications.clone())
    }
}
