use thiserror::Error;

/// Main error type for svclogs
#[derive(Debug, Error)]
pub enum SvcLogsError {
    // Flag validation errors
    #[error("{0}")]
    Validation(String),

    #[error("invalid argument {value} for \"{flag}\" flag: reading time value {value}: {source}")]
    InvalidTimeFormat {
        flag: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("invalid duration {0:?}")]
    InvalidDuration(String),

    // Selection errors
    #[error("select application: {0}")]
    SelectApplication(#[source] Box<SvcLogsError>),

    #[error("select deployed services for application {app}: {source}")]
    SelectDeployedService {
        app: String,
        #[source]
        source: Box<SvcLogsError>,
    },

    #[error("no deployed services found for application {0}")]
    NoDeployedServices(String),

    #[error("{0}")]
    AmbiguousSelection(String),

    // Configuration store errors
    #[error("couldn't find an application named {0} in the workspace")]
    ApplicationNotFound(String),

    #[error("no applications found in the workspace")]
    NoApplications,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    #[error("Missing required configuration field: {0}")]
    MissingConfigField(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    // Log retrieval errors, shown to the user as-is
    #[error("{0}")]
    Retrieval(String),

    #[error("Failed to open log file: {0}")]
    LogFileError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("{0}")]
    Other(String),
}

impl SvcLogsError {
    /// Build a validation error carrying the exact user-facing message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Result type alias for svclogs operations
pub type Result<T> = std::result::Result<T, SvcLogsError>;
