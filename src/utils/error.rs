use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlightDelayError {
    #[error("Service request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Malformed service response: {message}")]
    MalformedResponse { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Validation,
    Configuration,
}

impl FlightDelayError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Malformed payloads are grouped with network failures: either way the
    /// service gave us nothing usable.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NetworkError(_) | Self::MalformedResponse { .. } => ErrorCategory::Network,
            Self::ValidationError { .. } => ErrorCategory::Validation,
            Self::IoError(_)
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn is_network_failure(&self) -> bool {
        self.category() == ErrorCategory::Network
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NetworkError(_) | Self::MalformedResponse { .. } => {
                "Could not get a delay estimate from the service".to_string()
            }
            Self::ValidationError { field, message } => {
                format!("Please check the '{}' field: {}", field, message)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting '{}': {}", field, reason)
            }
            Self::ConfigError { message } => message.clone(),
            Self::IoError(e) => format!("File access failed: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check that the airport service is running and reachable at the configured URL"
            }
            ErrorCategory::Validation => {
                "Select a departure airport, an arrival airport and a travel month or date"
            }
            ErrorCategory::Configuration => "Review the command-line flags or the TOML config file",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Network => 2,
            ErrorCategory::Validation | ErrorCategory::Configuration => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, FlightDelayError>;
