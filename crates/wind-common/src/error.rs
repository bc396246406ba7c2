//! Error types for the wind map crates.

use thiserror::Error;

/// Result type alias using WindError.
pub type WindResult<T> = Result<T, WindError>;

/// Primary error type for wind data operations.
#[derive(Debug, Error)]
pub enum WindError {
    // === Request Errors ===
    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Upstream Errors ===
    #[error("Upstream responded with status {status}: {url}")]
    Upstream { status: u16, url: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WindError {
    /// Shorthand for an [`WindError::InvalidParameter`].
    pub fn invalid(param: impl Into<String>, message: impl Into<String>) -> Self {
        WindError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            WindError::InvalidParameter { .. } => 400,
            WindError::Upstream { .. } | WindError::Transport(_) | WindError::Decode(_) => 502,
            WindError::Config(_) | WindError::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for WindError {
    fn from(err: serde_json::Error) -> Self {
        WindError::Decode(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for WindError {
    fn from(err: std::io::Error) -> Self {
        WindError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(WindError::invalid("centerLat", "out of range").http_status_code(), 400);
        assert_eq!(
            WindError::Upstream {
                status: 403,
                url: "https://api.weather.gov/points/1,2".to_string()
            }
            .http_status_code(),
            502
        );
        assert_eq!(WindError::Config("bad".to_string()).http_status_code(), 500);
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = WindError::invalid("maxCells", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid parameter value for 'maxCells': must be at least 1"
        );
    }
}
