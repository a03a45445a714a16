use std::fmt;

use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorCode {
    Transport,
    Timeout,
    HttpStatus,
    InvalidResponse,
}

impl FetchErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            FetchErrorCode::Transport => "TRANSPORT",
            FetchErrorCode::Timeout => "TIMEOUT",
            FetchErrorCode::HttpStatus => "HTTP_STATUS",
            FetchErrorCode::InvalidResponse => "INVALID_RESPONSE",
        }
    }
}

impl fmt::Display for FetchErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of the monthly productivity summary fetch.
///
/// The orchestrator never propagates this; it maps it to zeroed
/// productivity figures and records a warning on the artifact.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FetchError {
    #[error("productivity service unreachable: {message}")]
    Transport { message: String },

    #[error("productivity request timed out")]
    Timeout,

    #[error("productivity service returned status {status}")]
    HttpStatus { status: u16 },

    #[error("invalid productivity response: {message}")]
    InvalidResponse { message: String },
}

impl FetchError {
    pub fn code(&self) -> FetchErrorCode {
        match self {
            FetchError::Transport { .. } => FetchErrorCode::Transport,
            FetchError::Timeout => FetchErrorCode::Timeout,
            FetchError::HttpStatus { .. } => FetchErrorCode::HttpStatus,
            FetchError::InvalidResponse { .. } => FetchErrorCode::InvalidResponse,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "report::fetch", code = %FetchErrorCode::Transport, %message);
        FetchError::Transport { message }
    }

    pub fn timeout() -> Self {
        warn!(target: "report::fetch", code = %FetchErrorCode::Timeout, "request timed out");
        FetchError::Timeout
    }

    pub fn http_status(status: u16) -> Self {
        warn!(target: "report::fetch", code = %FetchErrorCode::HttpStatus, status);
        FetchError::HttpStatus { status }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "report::fetch", code = %FetchErrorCode::InvalidResponse, %message);
        FetchError::InvalidResponse { message }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("asset unavailable: {path} - {reason}")]
    Asset { path: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "report::validation", %message, "validation error");
        AppError::Validation {
            message,
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "report::validation", %message, details = %details, "validation error with details");
        AppError::Validation {
            message,
            details: Some(details),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "report::settings", %message, "configuration error");
        AppError::Config(message)
    }

    pub fn asset(path: impl Into<String>, reason: impl Into<String>) -> Self {
        let path = path.into();
        let reason = reason.into();
        warn!(target: "report::assets", %path, %reason, "asset load failed");
        AppError::Asset { path, reason }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "report::other", %message, "other error");
        AppError::Other(message)
    }

    pub fn validation_details(&self) -> Option<&JsonValue> {
        match self {
            AppError::Validation { details, .. } => details.as_ref(),
            _ => None,
        }
    }
}
