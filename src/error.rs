use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Cache error: {0}")]
    Cache(#[from] sqlx::Error),

    #[error("Cache migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Not found")]
    NotFound,

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("Operation already in progress")]
    InProgress,
}

/// Coarse classification used by views to pick a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    NetworkFailure,
    MalformedResponse,
    Cancelled,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound => ErrorKind::NotFound,
            AppError::Network(_) => ErrorKind::NetworkFailure,
            AppError::Api { status, .. } if *status == 404 => ErrorKind::NotFound,
            AppError::Api { .. } => ErrorKind::NetworkFailure,
            AppError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            AppError::Cancelled => ErrorKind::Cancelled,
            AppError::Cache(_)
            | AppError::Migration(_)
            | AppError::Config(_)
            | AppError::InProgress => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Message shown inline by the view that owns the failed operation.
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound => "Not found".to_string(),
            AppError::Network(e) => {
                error!("network error: {}", e);
                "Could not reach the server. Please try again.".to_string()
            }
            AppError::Api { message, .. } if !message.is_empty() => message.clone(),
            AppError::Api { status, .. } => format!("Server returned an error ({})", status),
            AppError::MalformedResponse(detail) => {
                error!("malformed response: {}", detail);
                "Invalid data format from server".to_string()
            }
            AppError::Cancelled => "Cancelled".to_string(),
            AppError::Cache(e) => {
                error!("cache error: {}", e);
                "Local storage error occurred".to_string()
            }
            AppError::Migration(e) => {
                error!("cache migration error: {}", e);
                "Local storage error occurred".to_string()
            }
            AppError::Config(msg) => msg.clone(),
            AppError::InProgress => "Saving, please wait".to_string(),
        }
    }
}
