use std::path::PathBuf;

use poem::http::StatusCode;
use poem::Error as PoemError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("failed to create log directory {}: {}", .path.display(), .source)]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create log file {}: {}", .path.display(), .source)]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read log file {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("failed to install global subscriber: {0}")]
    Subscriber(String),

    #[error("failed to install log bridge: {0}")]
    Bridge(#[from] log::SetLoggerError),

    #[error("failed to format log entry: {0}")]
    Format(#[from] serde_json::Error),

    #[error("failed to write log entry: {0}")]
    Write(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LoggingError> for AppError {
    fn from(err: LoggingError) -> Self {
        AppError::Internal(err.into())
    }
}

impl From<AppError> for PoemError {
    fn from(err: AppError) -> Self {
        PoemError::from_string(err.to_string(), err.status_code())
    }
}
