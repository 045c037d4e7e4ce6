use std::fs::{self, File, OpenOptions};

use crate::config::LogConfig;
use crate::error::LoggingError;

/// Create the log directory and an empty log file if either is missing.
/// An existing file is left untouched.
pub fn ensure_log_file(config: &LogConfig) -> Result<(), LoggingError> {
    if !config.log_dir.exists() {
        create_dir(config)?;
    }

    if !config.log_file.exists() {
        File::create(&config.log_file).map_err(|source| LoggingError::CreateFile {
            path: config.log_file.clone(),
            source,
        })?;
    }

    Ok(())
}

/// Open the log file for appending.
pub fn open_log_file(config: &LogConfig) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .map_err(|source| LoggingError::CreateFile {
            path: config.log_file.clone(),
            source,
        })
}

#[cfg(unix)]
fn create_dir(config: &LogConfig) -> Result<(), LoggingError> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(0o755)
        .create(&config.log_dir)
        .map_err(|source| LoggingError::CreateDir {
            path: config.log_dir.clone(),
            source,
        })
}

#[cfg(not(unix))]
fn create_dir(config: &LogConfig) -> Result<(), LoggingError> {
    fs::create_dir_all(&config.log_dir).map_err(|source| LoggingError::CreateDir {
        path: config.log_dir.clone(),
        source,
    })
}
