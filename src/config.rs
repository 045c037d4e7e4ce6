use std::path::{Path, PathBuf};

/// Environment variable naming the directory that holds the `logs/` folder.
pub const HOME_ENV: &str = "REGISTRY_MANAGER_HOME";

/// Name the embedded web framework's log entries are tagged with.
pub const FRAMEWORK_NAME: &str = "poem";

pub struct Config {
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
        }
    }
}

/// Where and how the process logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub home: PathBuf,
    pub log_dir: PathBuf,
    pub log_file: PathBuf,
    /// `EnvFilter` directives, e.g. `info` or `registry_manager=debug,poem=warn`
    pub filter: String,
    /// Mirror events to stdout for container logs
    pub stdout: bool,
    pub framework: String,
}

impl LogConfig {
    pub fn from_env() -> Self {
        let home = std::env::var(HOME_ENV)
            .ok()
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_home);

        let mut config = Self::with_home(home);
        if let Ok(filter) = std::env::var("RUST_LOG") {
            if !filter.trim().is_empty() {
                config.filter = filter;
            }
        }
        if let Some(stdout) = std::env::var("LOG_STDOUT").ok().and_then(|v| parse_bool(&v)) {
            config.stdout = stdout;
        }
        config
    }

    pub fn with_home(home: impl AsRef<Path>) -> Self {
        let home = home.as_ref().to_path_buf();
        let log_dir = home.join("logs");
        let log_file = log_dir.join("log.json");
        Self {
            home,
            log_dir,
            log_file,
            filter: "info".to_string(),
            stdout: true,
            framework: FRAMEWORK_NAME.to_string(),
        }
    }
}

/// `<user home>/.registry-manager`, or the working directory when no user
/// home is known.
pub fn default_home() -> PathBuf {
    let var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    match std::env::var(var) {
        Ok(home) if !home.is_empty() => PathBuf::from(home).join(".registry-manager"),
        _ => PathBuf::from("."),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
