use std::fs::OpenOptions;
use std::path::PathBuf;

use poem_openapi::{payload::Json, ApiResponse, OpenApi};

pub struct HealthApi {
    log_file: PathBuf,
}

impl HealthApi {
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: log_file.into(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, poem_openapi::Object)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: String,
    pub log_file: String,
    pub log_file_writable: bool,
}

#[derive(ApiResponse)]
pub enum HealthResponse {
    #[oai(status = 200)]
    Ok(Json<HealthStatus>),

    #[oai(status = 503)]
    ServiceUnavailable(Json<HealthStatus>),
}

#[OpenApi]
impl HealthApi {
    /// Health check
    ///
    /// Reports `degraded` when this process cannot append to the JSON log file.
    #[oai(path = "/health", method = "get")]
    async fn health(&self) -> HealthResponse {
        let writable = OpenOptions::new().append(true).open(&self.log_file).is_ok();

        let health = HealthStatus {
            status: if writable { "healthy" } else { "degraded" }.to_string(),
            service: "registry-manager".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            log_file: self.log_file.display().to_string(),
            log_file_writable: writable,
        };

        if writable {
            HealthResponse::Ok(Json(health))
        } else {
            tracing::warn!(log_file = %health.log_file, "log file unavailable");
            HealthResponse::ServiceUnavailable(Json(health))
        }
    }
}
