use std::path::PathBuf;

use poem_openapi::{param::Query, payload::Json, ApiResponse, OpenApi};

use crate::error::AppError;
use crate::logging::reader::read_recent;

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 500;

pub struct LogsApi {
    log_file: PathBuf,
}

impl LogsApi {
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: log_file.into(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, poem_openapi::Object)]
pub struct LogsPage {
    pub count: u32,
    pub entries: Vec<serde_json::Value>,
}

#[derive(ApiResponse)]
pub enum GetLogsResponse {
    #[oai(status = 200)]
    Ok(Json<LogsPage>),
}

#[OpenApi]
impl LogsApi {
    /// Most recent JSON log entries, oldest first
    #[oai(path = "/logs", method = "get")]
    async fn recent(&self, limit: Query<Option<u32>>) -> Result<GetLogsResponse, poem::Error> {
        let limit = match limit.0 {
            None => DEFAULT_LIMIT,
            Some(0) => return Err(AppError::BadRequest("limit must be positive".into()).into()),
            Some(n) => n.min(MAX_LIMIT),
        };

        let entries = read_recent(&self.log_file, limit as usize).map_err(AppError::from)?;
        Ok(GetLogsResponse::Ok(Json(LogsPage {
            count: entries.len() as u32,
            entries,
        })))
    }
}
