use serde::{Deserialize, Serialize};

/// Body of every API error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub term: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
    pub version: &'static str,
    pub uptime_seconds: u64,
}
