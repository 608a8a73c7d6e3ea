use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponseDto {
    pub status: String,
    pub timestamp: String,
}

impl HealthResponseDto {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
