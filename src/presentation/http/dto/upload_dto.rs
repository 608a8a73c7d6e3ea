use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UploadRequestDto {
    pub operation: Option<String>,
    pub project: Option<String>,
    pub path: Option<String>,
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponseDto {
    pub ok: u8,
}

impl UploadResponseDto {
    pub fn success() -> Self {
        Self { ok: 1 }
    }
}
