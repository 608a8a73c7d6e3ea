use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AskRequestDto {
    pub question: Option<String>,
    pub project: Option<String>,
    pub stream: Option<bool>,
}
