pub mod openai_client;
pub mod xai_client;

pub use openai_client::{OpenAiClient, OpenAiConfig};
pub use xai_client::{XaiClient, XaiConfig};
