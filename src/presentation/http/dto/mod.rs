pub mod ask_dto;
pub mod response_dto;
pub mod upload_dto;

pub use ask_dto::AskRequestDto;
pub use response_dto::HealthResponseDto;
pub use upload_dto::{UploadRequestDto, UploadResponseDto};
