pub mod ask_handler;
pub mod upload_handler;

pub use ask_handler::AskHandler;
pub use upload_handler::UploadHandler;
