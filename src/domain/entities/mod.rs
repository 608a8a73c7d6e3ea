pub mod page_chunk;

pub use page_chunk::{EMBEDDING_DIMENSION, PageChunk};
