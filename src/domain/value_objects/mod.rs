pub mod document_checksum;

pub use document_checksum::DocumentChecksum;
