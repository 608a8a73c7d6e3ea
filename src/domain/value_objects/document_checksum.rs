use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a whole source document. Every chunk produced from
/// one ingestion carries the same checksum, which is what lets re-ingestion
/// of an unchanged document become a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentChecksum(String);

impl DocumentChecksum {
    pub fn from_content(content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let result = hasher.finalize();
        Self(format!("{:x}", result))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, stored: &str) -> bool {
        self.0 == stored
    }
}

impl std::fmt::Display for DocumentChecksum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<DocumentChecksum> for String {
    fn from(checksum: DocumentChecksum) -> Self {
        checksum.0
    }
}
