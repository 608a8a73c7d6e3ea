use tiktoken_rs::{CoreBPE, cl100k_base};

#[derive(Debug)]
pub enum ChunkerError {
    TokenizerError(String),
    InvalidLimit,
}

impl std::fmt::Display for ChunkerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChunkerError::TokenizerError(msg) => write!(f, "Tokenizer error: {}", msg),
            ChunkerError::InvalidLimit => write!(f, "max_tokens_per_chunk must be at least 1"),
        }
    }
}

impl std::error::Error for ChunkerError {}

/// Splits raw text into token-bounded pieces via a tokenizer encode/decode
/// round trip. Tokens are packed greedily; a chunk closes exactly at the
/// limit, so no chunk's encoded length ever exceeds it. A boundary can land
/// inside the byte-level tokens of one multi-byte character; those bytes
/// decode to replacement characters rather than failing the whole split.
pub struct TokenChunker {
    bpe: CoreBPE,
}

impl TokenChunker {
    pub fn new() -> Result<Self, ChunkerError> {
        let bpe = cl100k_base().map_err(|e| ChunkerError::TokenizerError(e.to_string()))?;
        Ok(Self { bpe })
    }

    /// Deterministic: same content and limit always produce the same chunk
    /// sequence. Empty content yields a single empty chunk.
    pub fn chunk(
        &self,
        content: &str,
        max_tokens_per_chunk: usize,
    ) -> Result<Vec<String>, ChunkerError> {
        if max_tokens_per_chunk == 0 {
            return Err(ChunkerError::InvalidLimit);
        }

        let tokens = self.bpe.encode_ordinary(content);
        if tokens.is_empty() {
            return Ok(vec![String::new()]);
        }

        tokens
            .chunks(max_tokens_per_chunk)
            .map(|group| {
                let bytes: Vec<u8> = self
                    .bpe
                    ._decode_native_and_split(group.to_vec())
                    .flatten()
                    .collect();
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            })
            .collect()
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_reconstructs_content() {
        let chunker = TokenChunker::new().unwrap();
        let content = "The ingestion pipeline splits documentation pages into \
                       token-bounded chunks before embedding them for retrieval.";
        let chunks = chunker.chunk(content, 8).unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), content);
    }

    #[test]
    fn test_no_chunk_exceeds_limit() {
        let chunker = TokenChunker::new().unwrap();
        let content = "one two three four five six seven eight nine ten eleven twelve";
        let chunks = chunker.chunk(content, 4).unwrap();

        for chunk in &chunks {
            assert!(chunker.count_tokens(chunk) <= 4, "chunk too large: {:?}", chunk);
        }
    }

    #[test]
    fn test_short_content_is_one_chunk() {
        let chunker = TokenChunker::new().unwrap();
        let content = "# Title\nHello world";
        let chunks = chunker.chunk(content, 8191).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], content);
    }

    #[test]
    fn test_empty_content_yields_single_empty_chunk() {
        let chunker = TokenChunker::new().unwrap();
        let chunks = chunker.chunk("", 100).unwrap();

        assert_eq!(chunks, vec![String::new()]);
    }

    #[test]
    fn test_multibyte_content_splits_without_error() {
        let chunker = TokenChunker::new().unwrap();
        let content = "crab 🦀 and accents: café, naïve, 日本語のテキスト";
        let chunks = chunker.chunk(content, 1).unwrap();

        assert_eq!(chunks.len(), chunker.count_tokens(content));
        let combined = chunks.concat();
        assert!(combined.starts_with("crab"));
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let chunker = TokenChunker::new().unwrap();
        let content = "Deterministic chunking depends only on the tokenizer.";
        let first = chunker.chunk(content, 5).unwrap();
        let second = chunker.chunk(content, 5).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let chunker = TokenChunker::new().unwrap();
        assert!(chunker.chunk("anything", 0).is_err());
    }
}
