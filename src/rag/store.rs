//! Records shared by the index store and the in-memory corpus index.

/// A reference chunk with its embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    /// Stable identifier derived from the ordinal (`chunk-00042`).
    pub chunk_id: String,
    /// Position of the chunk in the source text.
    pub ordinal: usize,
    /// The text content of the chunk.
    pub content: String,
    pub embedding: Vec<f32>,
}

impl IndexedChunk {
    pub fn chunk_id_for(ordinal: usize) -> String {
        format!("chunk-{:05}", ordinal)
    }
}

/// Result of a similarity search.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: IndexedChunk,
    /// Similarity score (higher = better).
    pub score: f32,
}

/// Build parameters persisted next to the chunks.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMeta {
    pub embedding_model: String,
    pub dims: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub chunk_count: usize,
    /// RFC 3339 build timestamp.
    pub built_at: String,
}
