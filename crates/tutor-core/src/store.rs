//! Vector store trait and the indexed chunk model

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Where a chunk came from within the course materials.
///
/// Carried verbatim from ingestion through retrieval so answers can cite
/// the lecture file and page they were grounded on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub course_id: String,
    pub lecture_id: Option<String>,
    /// Source file name, e.g. `lecture_02.pdf`
    pub source: String,
    /// Page number for paged formats (1-based); None for plain text
    pub page: Option<u32>,
    pub chunk_index: usize,
}

impl ChunkMetadata {
    /// Human-readable citation, e.g. `lecture_02.pdf, page 4`
    pub fn citation(&self) -> String {
        match self.page {
            Some(page) => format!("{}, page {}", self.source, page),
            None => self.source.clone(),
        }
    }
}

/// A chunk of course material stored in the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedChunk {
    pub id: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub metadata: ChunkMetadata,
    /// Similarity score, populated on search results only
    pub score: Option<f32>,
}

/// Configuration for similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: None,
        }
    }
}

/// Search result from the vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHits {
    pub chunks: Vec<IndexedChunk>,
    pub total: usize,
}

/// Trait for vector stores holding embedded course material
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Open the store, loading any persisted state
    async fn connect(&mut self) -> Result<()>;

    /// Add a chunk, replacing any existing chunk with the same id
    async fn add(&self, chunk: IndexedChunk) -> Result<String>;

    /// Add multiple chunks in one batch
    async fn add_batch(&self, chunks: Vec<IndexedChunk>) -> Result<Vec<String>>;

    /// Similarity search over the stored chunks
    async fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchHits>;

    /// Get a chunk by ID
    async fn get(&self, id: &str) -> Result<Option<IndexedChunk>>;

    /// Delete a chunk by ID
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Clear all chunks
    async fn clear(&self) -> Result<()>;

    /// Number of stored chunks
    async fn count(&self) -> Result<usize>;

    /// Whether the store has been connected
    fn is_connected(&self) -> bool;
}
