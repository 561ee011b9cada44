//! Ingestion, vector store, and query engine for the academic tutor
//!
//! This crate covers the retrieval side of the tutor: extracting text from
//! course materials, chunking and indexing them into a persistent local
//! vector store, and answering questions over the index with a hosted LLM.

mod engine;
mod extract;
mod indexer;
mod rewriter;
mod vector_store;

pub use engine::{TutorAnswer, TutorEngine, LOW_CONFIDENCE_THRESHOLD};
pub use extract::{extract_pages, PageText, SupportedFormat};
pub use indexer::MaterialIndexer;
pub use rewriter::QueryRewriter;
pub use vector_store::PersistentVectorStore;

// Re-export core types for convenience
pub use tutor_core::{
    ChunkMetadata, ChunkingConfig, Error, IndexedChunk, IngestReport, Result, SearchConfig,
    SearchHits, VectorStore,
};
