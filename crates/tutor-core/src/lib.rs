//! Core traits and types for the academic tutor assistant
//!
//! This crate defines the fundamental traits and types shared across the
//! tutor system: the LLM client and vector store interfaces, the chunk and
//! metadata model produced by ingestion, and the quiz/video/feedback
//! records the outer surfaces work with.

pub mod error;
pub mod feedback;
pub mod ingest;
pub mod llm;
pub mod quiz;
pub mod store;
pub mod video;

pub use error::{Error, Result};
pub use feedback::FeedbackEntry;
pub use ingest::{ChunkingConfig, IngestReport};
pub use llm::{Completion, CompletionConfig, LlmClient};
pub use quiz::{Quiz, QuizQuestion, SavedQuiz};
pub use store::{ChunkMetadata, IndexedChunk, SearchConfig, SearchHits, VectorStore};
pub use video::Video;
