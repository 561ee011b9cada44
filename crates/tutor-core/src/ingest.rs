//! Ingestion configuration and reporting types

use serde::{Deserialize, Serialize};

/// Word-budget chunking parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum words per chunk
    pub chunk_size: usize,
    /// Words shared between consecutive chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 100,
        }
    }
}

/// Result of an ingestion run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestReport {
    pub files_processed: usize,
    pub files_skipped: usize,
    pub chunks_indexed: usize,
    pub errors: Vec<String>,
}

impl IngestReport {
    pub fn merge(&mut self, other: IngestReport) {
        self.files_processed += other.files_processed;
        self.files_skipped += other.files_skipped;
        self.chunks_indexed += other.chunks_indexed;
        self.errors.extend(other.errors);
    }
}
