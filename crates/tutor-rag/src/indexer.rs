//! Chunking and indexing of course materials

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use walkdir::WalkDir;

use tutor_core::{
    ChunkMetadata, ChunkingConfig, Error, IndexedChunk, IngestReport, Result, VectorStore,
};

use crate::extract::{extract_pages, SupportedFormat};

/// Ingests course material files into a vector store: extract, chunk,
/// attach metadata, store.
pub struct MaterialIndexer<V: VectorStore> {
    vector_store: Arc<V>,
    config: ChunkingConfig,
}

impl<V: VectorStore> MaterialIndexer<V> {
    pub fn new(vector_store: Arc<V>) -> Self {
        Self {
            vector_store,
            config: ChunkingConfig::default(),
        }
    }

    pub fn with_config(vector_store: Arc<V>, config: ChunkingConfig) -> Self {
        Self {
            vector_store,
            config,
        }
    }

    /// Ingest a file or a directory tree of supported files.
    pub async fn index_path(
        &self,
        input: &Path,
        course_id: &str,
        lecture_id: Option<&str>,
    ) -> Result<IngestReport> {
        if input.is_file() {
            return self.index_file(input, course_id, lecture_id).await;
        }
        if !input.is_dir() {
            return Err(Error::Ingest(format!("path not found: {}", input.display())));
        }

        let mut files: Vec<_> = WalkDir::new(input)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();
        files.sort();

        let mut report = IngestReport::default();
        for file in files {
            if SupportedFormat::from_path(&file).is_none() {
                warn!("skipping unsupported file type: {}", file.display());
                report.files_skipped += 1;
                continue;
            }
            match self.index_file(&file, course_id, lecture_id).await {
                Ok(file_report) => report.merge(file_report),
                Err(e) => {
                    report.errors.push(format!("{}: {}", file.display(), e));
                }
            }
        }

        info!(
            "ingestion finished: {} chunks from {} files ({} skipped)",
            report.chunks_indexed, report.files_processed, report.files_skipped
        );
        Ok(report)
    }

    /// Ingest a single file. Re-ingesting the same file for the same
    /// course replaces its chunks, because chunk ids are digests of
    /// (course, source, page, index).
    pub async fn index_file(
        &self,
        path: &Path,
        course_id: &str,
        lecture_id: Option<&str>,
    ) -> Result<IngestReport> {
        let source = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        info!("processing {}", path.display());
        let pages = extract_pages(path)?;

        let mut chunks = Vec::new();
        for page in &pages {
            if page.text.trim().is_empty() {
                continue;
            }
            for (i, content) in self.chunk_words(&page.text).into_iter().enumerate() {
                let metadata = ChunkMetadata {
                    course_id: course_id.to_string(),
                    lecture_id: lecture_id.map(|s| s.to_string()),
                    source: source.clone(),
                    page: page.page,
                    chunk_index: i,
                };
                chunks.push(IndexedChunk {
                    id: chunk_id(course_id, &source, page.page, i),
                    content,
                    embedding: None,
                    metadata,
                    score: None,
                });
            }
        }

        if chunks.is_empty() {
            warn!("no text extracted from {}", path.display());
            return Ok(IngestReport {
                files_processed: 1,
                ..Default::default()
            });
        }

        let indexed = chunks.len();
        self.vector_store.add_batch(chunks).await?;
        info!("indexed {} chunks from {}", indexed, source);

        Ok(IngestReport {
            files_processed: 1,
            chunks_indexed: indexed,
            ..Default::default()
        })
    }

    /// Slice text into word-budget chunks with overlap.
    fn chunk_words(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let size = self.config.chunk_size.max(1);
        let step = size.saturating_sub(self.config.chunk_overlap).max(1);

        // One chunk per step start, tail included, so the last overlap
        // window is indexed even when it runs past the end of the text.
        let mut chunks = Vec::new();
        let mut start = 0;
        while start < words.len() {
            let end = (start + size).min(words.len());
            chunks.push(words[start..end].join(" "));
            start += step;
        }
        chunks
    }
}

/// Deterministic chunk id from course, source file, page, and chunk
/// index. Course id is part of the key so the same file ingested under
/// two courses indexes separately instead of replacing.
fn chunk_id(course_id: &str, source: &str, page: Option<u32>, chunk_index: usize) -> String {
    let key = format!("{}:{}:{}:{}", course_id, source, page.unwrap_or(0), chunk_index);
    format!("{:x}", md5::compute(key.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::PersistentVectorStore;
    use std::io::Write;

    async fn indexer_in(
        dir: &tempfile::TempDir,
        config: ChunkingConfig,
    ) -> (MaterialIndexer<PersistentVectorStore>, Arc<PersistentVectorStore>) {
        let mut store = PersistentVectorStore::new(dir.path().join("index.json"));
        store.connect().await.unwrap();
        let store = Arc::new(store);
        (MaterialIndexer::with_config(store.clone(), config), store)
    }

    #[tokio::test]
    async fn test_index_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let (indexer, store) = indexer_in(&dir, ChunkingConfig::default()).await;

        let file_path = dir.path().join("lecture_01.txt");
        let mut file = std::fs::File::create(&file_path).unwrap();
        writeln!(
            file,
            "A derivative measures how a function changes as its input changes."
        )
        .unwrap();

        let report = indexer
            .index_file(&file_path, "calculus101", Some("lecture_01"))
            .await
            .unwrap();

        assert_eq!(report.files_processed, 1);
        assert_eq!(report.chunks_indexed, 1);
        assert_eq!(store.count().await.unwrap(), 1);

        let hits = store
            .search("derivative", &tutor_core::SearchConfig::default())
            .await
            .unwrap();
        let meta = &hits.chunks[0].metadata;
        assert_eq!(meta.course_id, "calculus101");
        assert_eq!(meta.lecture_id.as_deref(), Some("lecture_01"));
        assert_eq!(meta.source, "lecture_01.txt");
        assert_eq!(meta.chunk_index, 0);
    }

    #[tokio::test]
    async fn test_reingest_replaces_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let (indexer, store) = indexer_in(&dir, ChunkingConfig::default()).await;

        let file_path = dir.path().join("notes.txt");
        std::fs::write(&file_path, "limits and continuity").unwrap();
        indexer.index_file(&file_path, "c1", None).await.unwrap();
        indexer.index_file(&file_path, "c1", None).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_directory_walk_skips_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("data");
        std::fs::create_dir(&data).unwrap();
        std::fs::write(data.join("a.txt"), "integration by substitution").unwrap();
        std::fs::write(data.join("b.md"), "# Series\n\ngeometric series converge").unwrap();
        std::fs::write(data.join("slides.pptx"), "binary junk").unwrap();

        let (indexer, store) = indexer_in(&dir, ChunkingConfig::default()).await;
        let report = indexer.index_path(&data, "calculus101", None).await.unwrap();

        assert_eq!(report.files_processed, 2);
        assert_eq!(report.files_skipped, 1);
        assert!(report.errors.is_empty());
        assert_eq!(store.count().await.unwrap(), report.chunks_indexed);
    }

    #[tokio::test]
    async fn test_chunking_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let (indexer, _) = indexer_in(
            &dir,
            ChunkingConfig {
                chunk_size: 10,
                chunk_overlap: 4,
            },
        )
        .await;

        let words: Vec<String> = (0..25).map(|i| format!("w{}", i)).collect();
        let text = words.join(" ");
        let chunks = indexer.chunk_words(&text);

        // step = 6: starts at 0, 6, 12, 18, 24
        assert_eq!(chunks.len(), 5);
        assert!(chunks[0].starts_with("w0"));
        assert!(chunks[1].starts_with("w6"));
        // consecutive chunks share the overlap region
        assert!(chunks[0].contains("w6"));
        // the tail start still yields a chunk
        assert_eq!(chunks[4], "w24");
    }

    #[tokio::test]
    async fn test_same_file_different_courses_index_separately() {
        let dir = tempfile::tempdir().unwrap();
        let (indexer, store) = indexer_in(&dir, ChunkingConfig::default()).await;

        let file_path = dir.path().join("notes.txt");
        std::fs::write(&file_path, "work and energy").unwrap();
        indexer.index_file(&file_path, "math101", None).await.unwrap();
        indexer.index_file(&file_path, "physics200", None).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);

        // re-ingesting under an existing course still replaces
        indexer.index_file(&file_path, "math101", None).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[test]
    fn test_chunk_ids_are_stable_and_course_scoped() {
        assert_eq!(
            chunk_id("calculus101", "lecture.pdf", Some(2), 1),
            chunk_id("calculus101", "lecture.pdf", Some(2), 1)
        );
        assert_ne!(
            chunk_id("calculus101", "lecture.pdf", Some(2), 1),
            chunk_id("calculus101", "lecture.pdf", Some(3), 1)
        );
        assert_ne!(
            chunk_id("calculus101", "lecture.pdf", Some(2), 1),
            chunk_id("physics200", "lecture.pdf", Some(2), 1)
        );
    }
}
