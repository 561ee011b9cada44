//! File-backed vector store with deterministic hashed embeddings

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

use tutor_core::{Error, IndexedChunk, Result, SearchConfig, SearchHits, VectorStore};

const EMBEDDING_DIMENSION: usize = 384;

#[derive(Serialize, Deserialize)]
struct StoreFile {
    embedding_dimension: usize,
    chunks: Vec<IndexedChunk>,
}

/// Local vector store persisted as a JSON file under the storage directory.
///
/// Embeddings are deterministic hashed bag-of-words vectors, so the store
/// needs no model downloads and search is reproducible across runs.
pub struct PersistentVectorStore {
    data_file: PathBuf,
    chunks: RwLock<HashMap<String, IndexedChunk>>,
    connected: bool,
}

impl PersistentVectorStore {
    /// Create a store backed by the given file. Nothing is read until
    /// `connect` is called.
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        Self {
            data_file: data_file.into(),
            chunks: RwLock::new(HashMap::new()),
            connected: false,
        }
    }

    fn load_from_file(path: &Path) -> Result<Vec<IndexedChunk>> {
        let content = std::fs::read_to_string(path)?;
        let store: StoreFile = serde_json::from_str(&content)?;
        Ok(store.chunks)
    }

    fn save_to_file(&self) -> Result<()> {
        let chunks: Vec<IndexedChunk> = {
            let guard = self
                .chunks
                .read()
                .map_err(|e| Error::VectorStore(format!("lock poisoned: {}", e)))?;
            guard.values().cloned().collect()
        };

        let store = StoreFile {
            embedding_dimension: EMBEDDING_DIMENSION,
            chunks,
        };

        if let Some(parent) = self.data_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(&store)?;
        std::fs::write(&self.data_file, content)?;
        Ok(())
    }

    /// Hashed bag-of-words embedding: each word votes into three feature
    /// slots weighted by position, bigrams add one more, then L2 normalize.
    fn embed(text: &str) -> Vec<f32> {
        let normalized = text.to_lowercase();
        let words: Vec<&str> = normalized.split_whitespace().collect();

        let mut embedding = vec![0.0f32; EMBEDDING_DIMENSION];

        for (pos, word) in words.iter().enumerate() {
            let hash = hash_of(word);
            let idx1 = (hash % EMBEDDING_DIMENSION as u64) as usize;
            let idx2 = ((hash >> 16) % EMBEDDING_DIMENSION as u64) as usize;
            let idx3 = ((hash >> 32) % EMBEDDING_DIMENSION as u64) as usize;

            let position_weight = 1.0 / (pos as f32 + 1.0);
            embedding[idx1] += position_weight;
            embedding[idx2] += position_weight * 0.7;
            embedding[idx3] += position_weight * 0.5;
        }

        for pair in words.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            let idx = (hash_of(&bigram) % EMBEDDING_DIMENSION as u64) as usize;
            embedding[idx] += 0.8;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in embedding.iter_mut() {
                *val /= magnitude;
            }
        }

        embedding
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }
}

fn hash_of(token: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    token.hash(&mut hasher);
    hasher.finish()
}

#[async_trait]
impl VectorStore for PersistentVectorStore {
    async fn connect(&mut self) -> Result<()> {
        if self.data_file.exists() {
            let loaded = Self::load_from_file(&self.data_file)?;
            debug!("loaded {} chunks from {}", loaded.len(), self.data_file.display());
            let mut guard = self
                .chunks
                .write()
                .map_err(|e| Error::VectorStore(format!("lock poisoned: {}", e)))?;
            *guard = loaded.into_iter().map(|c| (c.id.clone(), c)).collect();
        }
        self.connected = true;
        Ok(())
    }

    async fn add(&self, mut chunk: IndexedChunk) -> Result<String> {
        if chunk.embedding.is_none() {
            chunk.embedding = Some(Self::embed(&chunk.content));
        }
        let id = chunk.id.clone();
        {
            let mut guard = self
                .chunks
                .write()
                .map_err(|e| Error::VectorStore(format!("lock poisoned: {}", e)))?;
            guard.insert(id.clone(), chunk);
        }
        self.save_to_file()?;
        Ok(id)
    }

    async fn add_batch(&self, chunks: Vec<IndexedChunk>) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(chunks.len());
        {
            let mut guard = self
                .chunks
                .write()
                .map_err(|e| Error::VectorStore(format!("lock poisoned: {}", e)))?;
            for mut chunk in chunks {
                if chunk.embedding.is_none() {
                    chunk.embedding = Some(Self::embed(&chunk.content));
                }
                let id = chunk.id.clone();
                guard.insert(id.clone(), chunk);
                ids.push(id);
            }
        }
        self.save_to_file()?;
        Ok(ids)
    }

    async fn search(&self, query: &str, config: &SearchConfig) -> Result<SearchHits> {
        let query_embedding = Self::embed(query);

        let guard = self
            .chunks
            .read()
            .map_err(|e| Error::VectorStore(format!("lock poisoned: {}", e)))?;

        let mut results: Vec<IndexedChunk> = guard
            .values()
            .filter_map(|chunk| {
                let embedding = chunk.embedding.as_ref()?;
                let score = Self::cosine_similarity(&query_embedding, embedding);
                if let Some(threshold) = config.score_threshold {
                    if score < threshold {
                        return None;
                    }
                }
                let mut hit = chunk.clone();
                hit.score = Some(score);
                Some(hit)
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(config.top_k);

        let total = results.len();
        Ok(SearchHits {
            chunks: results,
            total,
        })
    }

    async fn get(&self, id: &str) -> Result<Option<IndexedChunk>> {
        let guard = self
            .chunks
            .read()
            .map_err(|e| Error::VectorStore(format!("lock poisoned: {}", e)))?;
        Ok(guard.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let removed = {
            let mut guard = self
                .chunks
                .write()
                .map_err(|e| Error::VectorStore(format!("lock poisoned: {}", e)))?;
            guard.remove(id).is_some()
        };
        if removed {
            self.save_to_file()?;
        }
        Ok(removed)
    }

    async fn clear(&self) -> Result<()> {
        {
            let mut guard = self
                .chunks
                .write()
                .map_err(|e| Error::VectorStore(format!("lock poisoned: {}", e)))?;
            guard.clear();
        }
        self.save_to_file()
    }

    async fn count(&self) -> Result<usize> {
        let guard = self
            .chunks
            .read()
            .map_err(|e| Error::VectorStore(format!("lock poisoned: {}", e)))?;
        Ok(guard.len())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::ChunkMetadata;

    fn chunk(id: &str, content: &str) -> IndexedChunk {
        IndexedChunk {
            id: id.to_string(),
            content: content.to_string(),
            embedding: None,
            metadata: ChunkMetadata {
                course_id: "calculus101".to_string(),
                lecture_id: None,
                source: "notes.txt".to_string(),
                page: None,
                chunk_index: 0,
            },
            score: None,
        }
    }

    async fn store_in(dir: &tempfile::TempDir) -> PersistentVectorStore {
        let mut store = PersistentVectorStore::new(dir.path().join("index.json"));
        store.connect().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_add_get_count() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        let id = store
            .add(chunk("c1", "The derivative measures instantaneous rate of change"))
            .await
            .unwrap();
        assert_eq!(id, "c1");
        assert_eq!(store.count().await.unwrap(), 1);

        let stored = store.get("c1").await.unwrap().unwrap();
        assert!(stored.embedding.is_some());
    }

    #[tokio::test]
    async fn test_search_ranks_relevant_chunk_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        store
            .add(chunk("deriv", "the derivative measures the rate of change of a function"))
            .await
            .unwrap();
        store
            .add(chunk("rome", "the roman empire collapsed in the fifth century"))
            .await
            .unwrap();

        let hits = store
            .search("rate of change of a function", &SearchConfig::default())
            .await
            .unwrap();

        assert!(!hits.chunks.is_empty());
        assert_eq!(hits.chunks[0].id, "deriv");
    }

    #[tokio::test]
    async fn test_persists_across_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = store_in(&dir).await;
            store.add(chunk("c1", "integration by parts")).await.unwrap();
        }

        let store = store_in(&dir).await;
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.get("c1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_replaces_same_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        store.add(chunk("c1", "old content")).await.unwrap();
        store.add(chunk("c1", "new content")).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let stored = store.get("c1").await.unwrap().unwrap();
        assert_eq!(stored.content, "new content");
    }

    #[tokio::test]
    async fn test_delete_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir).await;

        store.add(chunk("c1", "limits")).await.unwrap();
        store.add(chunk("c2", "series")).await.unwrap();

        assert!(store.delete("c1").await.unwrap());
        assert!(!store.delete("c1").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[test]
    fn test_embeddings_are_normalized_and_deterministic() {
        let a = PersistentVectorStore::embed("chain rule for derivatives");
        let b = PersistentVectorStore::embed("chain rule for derivatives");
        assert_eq!(a, b);

        let magnitude: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
    }
}
