//! The tutor query engine: retrieve, build context, generate

use std::sync::Arc;
use tracing::debug;

use tutor_core::{
    Completion, CompletionConfig, Error, IndexedChunk, LlmClient, Result, SearchConfig, SearchHits,
    VectorStore,
};

use crate::rewriter::QueryRewriter;

/// A retrieved hit scoring below this on every passage marks the answer as
/// low confidence, which triggers video recommendations.
pub const LOW_CONFIDENCE_THRESHOLD: f32 = 0.7;

const RETRIEVAL_TOP_K: usize = 5;

/// An answer with its supporting passages
#[derive(Debug, Clone)]
pub struct TutorAnswer {
    pub answer: String,
    pub sources: Vec<IndexedChunk>,
    /// The retrieval query actually used (post-rewrite)
    pub retrieval_query: String,
    pub low_confidence: bool,
}

/// Retrieval-augmented query engine over the course material index
pub struct TutorEngine<L: LlmClient, V: VectorStore> {
    llm: Arc<L>,
    vector_store: Arc<V>,
    rewriter: QueryRewriter<L>,
}

impl<L: LlmClient, V: VectorStore> TutorEngine<L, V> {
    pub fn new(llm: Arc<L>, vector_store: Arc<V>) -> Self {
        let rewriter = QueryRewriter::new(llm.clone());
        Self {
            llm,
            vector_store,
            rewriter,
        }
    }

    /// Retrieve the passages most relevant to a query.
    pub async fn retrieve(&self, query: &str) -> Result<SearchHits> {
        if !self.vector_store.is_connected() {
            return Err(Error::QueryEngine(
                "vector store not connected".to_string(),
            ));
        }
        if self.vector_store.count().await? == 0 {
            return Err(Error::QueryEngine(
                "vector store is empty; run ingestion first".to_string(),
            ));
        }

        let config = SearchConfig {
            top_k: RETRIEVAL_TOP_K,
            score_threshold: None,
        };
        self.vector_store.search(query, &config).await
    }

    /// Answer a student question: rewrite, retrieve, prompt, generate.
    pub async fn answer(&self, question: &str) -> Result<TutorAnswer> {
        let retrieval_query = self.rewriter.rewrite(question).await;
        let hits = self.retrieve(&retrieval_query).await?;

        let context = build_context(&hits.chunks);
        let prompt = qa_prompt(&context, question);
        debug!("answering with {} retrieved passages", hits.chunks.len());

        let completion: Completion = self
            .llm
            .complete_with_config(
                &prompt,
                &CompletionConfig {
                    model_id: self.llm.model_id().to_string(),
                    ..Default::default()
                },
            )
            .await?;

        let low_confidence = is_low_confidence(&hits.chunks);

        Ok(TutorAnswer {
            answer: completion.text,
            sources: hits.chunks,
            retrieval_query,
            low_confidence,
        })
    }

    /// Gather context text for a topic, for quiz generation.
    pub async fn context_for_topic(&self, topic: &str) -> Result<String> {
        let hits = self.retrieve(topic).await?;
        Ok(hits
            .chunks
            .iter()
            .map(|chunk| chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Numbered context block with source citations
fn build_context(chunks: &[IndexedChunk]) -> String {
    let mut context = String::new();
    for (i, chunk) in chunks.iter().enumerate() {
        context.push_str(&format!(
            "{}. [{}] {}\n\n",
            i + 1,
            chunk.metadata.citation(),
            chunk.content
        ));
    }
    context
}

fn qa_prompt(context: &str, question: &str) -> String {
    format!(
        "You are an academic tutor assistant. Your goal is to help students \
         understand course materials.\n\
         Use the following context information from the lecture to answer the query.\n\
         If the answer isn't in the context, say so. Explain your reasoning step-by-step.\n\
         Context:\n\
         {}\n\
         Query: {}\n\
         Answer: ",
        context, question
    )
}

/// No passage scoring above the threshold means the index probably does
/// not cover the question.
fn is_low_confidence(chunks: &[IndexedChunk]) -> bool {
    !chunks
        .iter()
        .any(|chunk| chunk.score.unwrap_or(0.0) > LOW_CONFIDENCE_THRESHOLD)
}
