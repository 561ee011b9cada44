//! Query rewriting for better retrieval

use std::sync::Arc;
use tracing::{debug, warn};

use tutor_core::{CompletionConfig, LlmClient};

/// Rewrites student questions into retrieval-friendly queries via the LLM.
///
/// Rewriting is best-effort: any model failure falls back to the original
/// question rather than failing the whole query.
pub struct QueryRewriter<L: LlmClient> {
    llm: Arc<L>,
}

impl<L: LlmClient> QueryRewriter<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self { llm }
    }

    pub async fn rewrite(&self, original_query: &str) -> String {
        let prompt = format!(
            "Rewrite the following student question to be more effective for \
             retrieving relevant information from educational materials.\n\
             Make it more specific, clear, and focused on key concepts.\n\
             Reply with the rewritten query only.\n\
             \n\
             Original query: \"{}\"\n\
             \n\
             Rewritten query:",
            original_query
        );

        let config = CompletionConfig {
            model_id: self.llm.model_id().to_string(),
            max_tokens: 128,
            ..Default::default()
        };

        match self.llm.complete_with_config(&prompt, &config).await {
            Ok(completion) => {
                let rewritten = first_query_line(&completion.text);
                if rewritten.is_empty() {
                    original_query.to_string()
                } else {
                    debug!("rewrote query {:?} -> {:?}", original_query, rewritten);
                    rewritten
                }
            }
            Err(e) => {
                warn!("query rewrite failed, using original query: {}", e);
                original_query.to_string()
            }
        }
    }
}

/// Models sometimes echo labels or wrap the query in quotes; keep the
/// first non-empty line with that noise stripped.
fn first_query_line(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    line.trim()
        .trim_start_matches("Rewritten query:")
        .trim()
        .trim_matches('"')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_query_line_strips_noise() {
        assert_eq!(
            first_query_line("\n\"chain rule for composite functions\"\n"),
            "chain rule for composite functions"
        );
        assert_eq!(
            first_query_line("Rewritten query: limits of sequences"),
            "limits of sequences"
        );
        assert_eq!(first_query_line(""), "");
    }
}
