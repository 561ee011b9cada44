//! Quiz generation and persistence

use chrono::Utc;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use tutor_core::{CompletionConfig, Error, LlmClient, Quiz, Result, SavedQuiz};

/// Generates multiple-choice quizzes from retrieved course context
pub struct QuizGenerator<L: LlmClient> {
    llm: Arc<L>,
}

impl<L: LlmClient> QuizGenerator<L> {
    pub fn new(llm: Arc<L>) -> Self {
        Self { llm }
    }

    /// Generate a quiz on `topic` grounded in `context`.
    pub async fn generate(&self, topic: &str, context: &str, num_questions: usize) -> Result<Quiz> {
        let prompt = format!(
            "Based on the following context about {topic}, generate a \
             {num_questions}-question multiple choice quiz.\n\
             Format your response strictly as a JSON object with the following \
             structure, no extra comments:\n\
             {{\n\
             \x20   \"quiz_title\": \"Quiz about [topic]\",\n\
             \x20   \"questions\": [\n\
             \x20       {{\n\
             \x20           \"question\": \"Question text\",\n\
             \x20           \"options\": [\"Option 1\", \"Option 2\", \"Option 3\", \"Option 4\"],\n\
             \x20           \"correct_answer\": 0\n\
             \x20       }}\n\
             \x20   ]\n\
             }}\n\
             correct_answer is the index of the correct option (0-3).\n\
             \n\
             Context:\n\
             {context}"
        );

        let config = CompletionConfig {
            model_id: self.llm.model_id().to_string(),
            max_tokens: 2048,
            ..Default::default()
        };

        let completion = self.llm.complete_with_config(&prompt, &config).await?;
        let quiz = parse_quiz(&completion.text)?;
        quiz.validate()?;
        Ok(quiz)
    }
}

/// Parse the model reply into a quiz, tolerating Markdown code fences.
fn parse_quiz(reply: &str) -> Result<Quiz> {
    let fence = Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid regex");
    let body = fence
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(reply)
        .trim();

    serde_json::from_str(body)
        .map_err(|e| Error::Quiz(format!("model reply is not a valid quiz: {}", e)))
}

/// JSON-file-backed quiz store
pub struct QuizStore {
    file_path: PathBuf,
}

impl QuizStore {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Default location under the storage directory
    pub fn in_storage_dir(storage_dir: &Path) -> Self {
        Self::new(storage_dir.join("quizzes.json"))
    }

    fn load(&self) -> Result<Vec<SavedQuiz>> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.file_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn store(&self, quizzes: &[SavedQuiz]) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(quizzes)?;
        std::fs::write(&self.file_path, json)?;
        Ok(())
    }

    /// Save a generated quiz, returning the persisted record.
    pub fn save(&self, topic: &str, quiz: &Quiz) -> Result<SavedQuiz> {
        let mut quizzes = self.load()?;
        let id = quizzes.iter().map(|q| q.id).max().unwrap_or(0) + 1;

        let saved = SavedQuiz {
            id,
            topic: topic.to_string(),
            questions: quiz.questions.clone(),
            created_at: Utc::now(),
        };
        quizzes.push(saved.clone());
        self.store(&quizzes)?;

        info!("saved quiz #{} on {:?}", id, topic);
        Ok(saved)
    }

    /// Most recent quizzes, newest first.
    pub fn recent(&self, limit: usize) -> Result<Vec<SavedQuiz>> {
        let mut quizzes = self.load()?;
        quizzes.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        quizzes.truncate(limit);
        Ok(quizzes)
    }

    /// Look up a saved quiz by id.
    pub fn get(&self, id: u64) -> Result<Option<SavedQuiz>> {
        Ok(self.load()?.into_iter().find(|q| q.id == id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::QuizQuestion;

    const QUIZ_JSON: &str = r#"{
        "quiz_title": "Quiz about Derivatives",
        "questions": [
            {
                "question": "What is the derivative of x^2?",
                "options": ["x", "2x", "x^2", "2"],
                "correct_answer": 1
            }
        ]
    }"#;

    #[test]
    fn test_parse_plain_json() {
        let quiz = parse_quiz(QUIZ_JSON).unwrap();
        assert_eq!(quiz.quiz_title, "Quiz about Derivatives");
        assert_eq!(quiz.questions.len(), 1);
        assert_eq!(quiz.questions[0].correct_answer, 1);
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("Here you go:\n```json\n{}\n```\n", QUIZ_JSON);
        let quiz = parse_quiz(&fenced).unwrap();
        assert_eq!(quiz.questions.len(), 1);
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_quiz("I cannot generate a quiz right now.").is_err());
    }

    fn sample_quiz() -> Quiz {
        Quiz {
            quiz_title: "Quiz about Limits".to_string(),
            questions: vec![QuizQuestion {
                question: "What does a limit describe?".to_string(),
                options: vec![
                    "A bound".to_string(),
                    "The value a function approaches".to_string(),
                    "A maximum".to_string(),
                    "An asymptote".to_string(),
                ],
                correct_answer: 1,
            }],
        }
    }

    #[test]
    fn test_save_assigns_incrementing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuizStore::in_storage_dir(dir.path());

        let first = store.save("Limits", &sample_quiz()).unwrap();
        let second = store.save("Limits again", &sample_quiz()).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn test_recent_is_newest_first_and_limited() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuizStore::in_storage_dir(dir.path());

        for topic in ["a", "b", "c"] {
            store.save(topic, &sample_quiz()).unwrap();
        }

        let recent = store.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].topic, "c");
        assert_eq!(recent[1].topic, "b");
    }

    #[test]
    fn test_get_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = QuizStore::in_storage_dir(dir.path());

        let saved = store.save("Series", &sample_quiz()).unwrap();
        assert!(store.get(saved.id).unwrap().is_some());
        assert!(store.get(999).unwrap().is_none());
    }
}
