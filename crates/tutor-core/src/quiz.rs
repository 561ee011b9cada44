//! Quiz types shared by generation, storage, and the outer surfaces

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A single multiple-choice question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    /// Index of the correct option
    pub correct_answer: usize,
}

/// A generated quiz, as returned by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub quiz_title: String,
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    /// Validate the shape the generation prompt demands: at least one
    /// question, four options each, correct index in range.
    pub fn validate(&self) -> Result<()> {
        if self.questions.is_empty() {
            return Err(Error::Quiz("quiz has no questions".to_string()));
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.options.len() != 4 {
                return Err(Error::Quiz(format!(
                    "question {} has {} options, expected 4",
                    i + 1,
                    q.options.len()
                )));
            }
            if q.correct_answer >= q.options.len() {
                return Err(Error::Quiz(format!(
                    "question {} has correct_answer index {} out of range",
                    i + 1,
                    q.correct_answer
                )));
            }
        }
        Ok(())
    }
}

/// A quiz record persisted in the quiz store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedQuiz {
    pub id: u64,
    pub topic: String,
    pub questions: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}
