//! Student feedback record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One piece of feedback on an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub query: String,
    pub response: String,
    pub helpful: bool,
    pub timestamp: DateTime<Utc>,
}

impl FeedbackEntry {
    pub fn new(query: impl Into<String>, response: impl Into<String>, helpful: bool) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
            helpful,
            timestamp: Utc::now(),
        }
    }
}
