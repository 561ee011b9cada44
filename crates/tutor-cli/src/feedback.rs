//! Feedback persistence

use std::path::{Path, PathBuf};

use tutor_core::{FeedbackEntry, Result};

/// Summary of collected feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackSummary {
    pub helpful: usize,
    pub total: usize,
}

/// JSON-file-backed log of answer feedback
pub struct FeedbackLog {
    file_path: PathBuf,
}

impl FeedbackLog {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    /// Default location under the storage directory
    pub fn in_storage_dir(storage_dir: &Path) -> Self {
        Self::new(storage_dir.join("feedback.json"))
    }

    fn load(&self) -> Result<Vec<FeedbackEntry>> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.file_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Append one feedback entry.
    pub fn record(&self, entry: FeedbackEntry) -> Result<()> {
        let mut entries = self.load()?;
        entries.push(entry);

        if let Some(parent) = self.file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.file_path, json)?;
        Ok(())
    }

    pub fn summary(&self) -> Result<FeedbackSummary> {
        let entries = self.load()?;
        Ok(FeedbackSummary {
            helpful: entries.iter().filter(|e| e.helpful).count(),
            total: entries.len(),
        })
    }
}
