//! Shared application state wiring engine, quiz, video, and logging pieces

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use tutor_cli::{
    FeedbackLog, FeedbackSummary, QuizGenerator, QuizStore, UsageEvent, UsageLog, YouTubeSearcher,
};
use tutor_core::{FeedbackEntry, LlmClient, Quiz, Result, SavedQuiz, Video, VectorStore};
use tutor_rag::{TutorAnswer, TutorEngine};

pub const DEFAULT_QUIZ_QUESTIONS: usize = 5;

/// The outcome of one question, with any video fallback
pub struct AskOutcome {
    pub answer: TutorAnswer,
    pub videos: Vec<Video>,
}

/// One tutor session: the query engine plus the surrounding features.
///
/// Shared across CLI commands and HTTP handlers, so every method takes
/// `&self` and the stores synchronize internally.
pub struct TutorSession<L: LlmClient, V: VectorStore> {
    engine: TutorEngine<L, V>,
    quiz_generator: QuizGenerator<L>,
    quiz_store: QuizStore,
    video_searcher: Option<YouTubeSearcher>,
    feedback_log: FeedbackLog,
    usage_log: UsageLog,
}

impl<L: LlmClient, V: VectorStore> TutorSession<L, V> {
    pub fn new(llm: Arc<L>, vector_store: Arc<V>, storage_dir: &Path) -> Self {
        let video_searcher = match YouTubeSearcher::from_env() {
            Ok(searcher) => Some(searcher),
            Err(_) => {
                info!("YOUTUBE_API_KEY not set, video recommendations disabled");
                None
            }
        };

        Self {
            engine: TutorEngine::new(llm.clone(), vector_store),
            quiz_generator: QuizGenerator::new(llm),
            quiz_store: QuizStore::in_storage_dir(storage_dir),
            video_searcher,
            feedback_log: FeedbackLog::in_storage_dir(storage_dir),
            usage_log: UsageLog::in_storage_dir(storage_dir),
        }
    }

    /// Answer a question, falling back to video recommendations when the
    /// index does not cover it well.
    pub async fn ask(&self, question: &str, want_videos: bool) -> Result<AskOutcome> {
        let answer = self.engine.answer(question).await?;

        let videos = if answer.low_confidence && want_videos {
            match &self.video_searcher {
                Some(searcher) => searcher.search_educational_videos(question).await,
                None => Vec::new(),
            }
        } else {
            Vec::new()
        };

        let top_score = answer
            .sources
            .iter()
            .filter_map(|chunk| chunk.score)
            .fold(0.0f32, f32::max);
        self.usage_log
            .record(UsageEvent::query(question, top_score, videos.len()));

        Ok(AskOutcome { answer, videos })
    }

    /// Generate a quiz from indexed material on a topic and persist it.
    pub async fn generate_quiz(&self, topic: &str, num_questions: usize) -> Result<SavedQuiz> {
        let context = self.engine.context_for_topic(topic).await?;
        let quiz: Quiz = self
            .quiz_generator
            .generate(topic, &context, num_questions)
            .await?;

        let saved = self.quiz_store.save(topic, &quiz)?;
        self.usage_log
            .record(UsageEvent::quiz(topic, saved.questions.len()));
        Ok(saved)
    }

    pub fn recent_quizzes(&self, limit: usize) -> Result<Vec<SavedQuiz>> {
        self.quiz_store.recent(limit)
    }

    pub fn quiz(&self, id: u64) -> Result<Option<SavedQuiz>> {
        self.quiz_store.get(id)
    }

    /// Record feedback and return the running helpful/total tally.
    pub fn record_feedback(
        &self,
        query: &str,
        response: &str,
        helpful: bool,
    ) -> Result<FeedbackSummary> {
        self.feedback_log
            .record(FeedbackEntry::new(query, response, helpful))?;
        self.usage_log.record(UsageEvent::feedback(query, helpful));
        self.feedback_log.summary()
    }
}

/// Storage directory for index, quizzes, and logs. Overridable for tests
/// and containers via TUTOR_STORAGE_DIR.
pub fn storage_dir() -> PathBuf {
    std::env::var("TUTOR_STORAGE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("storage"))
}
