//! CLI-facing features for the academic tutor assistant
//!
//! Quiz generation and persistence, YouTube recommendations, feedback and
//! usage logging, the environment bootstrap, and terminal UI helpers.

mod feedback;
mod logging;
mod quiz;
mod setup;
mod ui;
mod usage;
mod videos;

pub use feedback::{FeedbackLog, FeedbackSummary};
pub use logging::init_logging;
pub use quiz::{QuizGenerator, QuizStore};
pub use setup::{run_setup, run_setup_in, SetupError, SetupReport};
pub use ui::{
    confirm, display_banner, print_help, print_quiz, print_videos, read_input_with_history,
};
pub use usage::{is_truthy, UsageEvent, UsageLog};
pub use videos::YouTubeSearcher;

// Re-export core types
pub use tutor_core::{Error, Result};
