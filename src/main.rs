use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use tutor_cli::{
    display_banner, init_logging, is_truthy, print_help, print_quiz, print_videos,
    read_input_with_history, run_setup_in, QuizStore, SetupError,
};
use tutor_core::{ChunkingConfig, LlmClient, VectorStore};
use tutor_groq::GroqClient;
use tutor_rag::{MaterialIndexer, PersistentVectorStore};

mod server;
mod session;

use session::{storage_dir, TutorSession, DEFAULT_QUIZ_QUESTIONS};

#[derive(Parser)]
#[command(name = "tutor")]
#[command(about = "Academic tutor assistant over your course materials", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify prerequisites and prepare the working directories
    Setup,
    /// Ingest course materials (PDF, Markdown, or plain text)
    Ingest {
        /// File or directory to ingest
        input: PathBuf,
        /// Course the materials belong to
        #[arg(short, long)]
        course_id: String,
        /// Lecture identifier, when ingesting a single lecture
        #[arg(short, long)]
        lecture_id: Option<String>,
        /// Words per chunk
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Overlapping words between consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,
    },
    /// Ask a single question and exit
    Ask {
        question: String,
        /// Skip video suggestions when the materials don't cover the question
        #[arg(long)]
        no_videos: bool,
    },
    /// Interactive chat over the ingested materials
    Chat,
    /// Generate a multiple-choice quiz on a topic
    Quiz {
        topic: String,
        #[arg(short = 'n', long, default_value_t = DEFAULT_QUIZ_QUESTIONS)]
        questions: usize,
    },
    /// List recently generated quizzes
    Quizzes {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Run the HTTP API server
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Setup) => {
            match run_setup_in(std::path::Path::new(".")) {
                Ok(report) => {
                    for dir in &report.created_dirs {
                        println!("{} Created {}", "✅".green(), dir.display());
                    }
                    if report.env_file_created {
                        println!(
                            "{} Created .env from .env.example - fill in your API keys",
                            "✅".green()
                        );
                    }
                    println!("{} Setup complete", "✅".green());
                }
                Err(e @ SetupError::MissingTool(_)) => {
                    eprintln!("{} {}", "❌".red(), e);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
            Ok(())
        }
        Some(Commands::Ingest {
            input,
            course_id,
            lecture_id,
            chunk_size,
            overlap,
        }) => {
            let store = Arc::new(connect_store().await?);
            let mut config = ChunkingConfig::default();
            if let Some(size) = chunk_size {
                config.chunk_size = size;
            }
            if let Some(overlap) = overlap {
                config.chunk_overlap = overlap;
            }

            let indexer = MaterialIndexer::with_config(store, config);
            let report = indexer
                .index_path(&input, &course_id, lecture_id.as_deref())
                .await?;

            println!(
                "{} Indexed {} chunks from {} files ({} skipped)",
                "✅".green(),
                report.chunks_indexed,
                report.files_processed,
                report.files_skipped
            );
            for error in &report.errors {
                eprintln!("{} {}", "⚠️".yellow(), error);
            }
            Ok(())
        }
        Some(Commands::Ask { question, no_videos }) => {
            let session = build_session().await?;
            let outcome = session.ask(&question, !no_videos).await?;
            print_answer(&outcome);
            Ok(())
        }
        Some(Commands::Chat) | None => {
            let session = build_session().await?;
            run_chat(&session).await
        }
        Some(Commands::Quiz { topic, questions }) => {
            let session = build_session().await?;
            let saved = session.generate_quiz(&topic, questions).await?;
            println!(
                "{} Quiz #{} saved ({} questions)",
                "✅".green(),
                saved.id,
                saved.questions.len()
            );
            print_quiz(&tutor_core::Quiz {
                quiz_title: saved.topic.clone(),
                questions: saved.questions.clone(),
            });
            Ok(())
        }
        Some(Commands::Quizzes { limit }) => {
            // Local read only; no LLM connection needed.
            let quiz_store = QuizStore::in_storage_dir(&storage_dir());
            let quizzes = quiz_store.recent(limit)?;
            if quizzes.is_empty() {
                println!("No quizzes yet. Generate one with 'tutor quiz <topic>'.");
                return Ok(());
            }
            for quiz in quizzes {
                println!(
                    "  {} {} ({} questions, {})",
                    format!("#{}", quiz.id).cyan(),
                    quiz.topic.bold(),
                    quiz.questions.len(),
                    quiz.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
                );
            }
            Ok(())
        }
        Some(Commands::Serve { host, port }) => {
            let port = port
                .or_else(|| {
                    std::env::var("TUTOR_SERVER_PORT")
                        .ok()
                        .and_then(|p| p.parse().ok())
                })
                .unwrap_or(server::DEFAULT_PORT);
            let session = build_session().await?;
            server::run(session, &host, port).await?;
            Ok(())
        }
    }
}

/// Connect the persistent index in the storage directory.
async fn connect_store() -> Result<PersistentVectorStore> {
    let mut store = PersistentVectorStore::new(storage_dir().join("index.json"));
    store.connect().await?;
    Ok(store)
}

/// Wire up the full session: Groq client, vector store, and features.
async fn build_session() -> Result<TutorSession<GroqClient, PersistentVectorStore>> {
    let mut groq = GroqClient::from_env()?;
    groq.connect().await?;

    let store = connect_store().await?;
    Ok(TutorSession::new(
        Arc::new(groq),
        Arc::new(store),
        &storage_dir(),
    ))
}

fn headless() -> bool {
    std::env::var("TUTOR_HEADLESS")
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn print_answer(outcome: &session::AskOutcome) {
    println!();
    println!("{}", outcome.answer.answer);
    println!();
    if !outcome.answer.sources.is_empty() {
        println!("{}", "Sources:".dimmed());
        for chunk in &outcome.answer.sources {
            println!("  {} {}", "•".dimmed(), chunk.metadata.citation().dimmed());
        }
    }
    if outcome.answer.low_confidence {
        println!(
            "{}",
            "⚠️  Your materials may not cover this well.".yellow()
        );
        print_videos(&outcome.videos);
    }
}

/// Interactive loop: questions, quiz requests, and feedback prompts.
async fn run_chat(session: &TutorSession<GroqClient, PersistentVectorStore>) -> Result<()> {
    if !headless() {
        display_banner();
    }

    let mut history = Vec::new();

    loop {
        let input = read_input_with_history(&mut history).await?;

        if input.is_empty() {
            continue;
        }

        let input_lower = input.to_lowercase();

        if input_lower == "exit" || input_lower == "quit" {
            println!("{}", "👋 Goodbye!".green());
            break;
        }

        if input_lower == "help" {
            print_help();
            continue;
        }

        if let Some(topic) = input_lower.strip_prefix("quiz ") {
            let topic = topic.trim();
            println!("{} Generating quiz on '{}'...", "📝".cyan(), topic);
            match session.generate_quiz(topic, DEFAULT_QUIZ_QUESTIONS).await {
                Ok(saved) => print_quiz(&tutor_core::Quiz {
                    quiz_title: saved.topic.clone(),
                    questions: saved.questions.clone(),
                }),
                Err(e) => println!("{} Quiz generation failed: {}", "❌".red(), e),
            }
            continue;
        }

        println!("{} Thinking...", "🤖".blue());
        match session.ask(&input, true).await {
            Ok(outcome) => {
                print_answer(&outcome);

                if !headless() {
                    let helpful = tutor_cli::confirm("Was this answer helpful?").await?;
                    if let Err(e) =
                        session.record_feedback(&input, &outcome.answer.answer, helpful)
                    {
                        tracing::warn!("failed to record feedback: {}", e);
                    }
                    if !helpful {
                        println!(
                            "{}",
                            "Thanks - try rephrasing, or ask 'quiz <topic>' to test yourself."
                                .dimmed()
                        );
                    }
                }
            }
            Err(e) => {
                println!("{} {}", "❌".red(), e);
            }
        }
    }

    Ok(())
}
