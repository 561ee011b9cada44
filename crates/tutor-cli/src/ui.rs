//! UI utilities for the CLI

use colored::*;
use crossterm::{
    event::{self, Event, KeyCode},
    terminal::{disable_raw_mode, enable_raw_mode, size},
};
use std::io::{self, IsTerminal, Write};
use tutor_core::{Quiz, Result, Video};

/// Display startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4));

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.blue());
    println!("{}", empty_line.blue());

    let title_line = format!(
        "│  {}{}│",
        "Tutor - Academic Tutor Assistant".blue().bold(),
        " ".repeat(banner_width.saturating_sub(35))
    );
    println!("{}", title_line);

    println!("{}", empty_line.blue());

    let feature_lines = vec![
        "🎓 Ask questions about your course materials",
        "",
        "Features:",
        "• 📚 Answers grounded in your lecture notes and slides",
        "• 📝 Quiz generation on any covered topic",
        "• 🎥 Video suggestions when materials fall short",
        "• ⬆️  Question history navigation (↑/↓ arrows)",
        "",
        "v0.1.0 • Powered by Groq",
    ];

    for line in feature_lines {
        if line.is_empty() {
            println!("{}", empty_line.blue());
        } else {
            let content = if line.starts_with("v0.1.0") {
                format!(
                    "│  {}{}│",
                    line.dimmed(),
                    " ".repeat(banner_width.saturating_sub(line.len() + 4))
                )
            } else {
                format!(
                    "│  {}{}│",
                    line,
                    " ".repeat(banner_width.saturating_sub(line.len() + 4))
                )
            };
            println!("{}", content.blue());
        }
    }

    println!("{}", empty_line.blue());
    println!("{}", bottom_border.blue());
    println!();
    println!(
        "{}",
        "💡 Tip: Ask a question about your materials, or 'help' for commands".dimmed()
    );
    println!();
}

/// Display help message
pub fn print_help() {
    println!("{}", "Available commands:".bold());
    println!(
        "  {} - Ask any question about the ingested materials",
        "question".green()
    );
    println!("  {} - Generate a quiz on a topic", "quiz <topic>".green());
    println!("  {} - Show this help message", "help".green());
    println!("  {} - Exit the application", "exit/quit".green());
    println!();
    println!("{}", "Examples:".bold());
    println!("  what is gradient descent?");
    println!("  explain the proof from lecture 3");
    println!("  quiz neural networks");
}

/// Read a line of input with history navigation
pub async fn read_input_with_history(history: &mut Vec<String>) -> Result<String> {
    // Piped input skips raw mode entirely
    if !io::stdin().is_terminal() {
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim().to_string();
        if !input.is_empty() {
            history.push(input.clone());
        }
        return Ok(input);
    }

    enable_raw_mode()?;
    let mut input = String::new();
    let mut history_index: Option<usize> = None;
    let mut cursor_pos = 0;

    print!("{} ", "tutor>".green().bold());
    io::stdout().flush()?;

    loop {
        if let Event::Key(key_event) = event::read()? {
            match key_event.code {
                KeyCode::Enter => {
                    disable_raw_mode()?;
                    println!();
                    if !input.is_empty() {
                        history.push(input.clone());
                    }
                    return Ok(input);
                }
                KeyCode::Char(c) => {
                    input.insert(cursor_pos, c);
                    cursor_pos += 1;
                    print!("\r{} {}", "tutor>".green().bold(), input);
                    io::stdout().flush()?;
                }
                KeyCode::Backspace => {
                    if cursor_pos > 0 {
                        input.remove(cursor_pos - 1);
                        cursor_pos -= 1;
                        print!(
                            "\r{} {}  \r{} {}",
                            "tutor>".green().bold(),
                            input,
                            "tutor>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Up => {
                    if !history.is_empty() {
                        let new_index = match history_index {
                            None => history.len() - 1,
                            Some(idx) if idx > 0 => idx - 1,
                            Some(idx) => idx,
                        };
                        history_index = Some(new_index);
                        input = history[new_index].clone();
                        cursor_pos = input.len();
                        print!(
                            "\r{} {}  \r{} {}",
                            "tutor>".green().bold(),
                            " ".repeat(50),
                            "tutor>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Down => {
                    if let Some(idx) = history_index {
                        if idx < history.len() - 1 {
                            let new_index = idx + 1;
                            history_index = Some(new_index);
                            input = history[new_index].clone();
                        } else {
                            history_index = None;
                            input.clear();
                        }
                        cursor_pos = input.len();
                        print!(
                            "\r{} {}  \r{} {}",
                            "tutor>".green().bold(),
                            " ".repeat(50),
                            "tutor>".green().bold(),
                            input
                        );
                        io::stdout().flush()?;
                    }
                }
                KeyCode::Esc => {
                    disable_raw_mode()?;
                    println!();
                    return Ok(String::new());
                }
                _ => {}
            }
        }
    }
}

/// Yes/no prompt, defaulting to yes
pub async fn confirm(prompt: &str) -> Result<bool> {
    print!("{} {} [Y/n]: ", "❓".cyan(), prompt);
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().read_line(&mut response)?;
    let response = response.trim().to_lowercase();

    Ok(response.is_empty() || response == "y" || response == "yes")
}

/// Pretty-print a quiz with answers hidden behind a dimmed footer
pub fn print_quiz(quiz: &Quiz) {
    println!();
    println!("{}", quiz.quiz_title.bold().underline());
    println!();

    let letters = ["A", "B", "C", "D"];
    for (i, question) in quiz.questions.iter().enumerate() {
        println!("{} {}", format!("Q{}.", i + 1).cyan().bold(), question.question);
        for (j, option) in question.options.iter().enumerate() {
            println!("   {} {}", format!("{})", letters[j]).dimmed(), option);
        }
        println!();
    }

    let answers: Vec<String> = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("Q{}: {}", i + 1, letters[q.correct_answer]))
        .collect();
    println!("{} {}", "Answers:".dimmed(), answers.join("  ").dimmed());
    println!();
}

/// Pretty-print video suggestions
pub fn print_videos(videos: &[Video]) {
    if videos.is_empty() {
        return;
    }
    println!();
    println!("{}", "🎥 These videos might help:".bold());
    for video in videos {
        println!("  • {} {}", video.title.green(), format!("({})", video.channel).dimmed());
        println!("    {}", video.url.blue().underline());
    }
    println!();
}
