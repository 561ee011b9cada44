//! Text extraction from course material files

use pulldown_cmark::{Event, Parser, TagEnd};
use std::path::Path;
use tracing::warn;

use tutor_core::{Error, Result};

/// A unit of extracted text with its page number, when the format has pages
#[derive(Debug, Clone)]
pub struct PageText {
    pub text: String,
    /// 1-based page number; None for unpaged formats
    pub page: Option<u32>,
}

/// File formats the ingester understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupportedFormat {
    Pdf,
    Markdown,
    Text,
}

impl SupportedFormat {
    /// Map a file extension to a format, if supported
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str())?.to_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "md" => Some(Self::Markdown),
            "txt" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Extract text from a file, page by page where the format has pages.
///
/// Pages that fail to extract yield an empty string rather than failing
/// the whole file.
pub fn extract_pages(path: &Path) -> Result<Vec<PageText>> {
    let format = SupportedFormat::from_path(path).ok_or_else(|| {
        Error::Ingest(format!("unsupported file type: {}", path.display()))
    })?;

    match format {
        SupportedFormat::Pdf => extract_pdf(path),
        SupportedFormat::Markdown => {
            let raw = std::fs::read_to_string(path)?;
            Ok(vec![PageText {
                text: markdown_to_text(&raw),
                page: None,
            }])
        }
        SupportedFormat::Text => {
            let raw = std::fs::read_to_string(path)?;
            Ok(vec![PageText {
                text: raw,
                page: None,
            }])
        }
    }
}

fn extract_pdf(path: &Path) -> Result<Vec<PageText>> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| Error::Ingest(format!("failed to load {}: {}", path.display(), e)))?;

    let mut pages = Vec::new();
    for (&page_number, _) in doc.get_pages().iter() {
        let text = match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "failed to extract page {} of {}: {}",
                    page_number,
                    path.display(),
                    e
                );
                String::new()
            }
        };
        pages.push(PageText {
            text,
            page: Some(page_number),
        });
    }

    Ok(pages)
}

/// Flatten Markdown to plain text by walking the event stream
pub fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::BlockQuote(_),
            ) => out.push('\n'),
            _ => {}
        }
    }

    out
}
