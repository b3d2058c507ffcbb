//! Text acquisition: validating pasted text and extracting text from PDFs.

use lopdf::Document;
use pdf_extract::PlainTextOutput;
use tracing::error;

use crate::{Result, TermsumError};

/// Shortest accepted document, in characters after trimming.
pub const DEFAULT_MIN_TEXT_CHARS: usize = 10;

/// Pages read from an uploaded PDF; later pages are ignored.
pub const DEFAULT_MAX_PDF_PAGES: usize = 26;

pub const INSUFFICIENT_TEXT_MESSAGE: &str = "Texto insuficiente.";
pub const UNREADABLE_PDF_MESSAGE: &str = "PDF ilegível ou protegido.";

/// Bounds applied while reading uploads.
///
/// The minimum text length lives on
/// [`SummarizerConfig`](crate::SummarizerConfig), which validates every
/// request whatever its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLimits {
    pub max_pdf_pages: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_pdf_pages: DEFAULT_MAX_PDF_PAGES,
        }
    }
}

/// Reject text shorter than `min_chars` once surrounding whitespace is
/// removed.
pub fn validate_text(text: &str, min_chars: usize) -> Result<()> {
    if text.trim().chars().count() < min_chars {
        return Err(TermsumError::InvalidInput(
            INSUFFICIENT_TEXT_MESSAGE.to_string(),
        ));
    }
    Ok(())
}

/// Extract plain text from the first `max_pages` pages of a PDF.
///
/// The document is parsed once and only the leading pages are rendered to
/// text; later pages are never visited. Pages are joined with `\n` and pages
/// without text are skipped. Parse failures, encrypted files and image-only
/// scans all surface as the same `InvalidInput`.
pub fn extract_pdf_text(bytes: &[u8], max_pages: usize) -> Result<String> {
    let doc = Document::load_mem(bytes).map_err(|e| {
        error!(error = %e, "failed to parse PDF");
        unreadable()
    })?;

    let mut pages = Vec::new();
    for page_num in doc.get_pages().into_keys().take(max_pages) {
        let mut text = String::new();
        {
            let mut output = PlainTextOutput::new(&mut text);
            pdf_extract::output_doc_page(&doc, &mut output, page_num).map_err(|e| {
                error!(error = ?e, page = page_num, "failed to extract PDF page");
                unreadable()
            })?;
        }
        pages.push(text);
    }
    join_pages(pages)
}

/// [`extract_pdf_text`] on the blocking pool.
///
/// PDF parsing is CPU-bound and the parser can panic on malformed input;
/// a panic is contained in the blocking task and reported as unreadable.
pub async fn extract_pdf_text_blocking(bytes: Vec<u8>, max_pages: usize) -> Result<String> {
    tokio::task::spawn_blocking(move || extract_pdf_text(&bytes, max_pages))
        .await
        .map_err(|e| {
            error!(error = %e, "PDF extraction task failed");
            unreadable()
        })?
}

fn unreadable() -> TermsumError {
    TermsumError::InvalidInput(UNREADABLE_PDF_MESSAGE.to_string())
}

fn join_pages(pages: Vec<String>) -> Result<String> {
    let text = pages
        .into_iter()
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if text.trim().is_empty() {
        return Err(unreadable());
    }
    Ok(text)
}
