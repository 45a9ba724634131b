//! PDF text extraction

use crate::error::PipelineError;

/// Page separator emitted by `pdf-extract`
const PAGE_BREAK: char = '\x0C';

/// Extract the text of a PDF, optionally keeping only the given 0-based pages.
///
/// Page numbers past the end of the document are ignored.
pub fn extract_pdf_text(bytes: &[u8], pages: Option<&[usize]>) -> Result<String, PipelineError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| PipelineError::Internal(format!("PDF processing error: {}", e)))?;

    Ok(match pages {
        Some(pages) => select_pages(&text, pages),
        None => text,
    })
}

fn select_pages(text: &str, pages: &[usize]) -> String {
    let all: Vec<&str> = text.split(PAGE_BREAK).collect();
    pages
        .iter()
        .filter_map(|&page| all.get(page).copied())
        .collect::<Vec<_>>()
        .join("\n\n")
}
