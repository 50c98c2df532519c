//! Page text collaborator: turns a document into ordered per-page text blocks.
//!
//! Page order is significant; a transaction may start on one page and continue
//! on the next. Empty pages keep their slot.

use std::path::Path;

use crate::error::Result;

/// Page separator in plain-text dumps (what `pdftotext` emits between pages).
pub const PAGE_BREAK: char = '\x0C';

/// Anything that can produce a statement's page texts, in page order.
pub trait PageTextSource {
    fn pages(&self) -> Result<Vec<String>>;
}

/// A text dump with pages separated by form feeds.
#[derive(Debug, Clone)]
pub struct PlainTextPages {
    text: String,
}

impl PlainTextPages {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }
}

impl PageTextSource for PlainTextPages {
    fn pages(&self) -> Result<Vec<String>> {
        Ok(self.text.split(PAGE_BREAK).map(str::to_string).collect())
    }
}

/// A PDF document; text is read from its text layer only (no OCR).
#[cfg(feature = "pdf")]
#[derive(Debug, Clone)]
pub struct PdfPages {
    bytes: Vec<u8>,
}

#[cfg(feature = "pdf")]
impl PdfPages {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(std::fs::read(path)?))
    }
}

#[cfg(feature = "pdf")]
impl PageTextSource for PdfPages {
    fn pages(&self) -> Result<Vec<String>> {
        pdf_extract::extract_text_from_mem_by_pages(&self.bytes)
            .map_err(|e| crate::error::IngestError::Pdf(e.to_string()))
    }
}

/// Whole-document text used for header/footer lookups (period, totals).
pub fn join_pages(pages: &[String]) -> String {
    pages.join("\n")
}

/// Trimmed, non-empty lines of every page, in page order.
pub fn statement_lines(pages: &[String]) -> Vec<&str> {
    pages
        .iter()
        .flat_map(|page| page.lines())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
