//! tally-ingest: statement text extraction and bank-specific parsers.

pub mod error;
pub mod parsers;
pub mod text;
pub mod types;

pub use error::{IngestError, Result};
pub use parsers::parse_bbva_mx_pages;
#[cfg(feature = "pdf")]
pub use text::PdfPages;
pub use text::{PageTextSource, PlainTextPages, statement_lines};
pub use types::{ParseWarning, RawStatement};
