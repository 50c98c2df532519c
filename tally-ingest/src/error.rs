//! Fatal parse errors. Recoverable conditions are `ParseWarning`s instead.

use tally_core::DateError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// No `DEL dd/mm/yyyy AL dd/mm/yyyy` header; rows cannot be dated.
    #[error("statement period (DEL .. AL ..) not found")]
    PeriodNotFound,

    /// The movements detail anchor line is missing.
    #[error("section 'Detalle de Movimientos Realizados' not found")]
    SectionNotFound,

    #[error("date error: {0}")]
    Date(#[from] DateError),

    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
