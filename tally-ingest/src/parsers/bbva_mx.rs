//! BBVA Mexico account statement parser (text)
//!
//! Expected extracted text:
//!   Periodo DEL 03/12/2025 AL 02/01/2026
//!   ...
//!   Detalle de Movimientos Realizados
//!   FECHA SALDO
//!   OPER LIQ DESCRIPCION REFERENCIA CARGOS ABONOS OPERACION LIQUIDACION
//!   03/DIC 03/DIC SPEI ENVIADO NU MEXICO 1,500.00
//!   0123456789 Ref. 0003
//!   ...
//!   Total de Movimientos
//!   TOTAL IMPORTE CARGOS 56,383.20 TOTAL MOVIMIENTOS CARGOS 42
//!   TOTAL IMPORTE ABONOS 41,830.83 TOTAL MOVIMIENTOS ABONOS 6
//!
//! Rows never say whether they are a charge or a deposit in the text layer (the
//! column position is lost), so every candidate comes out `Unresolved`.

use chrono::NaiveDate;
use log::{debug, info, warn};
use regex::Regex;
use tally_core::{StatementPeriod, StatementTotals, TransactionCandidate, parse_minor_units};

use crate::error::{IngestError, Result};
use crate::text::{join_pages, statement_lines};
use crate::types::{ParseWarning, RawStatement};

/// Lines that open the movements detail, compared case-insensitively.
const SECTION_ANCHORS: [&str; 2] = [
    "DETALLE DE MOVIMIENTOS REALIZADOS",
    "DETAIL OF REALIZED MOVEMENTS",
];

const AMOUNT_PATTERN: &str = r"\d{1,3}(?:,\d{3})*\.\d{2}";

/// Role of one raw line inside the detail section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole<'a> {
    /// `DD/MON DD/MON rest...` opens a new record.
    Start {
        operation: &'a str,
        liquidation: &'a str,
        rest: &'a str,
    },
    Continuation,
    Noise,
    /// `Total de Movimientos...` ends the detail section.
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawLine<'a> {
    pub text: &'a str,
    pub role: LineRole<'a>,
}

/// Compiled recognizers for the BBVA layout. Build once per parse.
pub struct BbvaPatterns {
    period: Regex,
    debit_totals: Regex,
    credit_totals: Regex,
    start: Regex,
    stop: Regex,
    noise: Regex,
    amount: Regex,
}

impl BbvaPatterns {
    pub fn new() -> Result<Self> {
        let totals = |kind: &str| {
            Regex::new(&format!(
                r"(?s)TOTAL\s+IMPORTE\s+{kind}\s+({AMOUNT_PATTERN}).*?TOTAL\s+MOVIMIENTOS\s+{kind}\s+(\d+)"
            ))
        };

        Ok(Self {
            period: Regex::new(
                r"(?:Periodo\s+)?DEL\s+(\d{2}/\d{2}/\d{4})\s+AL\s+(\d{2}/\d{2}/\d{4})",
            )?,
            debit_totals: totals("CARGOS")?,
            credit_totals: totals("ABONOS")?,
            start: Regex::new(r"^(\d{2}/[A-Z]{3})\s+(\d{2}/[A-Z]{3})\s+(.*)$")?,
            stop: Regex::new(r"^Total de Movimientos\b")?,
            noise: Regex::new(concat!(
                r"^(FECHA SALDO|OPER LIQ|PAGINA|No\. de Cuenta|No\. de Cliente|",
                r"Estado de Cuenta|Libretón|BBVA MEXICO|Av\. Paseo|La GAT Real)\b"
            ))?,
            amount: Regex::new(AMOUNT_PATTERN)?,
        })
    }

    /// Tag a trimmed line. Precedence: stop, noise, start, continuation.
    pub fn classify<'a>(&self, text: &'a str) -> RawLine<'a> {
        let role = if self.stop.is_match(text) {
            LineRole::Stop
        } else if self.noise.is_match(text) {
            LineRole::Noise
        } else if let Some(caps) = self.start.captures(text) {
            match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(op), Some(liq), Some(rest)) => LineRole::Start {
                    operation: op.as_str(),
                    liquidation: liq.as_str(),
                    rest: rest.as_str(),
                },
                _ => LineRole::Continuation,
            }
        } else {
            LineRole::Continuation
        };
        RawLine { text, role }
    }

    /// Declared period, e.g. `Periodo DEL 03/12/2025 AL 02/01/2026`.
    pub fn extract_period(&self, text: &str) -> Result<StatementPeriod> {
        let caps = self.period.captures(text).ok_or(IngestError::PeriodNotFound)?;
        let start = parse_full_date(&caps[1])?;
        let end = parse_full_date(&caps[2])?;
        Ok(StatementPeriod::new(start, end)?)
    }

    /// Declared totals; `None` unless both the charge and deposit blocks are present.
    pub fn extract_totals(&self, text: &str) -> Option<StatementTotals> {
        let debits = self.debit_totals.captures(text)?;
        let credits = self.credit_totals.captures(text)?;

        Some(StatementTotals {
            debit_sum: parse_minor_units(&debits[1])?,
            debit_count: debits[2].parse().ok()?,
            credit_sum: parse_minor_units(&credits[1])?,
            credit_count: credits[2].parse().ok()?,
        })
    }

    /// First thousands-separated decimal token in `line`, in cents.
    pub fn first_amount(&self, line: &str) -> Option<i64> {
        self.amount
            .find(line)
            .and_then(|m| parse_minor_units(m.as_str()))
    }
}

fn parse_full_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%d/%m/%Y").map_err(|_| {
        IngestError::Date(tally_core::DateError::InvalidDate {
            token: s.to_string(),
        })
    })
}

/// A record collected by the assembler, dates and amount still raw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord<'a> {
    pub operation: &'a str,
    pub liquidation: &'a str,
    pub first_line: &'a str,
    pub continuation: Vec<&'a str>,
}

impl PendingRecord<'_> {
    pub fn description(&self) -> String {
        std::iter::once(self.first_line)
            .chain(self.continuation.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Whether the assembler wants more lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Single open-record state machine over classified lines.
#[derive(Debug, Default)]
pub struct RecordAssembler<'a> {
    open: Option<PendingRecord<'a>>,
    closed: Vec<PendingRecord<'a>>,
    orphan_lines: usize,
    stopped: bool,
}

impl<'a> RecordAssembler<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, line: RawLine<'a>) -> Flow {
        if self.stopped {
            return Flow::Stop;
        }

        match line.role {
            LineRole::Stop => {
                self.stopped = true;
                return Flow::Stop;
            }
            LineRole::Noise => {}
            LineRole::Start {
                operation,
                liquidation,
                rest,
            } => {
                if let Some(done) = self.open.take() {
                    self.closed.push(done);
                }
                self.open = Some(PendingRecord {
                    operation,
                    liquidation,
                    first_line: rest,
                    continuation: Vec::new(),
                });
            }
            LineRole::Continuation => match self.open.as_mut() {
                Some(open) => open.continuation.push(line.text),
                None => self.orphan_lines += 1,
            },
        }
        Flow::Continue
    }

    /// Close the trailing record (even if truncated) and hand everything back.
    pub fn finish(mut self) -> (Vec<PendingRecord<'a>>, usize) {
        if let Some(done) = self.open.take() {
            self.closed.push(done);
        }
        (self.closed, self.orphan_lines)
    }
}

/// Lines after the detail anchor, or `SectionNotFound`.
fn detail_section<'a>(lines: &[&'a str]) -> Result<Vec<&'a str>> {
    let idx = lines
        .iter()
        .position(|line| {
            let upper = line.to_uppercase();
            SECTION_ANCHORS.iter().any(|anchor| upper == *anchor)
        })
        .ok_or(IngestError::SectionNotFound)?;
    Ok(lines[idx + 1..].to_vec())
}

/// Parse BBVA statement pages into unclassified candidates.
///
/// Fatal: missing period, missing detail section, unresolvable row dates.
/// Missing totals, missing amounts and orphan lines become warnings.
pub fn parse_bbva_mx_pages(pages: &[String]) -> Result<RawStatement> {
    let patterns = BbvaPatterns::new()?;
    let full_text = join_pages(pages);

    let period = patterns.extract_period(&full_text)?;
    let totals = patterns.extract_totals(&full_text);
    let mut warnings = Vec::new();
    if totals.is_none() {
        warn!("bbva: statement totals not found, reconciliation will be skipped");
        warnings.push(ParseWarning::TotalsNotFound);
    }

    let lines = statement_lines(pages);
    let section = detail_section(&lines)?;
    debug!(
        "bbva: period={}..{} lines={} detail_lines={}",
        period.start(),
        period.end(),
        lines.len(),
        section.len()
    );

    let mut assembler = RecordAssembler::new();
    for text in section {
        if assembler.feed(patterns.classify(text)) == Flow::Stop {
            break;
        }
    }
    let (records, orphan_lines) = assembler.finish();
    if orphan_lines > 0 {
        debug!("bbva: {orphan_lines} orphan line(s) before first row");
        warnings.push(ParseWarning::OrphanLines {
            count: orphan_lines,
        });
    }

    let source_tag = period.source_tag();
    let mut candidates = Vec::with_capacity(records.len());
    for record in &records {
        let operation_date = period.resolve_short_date(record.operation)?;
        let liquidation_date = period.resolve_short_date(record.liquidation)?;
        let description = record.description();

        let amount_minor = match patterns.first_amount(record.first_line) {
            Some(amount) => amount,
            None => {
                warn!("bbva: no amount on {operation_date} row '{description}'");
                warnings.push(ParseWarning::MissingAmount {
                    operation_date,
                    description: description.clone(),
                });
                0
            }
        };

        candidates.push(TransactionCandidate::new(
            operation_date,
            liquidation_date,
            description,
            amount_minor,
            source_tag.clone(),
        ));
    }

    candidates.sort_by(|a, b| {
        a.operation_date
            .cmp(&b.operation_date)
            .then(b.amount_minor.cmp(&a.amount_minor))
    });

    info!(
        "bbva: assembled {} candidate(s), totals={}",
        candidates.len(),
        if totals.is_some() { "present" } else { "absent" }
    );

    Ok(RawStatement {
        period,
        totals,
        candidates,
        warnings,
    })
}
