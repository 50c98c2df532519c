use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tally_core::{StatementPeriod, StatementTotals, TransactionCandidate, format_minor_units};

/// Recoverable conditions surfaced to the caller alongside a successful parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// No declared totals; nothing to reconcile against.
    TotalsNotFound,
    /// A row had no amount token; it was kept with amount 0.
    MissingAmount {
        operation_date: NaiveDate,
        description: String,
    },
    /// Lines in the detail section before the first transaction row.
    OrphanLines { count: usize },
    /// Seed credits already meet or exceed the declared credit count.
    SeedOvershoot {
        residual_count: i64,
        residual_sum: i64,
    },
    /// No subset of the remaining rows matches the residual credit target.
    InfeasibleReconciliation {
        residual_count: i64,
        residual_sum: i64,
    },
    /// The exact search was cut off by its candidate/state budget.
    SolverBudgetExhausted { candidates: usize, states: usize },
    /// Assigned debits disagree with the declared debit totals.
    DebitTotalsMismatch {
        expected_sum: i64,
        expected_count: usize,
        actual_sum: i64,
        actual_count: usize,
    },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::TotalsNotFound => {
                write!(f, "statement totals not found; credits limited to seed keywords")
            }
            ParseWarning::MissingAmount {
                operation_date,
                description,
            } => write!(f, "no amount on {operation_date} row '{description}'; using 0.00"),
            ParseWarning::OrphanLines { count } => {
                write!(f, "{count} line(s) before the first transaction row were ignored")
            }
            ParseWarning::SeedOvershoot {
                residual_count,
                residual_sum,
            } => write!(
                f,
                "seed credits already cover the credit target (residual count {residual_count}, residual sum {})",
                format_minor_units(*residual_sum)
            ),
            ParseWarning::InfeasibleReconciliation {
                residual_count,
                residual_sum,
            } => write!(
                f,
                "no {residual_count} transaction(s) add up to {}; kept seed-only classification",
                format_minor_units(*residual_sum)
            ),
            ParseWarning::SolverBudgetExhausted { candidates, states } => write!(
                f,
                "reconciliation gave up after {states} states over {candidates} candidates; kept seed-only classification"
            ),
            ParseWarning::DebitTotalsMismatch {
                expected_sum,
                expected_count,
                actual_sum,
                actual_count,
            } => write!(
                f,
                "debits are {} in {actual_count} rows, statement declares {} in {expected_count}",
                format_minor_units(*actual_sum),
                format_minor_units(*expected_sum)
            ),
        }
    }
}

/// Output of a statement parser, before credit/debit classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatement {
    pub period: StatementPeriod,
    pub totals: Option<StatementTotals>,
    /// Ordered by (operation date ascending, amount descending); all `Unresolved`.
    pub candidates: Vec<TransactionCandidate>,
    pub warnings: Vec<ParseWarning>,
}
