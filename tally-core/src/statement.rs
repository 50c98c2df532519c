//! Statement-level types shared by the parser and the classifier.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Declared aggregate totals printed on the statement. Amounts in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementTotals {
    pub credit_sum: i64,
    pub credit_count: usize,
    pub debit_sum: i64,
    pub debit_count: usize,
}

/// Credit/debit classification of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "debit")]
    Debit,
    #[serde(rename = "unresolved")]
    Unresolved,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Credit => "credit",
            Direction::Debit => "debit",
            Direction::Unresolved => "unresolved",
        }
    }
}

/// One assembled transaction row.
///
/// Created by the record assembler with `direction = Unresolved`; only the seed
/// and reconciliation stages change `is_seed_credit`, `plausibility_score` and
/// `direction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCandidate {
    pub operation_date: NaiveDate,
    pub liquidation_date: NaiveDate,
    pub description: String,
    pub amount_minor: i64,
    pub is_seed_credit: bool,
    pub plausibility_score: i32,
    pub direction: Direction,
    pub source_tag: String,
}

impl TransactionCandidate {
    pub fn new(
        operation_date: NaiveDate,
        liquidation_date: NaiveDate,
        description: impl Into<String>,
        amount_minor: i64,
        source_tag: impl Into<String>,
    ) -> Self {
        Self {
            operation_date,
            liquidation_date,
            description: description.into(),
            amount_minor,
            is_seed_credit: false,
            plausibility_score: 0,
            direction: Direction::Unresolved,
            source_tag: source_tag.into(),
        }
    }

    pub fn is_credit(&self) -> bool {
        self.direction == Direction::Credit
    }

    pub fn is_debit(&self) -> bool {
        self.direction == Direction::Debit
    }
}
