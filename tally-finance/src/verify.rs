//! Compare an assigned classification with the statement's declared totals.

use serde::{Deserialize, Serialize};
use tally_core::{Direction, StatementTotals, TransactionCandidate};

/// Sum (cents) and count actually assigned to one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideTotal {
    pub sum: i64,
    pub count: usize,
}

impl SideTotal {
    fn add(&mut self, amount_minor: i64) {
        self.sum = self.sum.saturating_add(amount_minor);
        self.count += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsCheck {
    pub credits: SideTotal,
    pub debits: SideTotal,
    pub declared: StatementTotals,
}

impl TotalsCheck {
    pub fn credits_match(&self) -> bool {
        self.credits.sum == self.declared.credit_sum
            && self.credits.count == self.declared.credit_count
    }

    pub fn debits_match(&self) -> bool {
        self.debits.sum == self.declared.debit_sum && self.debits.count == self.declared.debit_count
    }
}

/// Tally credits and debits; unresolved rows count on neither side.
pub fn verify_totals(transactions: &[TransactionCandidate], declared: StatementTotals) -> TotalsCheck {
    let mut credits = SideTotal::default();
    let mut debits = SideTotal::default();

    for t in transactions {
        match t.direction {
            Direction::Credit => credits.add(t.amount_minor),
            Direction::Debit => debits.add(t.amount_minor),
            Direction::Unresolved => {}
        }
    }

    TotalsCheck {
        credits,
        debits,
        declared,
    }
}
