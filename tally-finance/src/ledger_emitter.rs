//! Ledger emitter: converts classified statement rows into ledger records
//! the transaction store can insert (and de-duplicate by content hash).

use serde::{Deserialize, Serialize};
use tally_core::{Direction, LedgerRecord, TransactionCandidate, TxType};

/// Keyword -> account rule, e.g. `NU MEXICO` -> `Nu Turbo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterpartyRule {
    pub keyword: String,
    pub account: String,
}

/// How statement rows map onto the user's accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerMapping {
    /// The account the statement belongs to
    pub home_account: String,
    /// Counterparty when no rule matches
    pub default_counterparty: String,
    /// Counterparties that are the user's own accounts (-> transfer)
    pub own_accounts: Vec<String>,
    /// Checked in order; first match wins
    pub rules: Vec<CounterpartyRule>,
}

impl Default for LedgerMapping {
    fn default() -> Self {
        Self {
            home_account: "BBVA".to_string(),
            default_counterparty: "EXTERNO".to_string(),
            own_accounts: Vec::new(),
            rules: Vec::new(),
        }
    }
}

impl LedgerMapping {
    /// Counterparty account for a description
    pub fn counterparty(&self, description: &str) -> &str {
        let desc = description.to_uppercase();
        self.rules
            .iter()
            .find(|r| {
                let kw = r.keyword.trim().to_uppercase();
                !kw.is_empty() && desc.contains(&kw)
            })
            .map(|r| r.account.as_str())
            .unwrap_or(self.default_counterparty.as_str())
    }
}

/// Emits ledger records from classified transactions
pub struct LedgerEmitter;

impl LedgerEmitter {
    /// Convert one transaction; `None` while it is still unresolved
    pub fn to_record(txn: &TransactionCandidate, mapping: &LedgerMapping) -> Option<LedgerRecord> {
        let counterparty = mapping.counterparty(&txn.description);
        let is_transfer = mapping.own_accounts.iter().any(|a| a == counterparty);

        let (tx_type, from, to) = match txn.direction {
            Direction::Credit => (TxType::Income, counterparty, mapping.home_account.as_str()),
            Direction::Debit => (TxType::Expense, mapping.home_account.as_str(), counterparty),
            Direction::Unresolved => return None,
        };
        let tx_type = if is_transfer { TxType::Transfer } else { tx_type };

        Some(LedgerRecord::new(
            txn.operation_date,
            tx_type,
            from,
            to,
            txn.amount_minor,
            &txn.description,
            &txn.source_tag,
        ))
    }

    /// Convert every resolved transaction, keeping statement order
    pub fn to_records(txns: &[TransactionCandidate], mapping: &LedgerMapping) -> Vec<LedgerRecord> {
        txns.iter()
            .filter_map(|t| Self::to_record(t, mapping))
            .collect()
    }
}
