//! Ledger record types handed to the transaction store

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::money::to_decimal_string;

/// A normalized ledger movement between two accounts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerRecord {
    /// Date of the movement (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Income, expense or transfer
    #[serde(rename = "type")]
    pub tx_type: TxType,
    /// Account the money leaves
    pub from_account: String,
    /// Account the money enters
    pub to_account: String,
    /// Always non-negative, in cents
    pub amount_minor: i64,
    /// Human-readable description
    pub description: String,
    /// Statement source tag
    pub source: String,
}

/// Ledger movement types understood by the store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TxType {
    #[serde(rename = "income")]
    Income,
    #[serde(rename = "expense")]
    Expense,
    #[serde(rename = "transfer")]
    Transfer,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Income => "income",
            TxType::Expense => "expense",
            TxType::Transfer => "transfer",
        }
    }
}

impl LedgerRecord {
    /// Create a new LedgerRecord
    pub fn new(
        date: NaiveDate,
        tx_type: TxType,
        from_account: impl Into<String>,
        to_account: impl Into<String>,
        amount_minor: i64,
        description: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            date,
            tx_type,
            from_account: from_account.into(),
            to_account: to_account.into(),
            amount_minor,
            description: description.into(),
            source: source.into(),
        }
    }

    /// Key the store de-duplicates inserts by: lowercase hex SHA-256 over
    /// `date|type|from|to|amount|DESCRIPTION`.
    ///
    /// The description is trimmed and upper-cased; `source` is not part of the key,
    /// so re-importing the same statement under another tag still collides.
    pub fn content_hash(&self) -> String {
        let key = format!(
            "{}|{}|{}|{}|{}|{}",
            self.date,
            self.tx_type.as_str(),
            self.from_account,
            self.to_account,
            to_decimal_string(self.amount_minor),
            self.description.trim().to_uppercase()
        );
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Returns true if money enters the given account
    pub fn is_inflow_to(&self, account: &str) -> bool {
        self.to_account == account
    }
}
