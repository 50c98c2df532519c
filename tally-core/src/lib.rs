//! tally-core: Shared types for statement parsing and reconciliation

pub mod ledger;
pub mod money;
pub mod period;
pub mod statement;

pub use ledger::{LedgerRecord, TxType};
pub use money::{MAX_MINOR_UNITS, format_minor_units, parse_minor_units, to_decimal_string};
pub use period::{DateError, StatementPeriod, month_abbr, month_number};
pub use statement::{Direction, StatementTotals, TransactionCandidate};
