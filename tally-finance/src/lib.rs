//! tally-finance: seed rules, credit reconciliation, statement pipeline and ledger emitter

pub mod ledger_emitter;
pub mod pipeline;
pub mod reconcile;
pub mod seed_rules;
pub mod verify;

pub use ledger_emitter::{CounterpartyRule, LedgerEmitter, LedgerMapping};
pub use pipeline::{
    ClassifiedStatement, Reconciliation, classify_statement, parse_statement, parse_statement_pages,
};
pub use reconcile::{SolveOutcome, SolverBudget, SolverItem, solve};
pub use seed_rules::{apply_seeds, credit_score, is_seed_credit};
pub use verify::{TotalsCheck, verify_totals};
