//! Statement pipeline: page text -> candidates -> seeds -> reconciliation.
//!
//! Synchronous, one call per statement. Every memo table and candidate list is
//! owned by the call, so separate statements can be parsed concurrently.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tally_core::{Direction, StatementPeriod, StatementTotals, TransactionCandidate};
use tally_ingest::{IngestError, PageTextSource, ParseWarning, RawStatement, parse_bbva_mx_pages};

use crate::reconcile::{SolveOutcome, SolverBudget, SolverItem, solve};
use crate::seed_rules::apply_seeds;
use crate::verify::{TotalsCheck, verify_totals};

/// How the final credit/debit split was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Reconciliation {
    /// The solver found an exact subset for the residual credit target.
    Exact { selected: usize, score: i64, states: usize },
    /// Seeds alone already meet (or overshoot) the credit count.
    SeedsOnly,
    /// No declared totals.
    Skipped,
    /// No exact subset exists; non-seeds stay debits.
    Infeasible { states: usize },
    /// Search budget ran out; non-seeds stay debits.
    BudgetExhausted { states: usize },
}

impl Reconciliation {
    pub fn is_exact(&self) -> bool {
        matches!(self, Reconciliation::Exact { .. })
    }
}

/// Fully classified statement. Every transaction is `Credit` or `Debit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedStatement {
    pub period: StatementPeriod,
    pub totals: Option<StatementTotals>,
    /// Ordered by (operation date ascending, amount descending).
    pub transactions: Vec<TransactionCandidate>,
    pub reconciliation: Reconciliation,
    pub check: Option<TotalsCheck>,
    pub warnings: Vec<ParseWarning>,
}

impl ClassifiedStatement {
    pub fn credits(&self) -> impl Iterator<Item = &TransactionCandidate> {
        self.transactions.iter().filter(|t| t.is_credit())
    }

    pub fn debits(&self) -> impl Iterator<Item = &TransactionCandidate> {
        self.transactions.iter().filter(|t| t.is_debit())
    }
}

/// Read pages from `source` and run the whole pipeline.
pub fn parse_statement(
    source: &impl PageTextSource,
    budget: &SolverBudget,
) -> Result<ClassifiedStatement, IngestError> {
    let pages = source.pages()?;
    parse_statement_pages(&pages, budget)
}

/// Run the whole pipeline over already extracted page texts.
pub fn parse_statement_pages(
    pages: &[String],
    budget: &SolverBudget,
) -> Result<ClassifiedStatement, IngestError> {
    let raw = parse_bbva_mx_pages(pages)?;
    Ok(classify_statement(raw, budget))
}

/// Seed, reconcile and default the rest to debit.
pub fn classify_statement(raw: RawStatement, budget: &SolverBudget) -> ClassifiedStatement {
    let RawStatement {
        period,
        totals,
        mut candidates,
        mut warnings,
    } = raw;

    let seeds = apply_seeds(&mut candidates);
    debug!("classify: seeds={} seed_sum={}", seeds.count, seeds.sum);

    let reconciliation = match totals {
        None => Reconciliation::Skipped,
        Some(t) => {
            let residual_count = t.credit_count as i64 - seeds.count as i64;
            let residual_sum = t.credit_sum.saturating_sub(seeds.sum);

            if residual_count <= 0 {
                if residual_count < 0 || residual_sum != 0 {
                    warn!(
                        "classify: seeds overshoot credit target (count {residual_count}, sum {residual_sum})"
                    );
                    warnings.push(ParseWarning::SeedOvershoot {
                        residual_count,
                        residual_sum,
                    });
                }
                Reconciliation::SeedsOnly
            } else {
                reconcile_residual(
                    &mut candidates,
                    residual_count,
                    residual_sum,
                    budget,
                    &mut warnings,
                )
            }
        }
    };

    for c in candidates.iter_mut() {
        if c.direction == Direction::Unresolved {
            c.direction = Direction::Debit;
        }
    }

    let check = totals.map(|t| verify_totals(&candidates, t));
    if let Some(check) = &check {
        if check.credits_match() && !check.debits_match() {
            warn!("classify: debit side disagrees with declared totals");
            warnings.push(ParseWarning::DebitTotalsMismatch {
                expected_sum: check.declared.debit_sum,
                expected_count: check.declared.debit_count,
                actual_sum: check.debits.sum,
                actual_count: check.debits.count,
            });
        }
    }

    info!(
        "classify: {} transaction(s), reconciliation={:?}, warnings={}",
        candidates.len(),
        reconciliation,
        warnings.len()
    );

    ClassifiedStatement {
        period,
        totals,
        transactions: candidates,
        reconciliation,
        check,
        warnings,
    }
}

fn reconcile_residual(
    candidates: &mut [TransactionCandidate],
    residual_count: i64,
    residual_sum: i64,
    budget: &SolverBudget,
    warnings: &mut Vec<ParseWarning>,
) -> Reconciliation {
    let pool: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| !c.is_seed_credit)
        .map(|(i, _)| i)
        .collect();
    let items: Vec<SolverItem> = pool
        .iter()
        .map(|&i| SolverItem {
            amount_minor: candidates[i].amount_minor,
            score: candidates[i].plausibility_score,
        })
        .collect();

    debug!(
        "classify: solving residual count={residual_count} sum={residual_sum} over {} candidate(s)",
        items.len()
    );

    // residual_count > 0 here, so the cast cannot wrap
    match solve(&items, residual_count as usize, residual_sum, budget) {
        SolveOutcome::Selected {
            indices,
            score,
            states,
        } => {
            for &i in &indices {
                candidates[pool[i]].direction = Direction::Credit;
            }
            Reconciliation::Exact {
                selected: indices.len(),
                score,
                states,
            }
        }
        SolveOutcome::NoSolution { states } => {
            warn!("classify: reconciliation infeasible after {states} state(s)");
            warnings.push(ParseWarning::InfeasibleReconciliation {
                residual_count,
                residual_sum,
            });
            Reconciliation::Infeasible { states }
        }
        SolveOutcome::BudgetExhausted { states } => {
            warn!("classify: solver budget exhausted after {states} state(s)");
            warnings.push(ParseWarning::SolverBudgetExhausted {
                candidates: items.len(),
                states,
            });
            Reconciliation::BudgetExhausted { states }
        }
    }
}
