//! Deterministic keyword rules for credit detection.
//!
//! Two jobs: force a handful of unambiguous descriptions to credit (seeds), and
//! give every other row a plausibility score the reconciliation search uses to
//! break ties between equally exact subsets.

use tally_core::{Direction, TransactionCandidate};

/// Retail/subscription brands that show up as card charges.
pub const MERCHANT_KEYWORDS: [&str; 7] = [
    "OXXO",
    "STARBUCKS",
    "AMAZON",
    "STRIPE",
    "GOOGLE",
    "WEB TICKETS",
    "NAYAX",
];

/// Descriptions that are always credits, whatever the totals say.
pub fn is_seed_credit(description: &str) -> bool {
    let desc = description.to_uppercase();
    desc.contains("PAGO DE NOMINA") || desc.contains("SPEI RECIBIDO")
}

/// Additive score: positive leans credit, negative leans debit.
pub fn credit_score(description: &str) -> i32 {
    let desc = description.to_uppercase();
    let mut score = 0;

    // --- Credit markers ---
    if desc.contains("NOMINA") {
        score += 10;
    }
    if desc.contains("RECIB") {
        score += 8;
    }
    if desc.contains("ABONO") || desc.contains("DEPOS") {
        score += 4;
    }
    // Goes both ways; slight nudge so it stays in play
    if desc.contains("PAGO CUENTA DE TERCERO") {
        score += 1;
    }

    // --- Debit markers ---
    if desc.contains("ENVIADO") {
        score -= 12;
    }
    if desc.contains("RETIRO") {
        score -= 8;
    }
    if desc.contains("PAGO TARJETA") {
        score -= 6;
    }
    if MERCHANT_KEYWORDS.iter().any(|k| desc.contains(k)) {
        score -= 4;
    }

    score
}

/// Count and cents of the forced credits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub count: usize,
    pub sum: i64,
}

/// Score every candidate and mark seeds as credits. Non-seeds are left as they are.
pub fn apply_seeds(candidates: &mut [TransactionCandidate]) -> SeedSummary {
    let mut summary = SeedSummary::default();

    for c in candidates.iter_mut() {
        c.plausibility_score = credit_score(&c.description);
        c.is_seed_credit = is_seed_credit(&c.description);
        if c.is_seed_credit {
            c.direction = Direction::Credit;
            summary.count += 1;
            summary.sum = summary.sum.saturating_add(c.amount_minor);
        }
    }

    summary
}
