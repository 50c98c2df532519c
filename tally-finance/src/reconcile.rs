//! Exact credit reconciliation against the statement's declared totals.
//!
//! Pick exactly `count` items whose amounts sum to exactly `sum`, maximizing the
//! total plausibility score. Exactness always wins over score; score only decides
//! between subsets that are already exact.
//!
//! Items are searched in (score desc, amount desc) order, include before
//! exclude, with memo key (position, count left, sum left). A state is dropped
//! early when the k largest remaining amounts cannot reach the sum or the k
//! smallest already overshoot it.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

/// Caps on the exact search; beyond them the caller falls back to seeds only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverBudget {
    pub max_candidates: usize,
    pub max_states: usize,
}

impl Default for SolverBudget {
    fn default() -> Self {
        Self {
            max_candidates: 400,
            max_states: 2_000_000,
        }
    }
}

/// One non-seed row as the solver sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverItem {
    pub amount_minor: i64,
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Indices into the input slice, in search order.
    Selected {
        indices: Vec<usize>,
        score: i64,
        states: usize,
    },
    NoSolution {
        states: usize,
    },
    BudgetExhausted {
        states: usize,
    },
}

/// Find the best exact subset of `items` with `count` members summing to `sum`.
pub fn solve(items: &[SolverItem], count: usize, sum: i64, budget: &SolverBudget) -> SolveOutcome {
    if items.len() > budget.max_candidates {
        debug!(
            "reconcile: {} candidates exceed budget of {}",
            items.len(),
            budget.max_candidates
        );
        return SolveOutcome::BudgetExhausted { states: 0 };
    }

    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        let (a, b) = (&items[a], &items[b]);
        (b.score, b.amount_minor).cmp(&(a.score, a.amount_minor))
    });

    let mut search = Search::new(items, &order, budget.max_states);
    let best = search.best(0, count, sum);

    if search.exhausted {
        return SolveOutcome::BudgetExhausted {
            states: search.states,
        };
    }

    match best {
        Some(score) => SolveOutcome::Selected {
            indices: search.reconstruct(count, sum),
            score,
            states: search.states,
        },
        None => SolveOutcome::NoSolution {
            states: search.states,
        },
    }
}

/// Memoized search state. Lives for exactly one `solve` call.
struct Search<'a> {
    order: &'a [usize],
    amounts: Vec<i64>,
    scores: Vec<i64>,
    /// `largest[pos][j]`: sum of the j largest amounts in `amounts[pos..]`.
    largest: Vec<Vec<i64>>,
    memo: HashMap<(usize, usize, i64), Option<i64>>,
    states: usize,
    max_states: usize,
    exhausted: bool,
}

impl<'a> Search<'a> {
    fn new(items: &[SolverItem], order: &'a [usize], max_states: usize) -> Self {
        let amounts: Vec<i64> = order.iter().map(|&i| items[i].amount_minor).collect();
        let scores: Vec<i64> = order.iter().map(|&i| i64::from(items[i].score)).collect();

        let largest: Vec<Vec<i64>> = (0..=amounts.len())
            .map(|pos| {
                let mut suffix = amounts[pos..].to_vec();
                suffix.sort_unstable_by(|a, b| b.cmp(a));
                std::iter::once(0)
                    .chain(suffix.iter().scan(0i64, |acc, &a| {
                        *acc = acc.saturating_add(a);
                        Some(*acc)
                    }))
                    .collect::<Vec<i64>>()
            })
            .collect();

        Self {
            order,
            amounts,
            scores,
            largest,
            memo: HashMap::new(),
            states: 0,
            max_states,
            exhausted: false,
        }
    }

    /// Best score reachable from `pos` picking `k` more items summing to `s`.
    fn best(&mut self, pos: usize, k: usize, s: i64) -> Option<i64> {
        if self.exhausted {
            return None;
        }
        if k == 0 {
            return (s == 0).then_some(0);
        }

        let n = self.amounts.len();
        if pos >= n || n - pos < k {
            return None;
        }

        let remaining = n - pos;
        let top_k = self.largest[pos][k];
        let bottom_k = self.largest[pos][remaining] - self.largest[pos][remaining - k];
        if top_k < s || bottom_k > s {
            return None;
        }

        if let Some(&cached) = self.memo.get(&(pos, k, s)) {
            return cached;
        }

        self.states += 1;
        if self.states > self.max_states {
            self.exhausted = true;
            return None;
        }

        let amount = self.amounts[pos];
        let mut best = None;

        if amount <= s {
            if let Some(v) = self.best(pos + 1, k - 1, s - amount) {
                best = Some(v + self.scores[pos]);
            }
        }
        if let Some(v) = self.best(pos + 1, k, s) {
            if best.is_none_or(|b| v > b) {
                best = Some(v);
            }
        }

        self.memo.insert((pos, k, s), best);
        best
    }

    /// Walk the memo from the root, taking an item whenever including it
    /// reproduces the optimum (include wins ties).
    fn reconstruct(&mut self, mut k: usize, mut s: i64) -> Vec<usize> {
        let mut chosen = Vec::with_capacity(k);
        let mut pos = 0;

        while k > 0 && pos < self.amounts.len() {
            let target = self.best(pos, k, s);
            let amount = self.amounts[pos];
            let take = amount <= s
                && target.is_some()
                && self
                    .best(pos + 1, k - 1, s - amount)
                    .map(|v| v + self.scores[pos])
                    == target;

            if take {
                chosen.push(self.order[pos]);
                k -= 1;
                s -= amount;
            }
            pos += 1;
        }

        chosen
    }
}
