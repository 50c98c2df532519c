use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tally_core::{LedgerRecord, TransactionCandidate, format_minor_units, to_decimal_string};
use tally_finance::{ClassifiedStatement, Reconciliation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Table,
    Json,
    Csv,
}

#[derive(Serialize)]
struct TransactionRow<'a> {
    operation_date: String,
    liquidation_date: String,
    description: &'a str,
    amount: String,
    direction: &'static str,
    source: &'a str,
}

impl<'a> From<&'a TransactionCandidate> for TransactionRow<'a> {
    fn from(t: &'a TransactionCandidate) -> Self {
        Self {
            operation_date: t.operation_date.to_string(),
            liquidation_date: t.liquidation_date.to_string(),
            description: &t.description,
            amount: to_decimal_string(t.amount_minor),
            direction: t.direction.as_str(),
            source: &t.source_tag,
        }
    }
}

#[derive(Serialize)]
struct LedgerRow<'a> {
    date: String,
    #[serde(rename = "type")]
    tx_type: &'static str,
    from_account: &'a str,
    to_account: &'a str,
    amount: String,
    description: &'a str,
    source: &'a str,
    hash: String,
}

impl<'a> From<&'a LedgerRecord> for LedgerRow<'a> {
    fn from(r: &'a LedgerRecord) -> Self {
        Self {
            date: r.date.to_string(),
            tx_type: r.tx_type.as_str(),
            from_account: &r.from_account,
            to_account: &r.to_account,
            amount: to_decimal_string(r.amount_minor),
            description: &r.description,
            source: &r.source,
            hash: r.content_hash(),
        }
    }
}

fn reconciliation_label(r: &Reconciliation) -> String {
    match r {
        Reconciliation::Exact {
            selected, states, ..
        } => format!("exact ({selected} selected, {states} states)"),
        Reconciliation::SeedsOnly => "seeds only".to_string(),
        Reconciliation::Skipped => "skipped (no totals)".to_string(),
        Reconciliation::Infeasible { .. } => "INFEASIBLE (seed-only fallback)".to_string(),
        Reconciliation::BudgetExhausted { .. } => {
            "BUDGET EXHAUSTED (seed-only fallback)".to_string()
        }
    }
}

pub fn render_table(s: &ClassifiedStatement) -> String {
    let mut out = String::new();
    out.push_str(&format!("Period: {} .. {}\n", s.period.start(), s.period.end()));

    match &s.totals {
        Some(t) => out.push_str(&format!(
            "Declared: credits {} ({}), debits {} ({})\n",
            format_minor_units(t.credit_sum),
            t.credit_count,
            format_minor_units(t.debit_sum),
            t.debit_count
        )),
        None => out.push_str("Declared: (no totals)\n"),
    }

    let credit_sum: i64 = s.credits().map(|t| t.amount_minor).sum();
    let debit_sum: i64 = s.debits().map(|t| t.amount_minor).sum();
    out.push_str(&format!(
        "Assigned: credits {} ({}), debits {} ({})\n",
        format_minor_units(credit_sum),
        s.credits().count(),
        format_minor_units(debit_sum),
        s.debits().count()
    ));
    out.push_str(&format!(
        "Reconciliation: {}\n\n",
        reconciliation_label(&s.reconciliation)
    ));

    for t in &s.transactions {
        let seed = if t.is_seed_credit { "*" } else { " " };
        out.push_str(&format!(
            "{} {:<6}{} {:>14}  {:>4}  {}\n",
            t.operation_date,
            t.direction.as_str(),
            seed,
            format_minor_units(t.amount_minor),
            t.plausibility_score,
            t.description
        ));
    }

    if !s.warnings.is_empty() {
        out.push_str("\nWarnings:\n");
        for w in &s.warnings {
            out.push_str(&format!("- {w}\n"));
        }
    }
    out
}

pub fn render_ledger_table(records: &[LedgerRecord]) -> String {
    let mut out = format!(
        "{:<10} {:<8} {:<14} {:<14} {:>14}  {}\n",
        "DATE", "TYPE", "FROM", "TO", "AMOUNT", "DESCRIPTION"
    );
    for r in records {
        out.push_str(&format!(
            "{} {:<8} {:<14} {:<14} {:>14}  {}\n",
            r.date,
            r.tx_type.as_str(),
            r.from_account,
            r.to_account,
            format_minor_units(r.amount_minor),
            r.description
        ));
    }
    out
}

fn csv_string<T: Serialize>(rows: impl IntoIterator<Item = T>) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.serialize(row).context("write csv row")?;
    }
    let bytes = wtr.into_inner().context("flush csv")?;
    String::from_utf8(bytes).context("csv output is not UTF-8")
}

pub fn render_statement(s: &ClassifiedStatement, format: Format) -> Result<String> {
    match format {
        Format::Table => Ok(render_table(s)),
        Format::Json => serde_json::to_string_pretty(s).context("serialize statement"),
        Format::Csv => csv_string(s.transactions.iter().map(TransactionRow::from)),
    }
}

pub fn render_ledger(records: &[LedgerRecord], format: Format) -> Result<String> {
    match format {
        Format::Table => Ok(render_ledger_table(records)),
        Format::Json => {
            let rows: Vec<LedgerRow> = records.iter().map(LedgerRow::from).collect();
            serde_json::to_string_pretty(&rows).context("serialize ledger")
        }
        Format::Csv => csv_string(records.iter().map(LedgerRow::from)),
    }
}

/// Write to `out`, or stdout when absent
pub fn emit(content: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(p) => fs::write(p, content).with_context(|| format!("write {}", p.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes()).context("write stdout")?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n").context("write stdout")?;
            }
            Ok(())
        }
    }
}
