use chrono::NaiveDate;
use tally_core::{Direction, TxType};
use tally_finance::{
    CounterpartyRule, LedgerEmitter, LedgerMapping, Reconciliation, SolverBudget, parse_statement,
    parse_statement_pages,
};
use tally_ingest::{IngestError, ParseWarning, PlainTextPages};

const PAGE_ONE: &str = r#"
BBVA MEXICO, S.A., INSTITUCION DE BANCA MULTIPLE
Estado de Cuenta
Libretón Básico Cuenta Digital
Periodo DEL 03/12/2025 AL 02/01/2026
Fecha de Corte 02/01/2026
No. de Cuenta 0123456789
No. de Cliente 98765432
Detalle de Movimientos Realizados
FECHA SALDO
OPER LIQ DESCRIPCION REFERENCIA CARGOS ABONOS OPERACION LIQUIDACION
03/DIC 03/DIC SPEI ENVIADO NU MEXICO 1,500.00 16,500.00 16,500.00
0123456789 Ref. 0003 TRANSFERENCIA
05/DIC 05/DIC PAGO DE NOMINA 18,000.00 34,500.00 34,500.00
EMPRESA SA DE CV
08/DIC 08/DIC STARBUCKS COYOACAN 89.50
RFC: SCM 111111 AB1
12/DIC 12/DIC PAGO CUENTA DE TERCERO 2,400.00
BNET 0123456789 RENTA
15/DIC 15/DIC RETIRO CAJERO AUTOMATICO 2,000.00
19/DIC 19/DIC SPEI RECIBIDO BANORTE 3,250.00
072180001234567890 Ref. 1912
22/DIC 22/DIC PAGO CUENTA DE TERCERO 1,200.00
BNET 0987654321 GIMNASIO
28/DIC 28/DIC DEPOSITO EN EFECTIVO 500.00
"#;

const PAGE_TWO: &str = r#"
Estado de Cuenta
PAGINA 2 / 2
No. de Cuenta 0123456789
FOLIO 889911
02/ENE 02/ENE AMAZON MX MARKETPLACE 649.00
Total de Movimientos
TOTAL IMPORTE CARGOS 5,438.50 TOTAL MOVIMIENTOS CARGOS 5
TOTAL IMPORTE ABONOS 24,150.00 TOTAL MOVIMIENTOS ABONOS 4
La GAT Real es el rendimiento que obtendría después de descontar la inflación estimada
"#;

fn pages() -> Vec<String> {
    vec![PAGE_ONE.to_string(), PAGE_TWO.to_string()]
}

fn direction_of(s: &tally_finance::ClassifiedStatement, needle: &str) -> Direction {
    s.transactions
        .iter()
        .find(|t| t.description.contains(needle))
        .map(|t| t.direction)
        .unwrap_or_else(|| panic!("no transaction containing {needle}"))
}

/// Full statement: seeds + one exact residual pair reproduce the declared totals.
#[test]
fn test_statement_reconciles_to_declared_totals() {
    let s = parse_statement_pages(&pages(), &SolverBudget::default()).unwrap();

    assert_eq!(s.transactions.len(), 9);
    assert!(matches!(
        s.reconciliation,
        Reconciliation::Exact { selected: 2, score: 5, .. }
    ));
    assert!(s.warnings.is_empty(), "unexpected warnings: {:?}", s.warnings);

    assert_eq!(direction_of(&s, "PAGO DE NOMINA"), Direction::Credit);
    assert_eq!(direction_of(&s, "SPEI RECIBIDO"), Direction::Credit);
    assert_eq!(direction_of(&s, "RENTA"), Direction::Credit);
    assert_eq!(direction_of(&s, "DEPOSITO EN EFECTIVO"), Direction::Credit);
    assert_eq!(direction_of(&s, "GIMNASIO"), Direction::Debit);
    assert_eq!(direction_of(&s, "SPEI ENVIADO"), Direction::Debit);
    assert_eq!(direction_of(&s, "AMAZON"), Direction::Debit);

    let totals = s.totals.unwrap();
    let credit_sum: i64 = s.credits().map(|t| t.amount_minor).sum();
    let debit_sum: i64 = s.debits().map(|t| t.amount_minor).sum();
    assert_eq!(credit_sum, totals.credit_sum);
    assert_eq!(s.credits().count(), totals.credit_count);
    assert_eq!(debit_sum, totals.debit_sum);
    assert_eq!(s.debits().count(), totals.debit_count);

    let check = s.check.unwrap();
    assert!(check.credits_match() && check.debits_match());
}

/// Rows keep their continuation lines, even across the page break.
#[test]
fn test_records_span_pages_and_resolve_years() {
    let s = parse_statement_pages(&pages(), &SolverBudget::default()).unwrap();

    let deposit = s
        .transactions
        .iter()
        .find(|t| t.description.starts_with("DEPOSITO"))
        .unwrap();
    assert_eq!(deposit.description, "DEPOSITO EN EFECTIVO 500.00 FOLIO 889911");
    assert_eq!(deposit.operation_date, NaiveDate::from_ymd_opt(2025, 12, 28).unwrap());

    let last = s.transactions.last().unwrap();
    assert!(last.description.starts_with("AMAZON"));
    assert_eq!(last.operation_date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
    assert_eq!(last.amount_minor, 64900);
    assert!(s.transactions.iter().all(|t| t.source_tag == "bbva_pdf_2025-12-03_2026-01-02"));

    for pair in s.transactions.windows(2) {
        assert!(pair[0].operation_date <= pair[1].operation_date);
    }
}

#[test]
fn test_pipeline_is_deterministic() {
    let a = parse_statement_pages(&pages(), &SolverBudget::default()).unwrap();
    let b = parse_statement_pages(&pages(), &SolverBudget::default()).unwrap();
    assert_eq!(a, b);
}

/// Without totals nothing is reconciled: seeds are credits, the rest debits.
#[test]
fn test_missing_totals_keeps_every_record() {
    let page_two: String = PAGE_TWO
        .lines()
        .filter(|l| !l.starts_with("TOTAL IMPORTE"))
        .collect::<Vec<_>>()
        .join("\n");
    let s = parse_statement_pages(&[PAGE_ONE.to_string(), page_two], &SolverBudget::default())
        .unwrap();

    assert_eq!(s.reconciliation, Reconciliation::Skipped);
    assert_eq!(s.transactions.len(), 9);
    assert!(s.warnings.contains(&ParseWarning::TotalsNotFound));
    for t in &s.transactions {
        let expected = if t.is_seed_credit {
            Direction::Credit
        } else {
            Direction::Debit
        };
        assert_eq!(t.direction, expected, "{}", t.description);
    }
}

/// An impossible credit target keeps the seeds and flags the statement.
#[test]
fn test_infeasible_totals_keep_seed_credits() {
    let page_two = PAGE_TWO.replace("ABONOS 24,150.00", "ABONOS 24,150.01");
    let s = parse_statement_pages(&[PAGE_ONE.to_string(), page_two], &SolverBudget::default())
        .unwrap();

    assert!(matches!(s.reconciliation, Reconciliation::Infeasible { .. }));
    assert_eq!(direction_of(&s, "PAGO DE NOMINA"), Direction::Credit);
    assert_eq!(direction_of(&s, "SPEI RECIBIDO"), Direction::Credit);
    assert_eq!(s.credits().count(), 2);
    assert!(s.warnings.iter().any(|w| matches!(
        w,
        ParseWarning::InfeasibleReconciliation {
            residual_count: 2,
            residual_sum: 290001
        }
    )));
}

#[test]
fn test_plain_text_source_with_form_feed() {
    let dump = format!("{PAGE_ONE}\x0C{PAGE_TWO}");
    let s = parse_statement(&PlainTextPages::new(dump), &SolverBudget::default()).unwrap();
    assert!(s.reconciliation.is_exact());
}

#[test]
fn test_fatal_layout_errors() {
    let no_section = PAGE_ONE.replace("Detalle de Movimientos Realizados", "Resumen");
    let err = parse_statement_pages(&[no_section, PAGE_TWO.to_string()], &SolverBudget::default())
        .unwrap_err();
    assert!(matches!(err, IngestError::SectionNotFound));

    let no_period = PAGE_ONE.replace("Periodo DEL 03/12/2025 AL 02/01/2026", "Periodo");
    let err = parse_statement_pages(&[no_period, PAGE_TWO.to_string()], &SolverBudget::default())
        .unwrap_err();
    assert!(matches!(err, IngestError::PeriodNotFound));
}

/// Ledger export: own-account rules turn SPEI to Nu into a transfer.
#[test]
fn test_ledger_records_from_statement() {
    let s = parse_statement_pages(&pages(), &SolverBudget::default()).unwrap();
    let mapping = LedgerMapping {
        own_accounts: vec!["Nu Turbo".to_string()],
        rules: vec![CounterpartyRule {
            keyword: "NU MEXICO".to_string(),
            account: "Nu Turbo".to_string(),
        }],
        ..LedgerMapping::default()
    };
    let records = LedgerEmitter::to_records(&s.transactions, &mapping);
    assert_eq!(records.len(), s.transactions.len());

    let nu = records.iter().find(|r| r.to_account == "Nu Turbo").unwrap();
    assert_eq!(nu.tx_type, TxType::Transfer);
    assert_eq!(nu.from_account, "BBVA");

    let income = records.iter().filter(|r| r.tx_type == TxType::Income).count();
    assert_eq!(income, 4);

    let mut hashes: Vec<String> = records.iter().map(|r| r.content_hash()).collect();
    hashes.sort();
    hashes.dedup();
    assert_eq!(hashes.len(), records.len());
}

#[test]
fn test_classified_statement_serializes() {
    let s = parse_statement_pages(&pages(), &SolverBudget::default()).unwrap();
    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["reconciliation"]["status"], "exact");
    assert_eq!(json["period"]["start"], "2025-12-03");
    assert_eq!(json["transactions"][0]["direction"], "debit");
}

/// Amounts beyond any real statement are dropped instead of overflowing the sums.
#[test]
fn test_oversized_amounts_become_missing() {
    let row = "05/DIC 05/DIC PAGO DE NOMINA 46,116,860,184,273,879.04";
    let text = format!(
        "Periodo DEL 03/12/2025 AL 02/01/2026\nDetalle de Movimientos Realizados\n{row}\n{row}\n{row}"
    );
    let s = parse_statement_pages(&[text], &SolverBudget::default()).unwrap();

    assert_eq!(s.transactions.len(), 3);
    assert!(s.transactions.iter().all(|t| t.amount_minor == 0));
    assert!(s.transactions.iter().all(|t| t.direction == Direction::Credit));
    let missing = s
        .warnings
        .iter()
        .filter(|w| matches!(w, ParseWarning::MissingAmount { .. }))
        .count();
    assert_eq!(missing, 3);
}
