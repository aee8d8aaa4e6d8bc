//! Report Invariant Test Suite
//!
//! Properties that must hold for every catalog entry on any table:
//! 1. Every declared subtotal equals the sum of its declared parts
//! 2. Assembly is deterministic
//! 3. Unknown primary codes never reach any total
//! 4. Forward-filled rows are bucketed with their object code

use nomina_core::catalog::{self, object_code, RP, SGP_I001, SGP_I002};
use nomina_core::{aggregate, BudgetTable, Measure, Predicate, Record, ReportKind, SummaryRow};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const UNKNOWN: &str = "9-999-X999";

/// One record per (primary code, sub-code 0..=99), values unique per cell
fn grid() -> BudgetTable {
    let mut records = Vec::new();
    for (p, code) in [RP, SGP_I001, SGP_I002, UNKNOWN].iter().enumerate() {
        for sub in 0..=99 {
            let base = Decimal::from((p as i64 + 1) * 1_000 + i64::from(sub));
            records.push(
                Record::new(*code)
                    .secondary(object_code(3, sub))
                    .value(Measure::Disponible, base)
                    .value(Measure::RpEmitidos, base * dec!(2))
                    .value(Measure::GirosAcumulados, base / dec!(4))
                    .value(Measure::SaldoApropiacion, -base)
                    .value(Measure::RecursosSinEjecutar, dec!(0.01)),
            );
        }
    }
    BudgetTable::new(records)
}

// ============================================================================
// INVARIANT 1: Subtotals equal the sum of their parts
// ============================================================================

#[test]
fn declared_subtotals_equal_sum_of_parts() {
    let table = grid();
    let mut checked = 0;

    for def in catalog::all() {
        let report = def.assemble(&table);
        for category in def.categories.iter().filter(|c| !c.parts.is_empty()) {
            let total = &report.row(&category.label).unwrap().summary;
            let parts: SummaryRow = category
                .parts
                .iter()
                .map(|label| &report.row(label).unwrap().summary)
                .sum();
            assert_eq!(total, &parts, "{} / {}", def.kind, category.label);
            checked += 1;
        }
    }

    // 2 por-fuente, 3 rp-total, 4 per segment report
    assert_eq!(checked, 2 + 3 + 4 * 3);
}

#[test]
fn totals_without_parts_cover_more_than_visible_rows() {
    let table = grid();
    let report = catalog::definition(ReportKind::RpTotal).assemble(&table);

    let visible: SummaryRow = ["SUELDOS", "PARAFISCALES", "FOMAG"]
        .iter()
        .map(|label| &report.row(label).unwrap().summary)
        .sum();
    let total = &report.row("TOTAL_DOC_RP").unwrap().summary;

    // sub-codes 17, 18 and 19 are in TOTAL_DOC_RP only
    let extra = Decimal::from(1_017 + 1_018 + 1_019);
    assert_eq!(total.disponible - visible.disponible, extra);
}

// ============================================================================
// INVARIANT 2: Determinism
// ============================================================================

#[test]
fn assembling_twice_is_identical() {
    let table = grid();
    for kind in ReportKind::ALL {
        let def = catalog::definition(kind);
        assert_eq!(def.assemble(&table), def.assemble(&table), "{kind}");
    }
}

// ============================================================================
// INVARIANT 3: Unknown primary codes are excluded
// ============================================================================

#[test]
fn unknown_primary_code_never_counted() {
    let with_unknown = grid();
    let without_unknown = BudgetTable::new(
        with_unknown
            .records()
            .iter()
            .filter(|r| r.primary_code.as_deref() != Some(UNKNOWN))
            .cloned()
            .collect(),
    );

    for kind in ReportKind::ALL {
        let def = catalog::definition(kind);
        let a = def.assemble(&with_unknown);
        let b = def.assemble(&without_unknown);
        assert_eq!(a.rows, b.rows, "{kind}");
    }
}

#[test]
fn total_general_spans_every_known_code() {
    let table = grid();
    let report = catalog::definition(ReportKind::PorFuente).assemble(&table);
    let total = &report.row("TOTAL_GENERAL").unwrap().summary;

    let expected: i64 = (1..=3).map(|p| (1..=86).map(|s| p * 1_000 + s).sum::<i64>()).sum();
    assert_eq!(total.disponible, Decimal::from(expected));
    assert_eq!(total.recursos_sin_ejecutar, dec!(0.01) * Decimal::from(86 * 3));
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn sueldo_basico_sums_its_sub_codes() {
    let table = BudgetTable::new(vec![
        Record::new(RP)
            .secondary(object_code(3, 33))
            .value(Measure::Disponible, 100),
        Record::new(RP)
            .secondary(object_code(2, 20))
            .value(Measure::Disponible, 50),
    ]);
    let report = catalog::definition(ReportKind::RpTotal).assemble(&table);

    assert_eq!(
        report.row("SUELDO BÁSICO").unwrap().summary.disponible,
        dec!(150)
    );
    assert_eq!(report.row("HORAS EXTRAS").unwrap().summary, SummaryRow::zero());
    assert_eq!(report.row("SUELDOS").unwrap().summary.disponible, dec!(150));
}

#[test]
fn forward_fill_groups_detail_rows_under_object_code() {
    let headers = [
        "Codigo",
        "Concepto de gasto",
        "DISPONIBLE",
        "RP EMITIDOS",
        "GIROS ACUMULADOS",
        "SALDO DE APROPIACION",
        "RECURSOS SIN EJECUTAR",
    ];
    let pi_01 = object_code(1, 1);
    let pi_09 = object_code(1, 9);
    let rows = vec![
        vec![pi_01.as_str(), "Sueldo", "", "", "", "", ""],
        vec![RP, "", "1,000", "800", "500", "200", "0"],
        vec![SGP_I002, "", "7", "7", "7", "0", "0"],
        vec![pi_09.as_str(), "Compensar", "", "", "", "", ""],
        vec![RP, "", "$40", "40", "", "", ""],
        vec![RP, "", "(10)", "", "", "", ""],
    ];
    let table = BudgetTable::from_rows(&headers, rows).unwrap();
    let report = catalog::definition(ReportKind::PrimeraInfancia).assemble(&table);

    let first = report.row(&pi_01).unwrap();
    assert_eq!(first.summary.disponible, dec!(1000));
    assert_eq!(first.summary.giros_acumulados, dec!(500));
    assert_eq!(first.nombre(), "Pago de Personal Docente primera infancia");

    assert_eq!(report.row(&pi_09).unwrap().summary.disponible, dec!(30));
    assert_eq!(report.row("PARAFISCALES").unwrap().nombre(), "---");
    assert_eq!(
        report
            .row("TOTAL_PRIMERA_INFANCIA")
            .unwrap()
            .summary
            .disponible,
        dec!(1030)
    );

    let sgp = aggregate(&table, &Predicate::code(SGP_I002).value(1));
    assert_eq!(sgp.disponible, dec!(7));
}

#[test]
fn empty_table_yields_zero_filled_report() {
    let report = catalog::definition(ReportKind::Orientadores).assemble(&BudgetTable::default());
    assert_eq!(report.rows.len(), 13 + 4);
    assert!(report.rows.iter().all(|r| r.summary.is_zero()));
    assert_eq!(report.records_scanned, 0);
}
