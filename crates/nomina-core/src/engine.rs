//! Aggregation engine
//!
//! Pure functions from a `BudgetTable` and a predicate (or a whole report
//! definition) to summary rows. No I/O and no state.

use tracing::debug;

use crate::{BudgetTable, Predicate, Report, ReportDefinition, ReportRow, SummaryRow};

/// Sum the five measures over every record the predicate accepts.
///
/// Missing cells count as zero; an empty match yields an all-zero row.
pub fn aggregate(table: &BudgetTable, predicate: &Predicate) -> SummaryRow {
    table
        .iter()
        .filter(|(record, sub)| predicate.matches(record.primary_code.as_deref(), *sub))
        .fold(SummaryRow::zero(), |mut row, (record, _)| {
            row.accumulate(record);
            row
        })
}

/// Evaluate every category of a definition in declaration order.
///
/// Each category is computed independently from the table; totals are never
/// derived by adding visible rows.
pub fn assemble(definition: &ReportDefinition, table: &BudgetTable) -> Report {
    let rows: Vec<ReportRow> = definition
        .categories
        .iter()
        .map(|category| ReportRow {
            label: category.label.clone(),
            detail: category.detail.clone(),
            summary: aggregate(table, &category.predicate),
        })
        .collect();

    debug!(
        report = definition.kind.slug(),
        rows = rows.len(),
        records = table.len(),
        "assembled report"
    );

    Report {
        kind: definition.kind,
        title: definition.title.clone(),
        label_header: definition.label_header.clone(),
        detail_columns: definition.detail_columns,
        rows,
        styles: definition.styles.clone(),
        records_scanned: table.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Measure, Record, ReportKind, RowStyle};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const OBJ: &str = "O23011722012024016903071030";

    fn table() -> BudgetTable {
        BudgetTable::new(vec![
            Record::new("1-100-F001")
                .secondary(format!("{OBJ}33"))
                .value(Measure::Disponible, dec!(100)),
            Record::new("1-100-F001")
                .secondary(format!("{OBJ}20"))
                .value(Measure::Disponible, dec!(50))
                .value(Measure::GirosAcumulados, dec!(7)),
            Record::new("2-100-I002").value(Measure::Disponible, dec!(999)),
            Record::new("9-999-X999")
                .secondary(format!("{OBJ}01"))
                .value(Measure::Disponible, dec!(1000)),
        ])
    }

    #[test]
    fn aggregate_sums_matching_records() {
        let p = Predicate::code("1-100-F001").values([33, 34, 35, 20, 1, 2]);
        let row = aggregate(&table(), &p);
        assert_eq!(row.disponible, dec!(150));
        assert_eq!(row.giros_acumulados, dec!(7));
        assert_eq!(row.rp_emitidos, Decimal::ZERO);
    }

    #[test]
    fn forward_filled_record_is_bucketed_with_predecessor() {
        // the I002 row inherits sub-code 20
        let p = Predicate::code("2-100-I002").value(20);
        assert_eq!(aggregate(&table(), &p).disponible, dec!(999));
    }

    #[test]
    fn empty_match_is_zero() {
        let p = Predicate::code("1-100-F001").value(64);
        assert!(aggregate(&table(), &p).is_zero());
        assert!(aggregate(&BudgetTable::default(), &p).is_zero());
    }

    #[test]
    fn assemble_preserves_order_and_styles() {
        let def = ReportDefinition::new(ReportKind::RpTotal, "T", "OBJETO")
            .line("B", Predicate::code("1-100-F001").value(20))
            .line("A", Predicate::code("1-100-F001").value(33))
            .subtotal(
                "AB",
                Predicate::code("1-100-F001").values([20, 33]),
                RowStyle::Subtotal,
                &["B", "A"],
            );
        let report = assemble(&def, &table());

        let labels: Vec<&str> = report.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["B", "A", "AB"]);
        assert_eq!(report.row("AB").unwrap().summary.disponible, dec!(150));
        assert_eq!(report.style_of("AB"), RowStyle::Subtotal);
        assert_eq!(report.records_scanned, 4);
    }
}
