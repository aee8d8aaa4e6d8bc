//! # nomina-core
//!
//! Core domain model for payroll budget-execution reports.
//!
//! This crate provides:
//! - Domain types: `Record`, `BudgetTable`, `SummaryRow`, `Report`
//! - The sub-code extractor and forward-fill rule
//! - The predicate catalog for every report kind
//! - The aggregation engine (`aggregate`, `assemble`)
//! - The `Renderer` trait and error types
//!
//! ## Example
//!
//! ```rust
//! use nomina_core::{catalog, BudgetTable, ReportKind};
//! use rust_decimal::Decimal;
//!
//! let headers = [
//!     "Codigo",
//!     "DISPONIBLE",
//!     "RP EMITIDOS",
//!     "GIROS ACUMULADOS",
//!     "SALDO DE APROPIACION",
//!     "RECURSOS SIN EJECUTAR",
//! ];
//! let rows = vec![
//!     vec!["O2301172201202401690307101001", "", "", "", "", ""],
//!     vec!["1-100-F001", "100", "80", "50", "20", "0"],
//! ];
//! let table = BudgetTable::from_rows(&headers, rows).unwrap();
//!
//! let report = catalog::definition(ReportKind::PrimeraInfancia).assemble(&table);
//! assert_eq!(report.rows[0].summary.disponible, Decimal::from(100));
//! ```

pub mod catalog;
pub mod engine;
pub mod predicate;
pub mod report;
pub mod table;

pub use catalog::{ReportKind, Screen, UnknownName};
pub use engine::{aggregate, assemble};
pub use predicate::{Predicate, SubCodeFilter};
pub use report::{
    CategoryDef, LineDetail, Report, ReportDefinition, ReportRow, RowStyle, RowStyles,
};
pub use table::{parse_amount, BudgetTable};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// Trailing two-digit bucket key derived from a secondary identifier
pub type SubCode = i32;

// ============================================================================
// Measures
// ============================================================================

/// One of the five numeric measures carried by every budget line
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Measure {
    /// Available appropriation
    Disponible,
    /// Committed resources (RP issued)
    RpEmitidos,
    /// Accumulated disbursements
    GirosAcumulados,
    /// Remaining appropriation balance
    SaldoApropiacion,
    /// Unexecuted resources
    RecursosSinEjecutar,
}

impl Measure {
    /// All measures in display order
    pub const ALL: [Measure; 5] = [
        Measure::Disponible,
        Measure::RpEmitidos,
        Measure::GirosAcumulados,
        Measure::SaldoApropiacion,
        Measure::RecursosSinEjecutar,
    ];

    /// Column name in the source table (also used as display header)
    pub fn column(self) -> &'static str {
        match self {
            Measure::Disponible => "DISPONIBLE",
            Measure::RpEmitidos => "RP EMITIDOS",
            Measure::GirosAcumulados => "GIROS ACUMULADOS",
            Measure::SaldoApropiacion => "SALDO DE APROPIACION",
            Measure::RecursosSinEjecutar => "RECURSOS SIN EJECUTAR",
        }
    }

    /// Position in [`Measure::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

// ============================================================================
// Record
// ============================================================================

/// One row of the source table
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Funding instrument / document type (`Codigo`)
    pub primary_code: Option<String>,
    /// Object code this row belongs to (`Codigo_O`), forward-filled
    pub secondary_id: Option<String>,
    /// Measure values in [`Measure::ALL`] order; `None` is a missing cell
    pub values: [Option<Decimal>; 5],
}

impl Record {
    /// Create a record with the given primary code and no values
    pub fn new(primary_code: impl Into<String>) -> Self {
        Self {
            primary_code: Some(primary_code.into()),
            ..Self::default()
        }
    }

    /// Set the secondary identifier
    pub fn secondary(mut self, secondary_id: impl Into<String>) -> Self {
        self.secondary_id = Some(secondary_id.into());
        self
    }

    /// Set one measure value
    pub fn value(mut self, measure: Measure, amount: impl Into<Decimal>) -> Self {
        self.values[measure.index()] = Some(amount.into());
        self
    }

    /// Get one measure value (`None` when the cell was missing)
    pub fn get(&self, measure: Measure) -> Option<Decimal> {
        self.values[measure.index()]
    }

    /// Sub-code of this record's secondary identifier
    pub fn sub_code(&self) -> Option<SubCode> {
        sub_code(self.secondary_id.as_deref())
    }
}

/// Extract the sub-code from a secondary identifier.
///
/// Takes the last two characters, parses them as an integer and returns
/// `None` for absent or non-numeric input. Never fails.
pub fn sub_code(secondary_id: Option<&str>) -> Option<SubCode> {
    let value = secondary_id?;
    let count = value.chars().count();
    let tail: String = value.chars().skip(count.saturating_sub(2)).collect();
    tail.trim().parse().ok()
}

/// Carry the last present value forward over absent ones.
pub fn forward_fill<I>(values: I) -> Vec<Option<String>>
where
    I: IntoIterator<Item = Option<String>>,
{
    let mut last: Option<String> = None;
    values
        .into_iter()
        .map(|value| {
            if value.is_some() {
                last = value;
            }
            last.clone()
        })
        .collect()
}

// ============================================================================
// Summary Row
// ============================================================================

/// Sum of the five measures over the records matching one category
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "DISPONIBLE")]
    pub disponible: Decimal,
    #[serde(rename = "RP EMITIDOS")]
    pub rp_emitidos: Decimal,
    #[serde(rename = "GIROS ACUMULADOS")]
    pub giros_acumulados: Decimal,
    #[serde(rename = "SALDO DE APROPIACION")]
    pub saldo_apropiacion: Decimal,
    #[serde(rename = "RECURSOS SIN EJECUTAR")]
    pub recursos_sin_ejecutar: Decimal,
}

impl SummaryRow {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, measure: Measure) -> Decimal {
        match measure {
            Measure::Disponible => self.disponible,
            Measure::RpEmitidos => self.rp_emitidos,
            Measure::GirosAcumulados => self.giros_acumulados,
            Measure::SaldoApropiacion => self.saldo_apropiacion,
            Measure::RecursosSinEjecutar => self.recursos_sin_ejecutar,
        }
    }

    fn slot_mut(&mut self, measure: Measure) -> &mut Decimal {
        match measure {
            Measure::Disponible => &mut self.disponible,
            Measure::RpEmitidos => &mut self.rp_emitidos,
            Measure::GirosAcumulados => &mut self.giros_acumulados,
            Measure::SaldoApropiacion => &mut self.saldo_apropiacion,
            Measure::RecursosSinEjecutar => &mut self.recursos_sin_ejecutar,
        }
    }

    /// Add a record's values; missing cells count as zero
    pub fn accumulate(&mut self, record: &Record) {
        for measure in Measure::ALL {
            if let Some(amount) = record.get(measure) {
                *self.slot_mut(measure) += amount;
            }
        }
    }

    pub fn is_zero(&self) -> bool {
        Measure::ALL.iter().all(|m| self.get(*m).is_zero())
    }
}

impl std::ops::AddAssign<&SummaryRow> for SummaryRow {
    fn add_assign(&mut self, rhs: &SummaryRow) {
        for measure in Measure::ALL {
            *self.slot_mut(measure) += rhs.get(measure);
        }
    }
}

impl<'a> std::iter::Sum<&'a SummaryRow> for SummaryRow {
    fn sum<I: Iterator<Item = &'a SummaryRow>>(iter: I) -> Self {
        iter.fold(SummaryRow::zero(), |mut acc, row| {
            acc += row;
            acc
        })
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render one or more assembled reports to the output format
    fn render(&self, reports: &[Report]) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Table construction error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn sub_code_takes_last_two_characters() {
        assert_eq!(sub_code(Some("O2301172201202401690307101001")), Some(1));
        assert_eq!(sub_code(Some("O2301172201202401690307103057")), Some(57));
        assert_eq!(sub_code(Some("7")), Some(7));
        // any string works, not only object codes
        assert_eq!(sub_code(Some("1-100-F001")), Some(1));
    }

    #[test]
    fn sub_code_missing_for_absent_or_non_numeric() {
        assert_eq!(sub_code(None), None);
        assert_eq!(sub_code(Some("")), None);
        assert_eq!(sub_code(Some("O23011722AB")), None);
        assert_eq!(sub_code(Some("1-100-F00X")), None);
    }

    #[test]
    fn sub_code_counts_characters_not_bytes() {
        assert_eq!(sub_code(Some("CÓDIGO12")), Some(12));
        assert_eq!(sub_code(Some("Ó1")), None);
    }

    #[test]
    fn forward_fill_carries_last_value() {
        let filled = forward_fill(vec![
            None,
            Some("A".to_string()),
            None,
            None,
            Some("B".to_string()),
            None,
        ]);
        assert_eq!(
            filled,
            vec![
                None,
                Some("A".to_string()),
                Some("A".to_string()),
                Some("A".to_string()),
                Some("B".to_string()),
                Some("B".to_string()),
            ]
        );
    }

    #[test]
    fn accumulate_treats_missing_as_zero() {
        let record = Record::new("1-100-F001")
            .value(Measure::Disponible, dec!(100))
            .value(Measure::RpEmitidos, dec!(40));
        let mut row = SummaryRow::zero();
        row.accumulate(&record);
        row.accumulate(&record);

        assert_eq!(row.disponible, dec!(200));
        assert_eq!(row.rp_emitidos, dec!(80));
        assert_eq!(row.giros_acumulados, Decimal::ZERO);
    }

    #[test]
    fn summary_rows_sum() {
        let a = SummaryRow {
            disponible: dec!(1.5),
            ..SummaryRow::zero()
        };
        let b = SummaryRow {
            disponible: dec!(2),
            recursos_sin_ejecutar: dec!(3),
            ..SummaryRow::zero()
        };
        let total: SummaryRow = [a, b].iter().sum();
        assert_eq!(total.disponible, dec!(3.5));
        assert_eq!(total.recursos_sin_ejecutar, dec!(3));
        assert!(!total.is_zero());
        assert!(SummaryRow::zero().is_zero());
    }

    #[test]
    fn measure_columns_in_order() {
        let columns: Vec<&str> = Measure::ALL.iter().map(|m| m.column()).collect();
        assert_eq!(
            columns,
            vec![
                "DISPONIBLE",
                "RP EMITIDOS",
                "GIROS ACUMULADOS",
                "SALDO DE APROPIACION",
                "RECURSOS SIN EJECUTAR",
            ]
        );
        assert_eq!(Measure::SaldoApropiacion.index(), 3);
    }

    #[test]
    fn table_error_lists_columns() {
        let err = TableError::MissingColumns(vec!["Codigo".into(), "DISPONIBLE".into()]);
        assert_eq!(err.to_string(), "missing required columns: Codigo, DISPONIBLE");
    }
}
