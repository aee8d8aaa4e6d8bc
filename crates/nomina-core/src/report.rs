//! Report definitions and assembled reports
//!
//! A `ReportDefinition` is the declarative category table for one report
//! kind: an ordered list of labelled predicates plus a separate style lookup
//! consumed only by renderers. Assembling a definition against a
//! `BudgetTable` yields a `Report`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{engine, BudgetTable, Predicate, ReportKind, SummaryRow};

/// Text shown in detail columns of rows without a line detail
pub const NO_DETAIL: &str = "---";

/// Presentational flag attached to a report label
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStyle {
    #[default]
    Normal,
    Subtotal,
    FinalTotal,
    GrandTotal,
}

impl RowStyle {
    pub fn is_flagged(self) -> bool {
        self != RowStyle::Normal
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RowStyle::Normal => "normal",
            RowStyle::Subtotal => "subtotal",
            RowStyle::FinalTotal => "final_total",
            RowStyle::GrandTotal => "grand_total",
        }
    }
}

/// Label → style lookup; unlisted labels are `Normal`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowStyles(BTreeMap<String, RowStyle>);

impl RowStyles {
    pub fn get(&self, label: &str) -> RowStyle {
        self.0.get(label).copied().unwrap_or_default()
    }

    pub fn set(&mut self, label: impl Into<String>, style: RowStyle) {
        let label = label.into();
        if style.is_flagged() {
            self.0.insert(label, style);
        } else {
            self.0.remove(&label);
        }
    }

    /// Flagged labels in lexical order
    pub fn flagged(&self) -> impl Iterator<Item = (&str, RowStyle)> {
        self.0.iter().map(|(label, style)| (label.as_str(), *style))
    }
}

/// Static descriptive text for a budget line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDetail {
    pub nombre: String,
    pub concepto: String,
}

impl LineDetail {
    pub fn new(nombre: impl Into<String>, concepto: impl Into<String>) -> Self {
        Self {
            nombre: nombre.into(),
            concepto: concepto.into(),
        }
    }
}

/// One named category of a report
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryDef {
    pub label: String,
    pub predicate: Predicate,
    pub detail: Option<LineDetail>,
    /// Labels whose predicates this category is the exact union of
    pub parts: Vec<String>,
}

/// Declarative category table for one report kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportDefinition {
    pub kind: ReportKind,
    pub title: String,
    /// Header of the label column (`BOLSILLOS`, `OBJETO`, `CÓDIGO`)
    pub label_header: String,
    /// Whether the report shows `NOMBRE` / `CONCEPTO` columns
    pub detail_columns: bool,
    pub categories: Vec<CategoryDef>,
    pub styles: RowStyles,
}

impl ReportDefinition {
    pub fn new(
        kind: ReportKind,
        title: impl Into<String>,
        label_header: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            label_header: label_header.into(),
            detail_columns: false,
            categories: Vec::new(),
            styles: RowStyles::default(),
        }
    }

    /// Show `NOMBRE` / `CONCEPTO` columns
    pub fn with_detail_columns(mut self) -> Self {
        self.detail_columns = true;
        self
    }

    /// Append a plain category
    pub fn line(mut self, label: impl Into<String>, predicate: Predicate) -> Self {
        self.categories.push(CategoryDef {
            label: label.into(),
            predicate,
            detail: None,
            parts: Vec::new(),
        });
        self
    }

    /// Append a category with descriptive text
    pub fn detailed_line(
        mut self,
        label: impl Into<String>,
        predicate: Predicate,
        detail: LineDetail,
    ) -> Self {
        self.categories.push(CategoryDef {
            label: label.into(),
            predicate,
            detail: Some(detail),
            parts: Vec::new(),
        });
        self
    }

    /// Append a flagged total row that is exactly the union of `parts`,
    /// which must name earlier categories
    pub fn subtotal<P: AsRef<str>>(
        self,
        label: impl Into<String>,
        predicate: Predicate,
        style: RowStyle,
        parts: &[P],
    ) -> Self {
        let parts = parts.iter().map(|p| p.as_ref().to_string()).collect();
        self.flagged(label.into(), predicate, style, parts)
    }

    /// Append a flagged total row whose predicate covers more than the
    /// rows above it
    pub fn total(self, label: impl Into<String>, predicate: Predicate, style: RowStyle) -> Self {
        self.flagged(label.into(), predicate, style, Vec::new())
    }

    fn flagged(
        mut self,
        label: String,
        predicate: Predicate,
        style: RowStyle,
        parts: Vec<String>,
    ) -> Self {
        self.styles.set(label.clone(), style);
        self.categories.push(CategoryDef {
            label,
            predicate,
            detail: None,
            parts,
        });
        self
    }

    pub fn category(&self, label: &str) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.label.as_str())
    }

    /// Check label uniqueness and that every part names an earlier category
    pub fn validate(&self) -> Result<(), String> {
        for (i, category) in self.categories.iter().enumerate() {
            let earlier = &self.categories[..i];
            if earlier.iter().any(|c| c.label == category.label) {
                return Err(format!("duplicate label '{}'", category.label));
            }
            for part in &category.parts {
                if !earlier.iter().any(|c| &c.label == part) {
                    return Err(format!(
                        "'{}' lists unknown or later part '{}'",
                        category.label, part
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn assemble(&self, table: &BudgetTable) -> Report {
        engine::assemble(self, table)
    }
}

/// One row of an assembled report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<LineDetail>,
    pub summary: SummaryRow,
}

impl ReportRow {
    pub fn nombre(&self) -> &str {
        self.detail.as_ref().map_or(NO_DETAIL, |d| d.nombre.as_str())
    }

    pub fn concepto(&self) -> &str {
        self.detail.as_ref().map_or(NO_DETAIL, |d| d.concepto.as_str())
    }
}

/// Ordered summary table produced by one report generation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub kind: ReportKind,
    pub title: String,
    pub label_header: String,
    pub detail_columns: bool,
    pub rows: Vec<ReportRow>,
    pub styles: RowStyles,
    /// Number of source records scanned
    pub records_scanned: usize,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, label: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    pub fn style_of(&self, label: &str) -> RowStyle {
        self.styles.get(label)
    }

    pub fn sheet_name(&self) -> &'static str {
        self.kind.sheet_name()
    }
}
