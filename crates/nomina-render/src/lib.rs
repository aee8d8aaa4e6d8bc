//! # nomina-render
//!
//! Rendering backends for assembled reports.
//!
//! This crate provides:
//! - Excel workbooks, one sheet per report (`ExcelRenderer`)
//! - A standalone HTML dashboard page (`HtmlRenderer`)
//! - Aligned plain-text tables for the terminal (`TextRenderer`)
//! - JSON for machine consumption (`JsonRenderer`)
//!
//! All renderers share the row-banding palette and the amount display rule
//! defined here.
//!
//! ## Example
//!
//! ```rust,ignore
//! use nomina_core::{catalog, Renderer, ReportKind};
//! use nomina_render::{ExcelRenderer, HtmlRenderer};
//!
//! let report = catalog::definition(ReportKind::RpTotal).assemble(&table);
//!
//! let xlsx_bytes = ExcelRenderer::new().render(&[report.clone()])?;
//! std::fs::write("RP_TOTAL_DOCENTES.xlsx", xlsx_bytes)?;
//!
//! let html = HtmlRenderer::new().title("Recursos propios").render(&[report])?;
//! ```

pub mod excel;
pub mod html;

pub use excel::ExcelRenderer;
pub use html::HtmlRenderer;

use nomina_core::{Measure, RenderError, Renderer, Report, RowStyle};
use rust_decimal::{Decimal, RoundingStrategy};

// ============================================================================
// Palette
// ============================================================================

/// Header row fill
pub const HEADER_FILL: u32 = 0x8B_0000;
/// Even unflagged data rows
pub const BAND_EVEN_FILL: u32 = 0xF9_F9F9;
/// Odd unflagged data rows
pub const BAND_ODD_FILL: u32 = 0xFF_FFFF;

/// Fill color of a flagged row
pub fn flag_fill(style: RowStyle) -> Option<u32> {
    match style {
        RowStyle::Normal => None,
        RowStyle::Subtotal => Some(0xFF_6B6B),
        RowStyle::FinalTotal => Some(0x4C_AF50),
        RowStyle::GrandTotal => Some(0x21_96F3),
    }
}

/// Fill color of data row `index` (0-based)
pub fn row_fill(style: RowStyle, index: usize) -> u32 {
    flag_fill(style).unwrap_or(if index % 2 == 0 {
        BAND_EVEN_FILL
    } else {
        BAND_ODD_FILL
    })
}

// ============================================================================
// Amounts
// ============================================================================

/// Display text for an amount: `$` and the integer part rounded half-to-even,
/// grouped with `.` (`$1.234.568`, `$-1.234`)
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    let digits = rounded.abs().trunc().to_string();
    let grouped = group_thousands(&digits, '.');
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("$-{grouped}")
    } else {
        format!("${grouped}")
    }
}

fn group_thousands(digits: &str, sep: char) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

/// Column headers of a report, in display order
pub fn column_headers(report: &Report) -> Vec<&str> {
    let mut headers = vec![report.label_header.as_str()];
    if report.detail_columns {
        headers.extend(["NOMBRE", "CONCEPTO"]);
    }
    headers.extend(Measure::ALL.iter().map(|m| m.column()));
    headers
}

/// Truncate a string with ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!(
            "{}…",
            s.chars().take(max.saturating_sub(1)).collect::<String>()
        )
    }
}

/// Source records behind a set of reports assembled from one table
pub fn records_loaded(reports: &[Report]) -> usize {
    reports.iter().map(|r| r.records_scanned).max().unwrap_or(0)
}

// ============================================================================
// Text
// ============================================================================

/// Aligned plain-text tables
#[derive(Clone, Debug)]
pub struct TextRenderer {
    /// Maximum width of `NOMBRE` / `CONCEPTO` cells
    pub detail_width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self { detail_width: 40 }
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn detail_width(mut self, width: usize) -> Self {
        self.detail_width = width;
        self
    }

    fn marker(style: RowStyle) -> &'static str {
        match style {
            RowStyle::Normal => "",
            RowStyle::Subtotal => "*",
            RowStyle::FinalTotal => "**",
            RowStyle::GrandTotal => "***",
        }
    }

    fn render_report(&self, report: &Report, out: &mut String) {
        out.push_str(&report.title);
        out.push('\n');
        out.push_str(&"=".repeat(report.title.chars().count()));
        out.push('\n');

        if report.is_empty() {
            out.push_str("No hay datos para mostrar\n");
            return;
        }

        let headers = column_headers(report);
        let mut table: Vec<Vec<String>> = Vec::with_capacity(report.rows.len() + 1);
        let mut header_row = vec![String::new()];
        header_row.extend(headers.iter().map(|h| (*h).to_string()));
        table.push(header_row);

        for row in &report.rows {
            let mut cells = vec![Self::marker(report.style_of(&row.label)).to_string()];
            cells.push(row.label.clone());
            if report.detail_columns {
                cells.push(truncate(row.nombre(), self.detail_width));
                cells.push(truncate(row.concepto(), self.detail_width));
            }
            cells.extend(Measure::ALL.iter().map(|m| format_amount(row.summary.get(*m))));
            table.push(cells);
        }

        let columns = table[0].len();
        let widths: Vec<usize> = (0..columns)
            .map(|col| {
                table
                    .iter()
                    .map(|cells| cells[col].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let first_amount = columns - Measure::ALL.len();

        for cells in &table {
            let line: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(col, cell)| {
                    if col >= first_amount {
                        format!("{:>width$}", cell, width = widths[col])
                    } else {
                        format!("{:<width$}", cell, width = widths[col])
                    }
                })
                .collect();
            out.push_str(line.join("  ").trim_end());
            out.push('\n');
        }
    }
}

impl Renderer for TextRenderer {
    type Output = String;

    fn render(&self, reports: &[Report]) -> Result<String, RenderError> {
        if reports.is_empty() {
            return Err(RenderError::InvalidData("No reports to render".into()));
        }
        let mut out = String::new();
        for (i, report) in reports.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            self.render_report(report, &mut out);
        }
        out.push_str(&format!("\n{} registros cargados\n", records_loaded(reports)));
        Ok(out)
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Pretty-printed JSON array of reports
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, reports: &[Report]) -> Result<String, RenderError> {
        serde_json::to_string_pretty(reports).map_err(|e| RenderError::Format(e.to_string()))
    }
}
