//! Excel workbook renderer
//!
//! One worksheet per non-empty report:
//!
//! ```text
//! Sheet: TOTAL_DOCENTES
//! | OBJETO        | DISPONIBLE | RP EMITIDOS | GIROS ACUMULADOS | ... |
//! |---------------|------------|-------------|------------------|-----|
//! | SUELDO BÁSICO | $1.234.568 | $1.000      | $0               | ... |
//! | SUELDOS       | ...        (flagged: red fill, white bold)       |
//! ```
//!
//! Row 1 is the header. Unflagged rows alternate `#F9F9F9` / white; flagged
//! rows use their flag color with a white bold font.

use nomina_core::{Measure, RenderError, Renderer, Report, RowStyle};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::{debug, warn};

use crate::{column_headers, flag_fill, format_amount, row_fill, HEADER_FILL};

const AMOUNT_FORMAT: &str = "\"$\"#,##0";
const AMOUNT_FONT: &str = "Courier New";
const WHITE: u32 = 0xFF_FFFF;
const BLACK: u32 = 0x00_0000;
const MAX_SHEET_NAME: usize = 31;

/// Excel report renderer
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Upper bound for any column width
    pub max_column_width: usize,
    /// Lower bound for `NOMBRE` / `CONCEPTO` columns
    pub text_column_min_width: usize,
    /// Maximum worksheet name length
    pub sheet_name_limit: usize,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            max_column_width: 50,
            text_column_min_width: 30,
            sheet_name_limit: 31,
        }
    }
}

/// Formats for one data row
struct RowFormats {
    label: Format,
    text: Format,
    amount: Format,
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_column_width(mut self, width: usize) -> Self {
        self.max_column_width = width;
        self
    }

    pub fn text_column_min_width(mut self, width: usize) -> Self {
        self.text_column_min_width = width;
        self
    }

    pub fn sheet_name_limit(mut self, limit: usize) -> Self {
        self.sheet_name_limit = limit;
        self
    }

    /// Effective name length: at least one character, at most Excel's 31
    fn name_limit(&self) -> usize {
        self.sheet_name_limit.clamp(1, MAX_SHEET_NAME)
    }

    /// Worksheet name for a report, truncated to the limit
    pub fn sheet_name(&self, report: &Report) -> String {
        report.sheet_name().chars().take(self.name_limit()).collect()
    }

    /// Names of the sheets written for `reports`, one per non-empty report.
    ///
    /// A truncated name that collides with an earlier one gets a numeric
    /// suffix (`PRI`, `PR2`, `PR3`) so the workbook stays valid.
    pub fn sheet_names(&self, reports: &[Report]) -> Vec<String> {
        let limit = self.name_limit();
        let mut names: Vec<String> = Vec::new();
        for report in reports.iter().filter(|r| !r.is_empty()) {
            let base = self.sheet_name(report);
            let mut name = base.clone();
            let mut n = 2;
            while names.contains(&name) {
                let suffix = n.to_string();
                let keep = limit.saturating_sub(suffix.len());
                name = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
                n += 1;
            }
            names.push(name);
        }
        names
    }

    /// Width of each column: longest displayed value + 2, capped; free-text
    /// columns get a floor
    pub fn column_widths(&self, report: &Report) -> Vec<usize> {
        let headers = column_headers(report);
        let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

        for row in &report.rows {
            let mut cells: Vec<usize> = vec![row.label.chars().count()];
            if report.detail_columns {
                cells.push(row.nombre().chars().count());
                cells.push(row.concepto().chars().count());
            }
            cells.extend(
                Measure::ALL
                    .iter()
                    .map(|m| format_amount(row.summary.get(*m)).chars().count()),
            );
            for (width, len) in widths.iter_mut().zip(cells) {
                *width = (*width).max(len);
            }
        }

        widths
            .into_iter()
            .enumerate()
            .map(|(col, len)| {
                let width = (len + 2).min(self.max_column_width);
                if report.detail_columns && (col == 1 || col == 2) {
                    width.max(self.text_column_min_width)
                } else {
                    width
                }
            })
            .collect()
    }

    /// Generate workbook bytes
    pub fn render_to_bytes(&self, reports: &[Report]) -> Result<Vec<u8>, RenderError> {
        let mut workbook = Workbook::new();

        for report in reports.iter().filter(|r| r.is_empty()) {
            warn!(report = %report.kind, "no rows, skipping sheet");
        }
        let populated = reports.iter().filter(|r| !r.is_empty());
        let names = self.sheet_names(reports);
        if names.is_empty() {
            return Err(RenderError::InvalidData("No report has rows to export".into()));
        }

        for (report, name) in populated.zip(&names) {
            let sheet = workbook.add_worksheet();
            sheet
                .set_name(name)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            Self::write_sheet(sheet, report, self.column_widths(report))?;
        }
        let sheets = names.len();

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))?;
        debug!(sheets, bytes = buffer.len(), "rendered workbook");
        Ok(buffer)
    }

    fn header_format() -> Format {
        Format::new()
            .set_bold()
            .set_font_size(11)
            .set_font_color(WHITE)
            .set_background_color(HEADER_FILL)
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(BLACK)
    }

    fn row_formats(style: RowStyle, index: usize) -> RowFormats {
        let fill = row_fill(style, index);
        let base = Format::new()
            .set_background_color(fill)
            .set_border(FormatBorder::Thin)
            .set_border_color(BLACK)
            .set_align(FormatAlign::VerticalCenter);
        let base = if flag_fill(style).is_some() {
            base.set_bold().set_font_color(WHITE)
        } else {
            base
        };

        RowFormats {
            label: base
                .clone()
                .set_font_size(10)
                .set_align(FormatAlign::Left),
            text: base
                .clone()
                .set_font_size(10)
                .set_align(FormatAlign::Left)
                .set_text_wrap(),
            amount: base
                .set_bold()
                .set_font_name(AMOUNT_FONT)
                .set_font_size(10)
                .set_align(FormatAlign::Center)
                .set_num_format(AMOUNT_FORMAT),
        }
    }

    fn write_sheet(
        sheet: &mut Worksheet,
        report: &Report,
        widths: Vec<usize>,
    ) -> Result<(), RenderError> {
        let header = Self::header_format();
        for (col, title) in column_headers(report).iter().enumerate() {
            sheet
                .write_with_format(0, col as u16, *title, &header)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        for (index, row) in report.rows.iter().enumerate() {
            let line = index as u32 + 1;
            let formats = Self::row_formats(report.style_of(&row.label), index);

            sheet
                .write_with_format(line, 0, row.label.as_str(), &formats.label)
                .map_err(|e| RenderError::Format(e.to_string()))?;

            let mut col: u16 = 1;
            if report.detail_columns {
                for text in [row.nombre(), row.concepto()] {
                    sheet
                        .write_with_format(line, col, text, &formats.text)
                        .map_err(|e| RenderError::Format(e.to_string()))?;
                    col += 1;
                }
            }
            for measure in Measure::ALL {
                let amount = row.summary.get(measure).to_f64().unwrap_or_default();
                sheet
                    .write_with_format(line, col, amount, &formats.amount)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
                col += 1;
            }
        }

        for (col, width) in widths.into_iter().enumerate() {
            sheet.set_column_width(col as u16, width as u32).ok();
        }
        sheet.set_freeze_panes(1, 0).ok();
        Ok(())
    }
}

impl Renderer for ExcelRenderer {
    type Output = Vec<u8>;

    fn render(&self, reports: &[Report]) -> Result<Vec<u8>, RenderError> {
        if reports.is_empty() {
            return Err(RenderError::InvalidData("No reports to render".into()));
        }
        self.render_to_bytes(reports)
    }
}
