//! HTML dashboard renderer
//!
//! Produces a standalone page with one titled table per report. Row classes
//! carry the banding and flag colors so the page needs no script.

use chrono::{DateTime, Utc};
use nomina_core::{Measure, RenderError, Renderer, Report, RowStyle};
use tracing::warn;

use crate::{column_headers, format_amount, records_loaded};

/// Notice shown in place of an empty table
pub const NO_DATA: &str = "No hay datos para mostrar";

/// Standalone HTML dashboard renderer
#[derive(Clone, Debug)]
pub struct HtmlRenderer {
    /// Page title
    pub title: String,
    /// Time the underlying data was fetched
    pub fetched_at: Option<DateTime<Utc>>,
    /// Banner shown above the tables (e.g. stale-data warning)
    pub notice: Option<String>,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self {
            title: "Ejecución presupuestal".into(),
            fetched_at: None,
            notice: None,
        }
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn fetched_at(mut self, at: DateTime<Utc>) -> Self {
        self.fetched_at = Some(at);
        self
    }

    pub fn notice(mut self, notice: impl Into<String>) -> Self {
        self.notice = Some(notice.into());
        self
    }

    /// CSS class of data row `index` (0-based)
    pub fn row_class(style: RowStyle, index: usize) -> &'static str {
        match style {
            RowStyle::Subtotal => "fila-total",
            RowStyle::FinalTotal => "fila-total-final",
            RowStyle::GrandTotal => "fila-total-general",
            RowStyle::Normal if index % 2 == 0 => "fila-par",
            RowStyle::Normal => "fila-impar",
        }
    }

    fn generate_table(report: &Report) -> String {
        if report.is_empty() {
            warn!(report = %report.kind, "no rows to display");
            return format!("      <p class=\"sin-datos\">{NO_DATA}</p>\n");
        }

        let mut html = String::from("      <table class=\"tabla-reporte\">\n        <thead><tr>");
        for header in column_headers(report) {
            html.push_str(&format!("<th>{}</th>", html_escape(header)));
        }
        html.push_str("</tr></thead>\n        <tbody>\n");

        for (index, row) in report.rows.iter().enumerate() {
            let class = Self::row_class(report.style_of(&row.label), index);
            html.push_str(&format!(
                "          <tr class=\"{class}\"><td class=\"encabezado-fila\">{}</td>",
                html_escape(&row.label)
            ));
            if report.detail_columns {
                for text in [row.nombre(), row.concepto()] {
                    html.push_str(&format!(
                        "<td class=\"texto-reducido\">{}</td>",
                        html_escape(text)
                    ));
                }
            }
            for measure in Measure::ALL {
                html.push_str(&format!(
                    "<td class=\"numero\">{}</td>",
                    html_escape(&format_amount(row.summary.get(measure)))
                ));
            }
            html.push_str("</tr>\n");
        }

        html.push_str("        </tbody>\n      </table>\n");
        html
    }

    fn generate_html(&self, reports: &[Report]) -> String {
        let sections: String = reports
            .iter()
            .map(|report| {
                format!(
                    "    <section class=\"reporte\">\n      <h2>{}</h2>\n{}    </section>\n",
                    html_escape(&report.title),
                    Self::generate_table(report)
                )
            })
            .collect();

        let loaded = format!("{} registros cargados", records_loaded(reports));
        let updated = match self.fetched_at {
            Some(at) => format!(
                "    <p class=\"actualizado\">Datos actualizados: {} · {loaded}</p>\n",
                at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => format!("    <p class=\"actualizado\">{loaded}</p>\n"),
        };
        let notice = self
            .notice
            .as_deref()
            .map(|n| format!("    <p class=\"aviso\">{}</p>\n", html_escape(n)))
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
  <main class="contenedor">
    <h1>{title}</h1>
{notice}{updated}{sections}  </main>
</body>
</html>
"#,
            title = html_escape(&self.title),
            css = CSS,
        )
    }
}

impl Renderer for HtmlRenderer {
    type Output = String;

    fn render(&self, reports: &[Report]) -> Result<String, RenderError> {
        if reports.is_empty() {
            return Err(RenderError::InvalidData("No reports to render".into()));
        }
        Ok(self.generate_html(reports))
    }
}

/// HTML-escape a string
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const CSS: &str = r#"        body { font-family: Arial, Helvetica, sans-serif; background: #f4f4f4; color: #222; margin: 0; }
        .contenedor { max-width: 1400px; margin: 0 auto; padding: 24px; }
        h1 { color: #8B0000; }
        h2 { color: #8B0000; font-size: 1.1em; margin-top: 32px; }
        .aviso { background: #FFF3CD; border: 1px solid #E0B252; padding: 8px 12px; }
        .actualizado { color: #666; font-size: 0.85em; }
        .sin-datos { color: #666; font-style: italic; }
        .tabla-reporte { border-collapse: collapse; width: 100%; background: #fff; }
        .tabla-reporte th { background: #8B0000; color: #fff; font-weight: bold; font-size: 11pt; padding: 8px; border: 1px solid #000; text-align: center; }
        .tabla-reporte td { border: 1px solid #000; padding: 6px 8px; font-size: 10pt; }
        .encabezado-fila { text-align: left; font-weight: bold; }
        .texto-reducido { text-align: left; font-size: 9pt; max-width: 320px; }
        .numero { text-align: center; font-family: 'Courier New', monospace; font-weight: bold; white-space: nowrap; }
        .fila-par { background: #F9F9F9; }
        .fila-impar { background: #FFFFFF; }
        .fila-total { background: #FF6B6B; color: #fff; font-weight: bold; }
        .fila-total-final { background: #4CAF50; color: #fff; font-weight: bold; }
        .fila-total-general { background: #2196F3; color: #fff; font-weight: bold; }"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::sample_report;
    use nomina_core::ReportKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn html_escape_works() {
        assert_eq!(html_escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn row_classes() {
        assert_eq!(HtmlRenderer::row_class(RowStyle::Normal, 0), "fila-par");
        assert_eq!(HtmlRenderer::row_class(RowStyle::Normal, 1), "fila-impar");
        assert_eq!(HtmlRenderer::row_class(RowStyle::Subtotal, 2), "fila-total");
        assert_eq!(HtmlRenderer::row_class(RowStyle::FinalTotal, 0), "fila-total-final");
        assert_eq!(HtmlRenderer::row_class(RowStyle::GrandTotal, 1), "fila-total-general");
    }

    #[test]
    fn page_structure() {
        let html = HtmlRenderer::new()
            .title("Recursos propios")
            .render(&[sample_report(ReportKind::RpTotal)])
            .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Recursos propios</title>"));
        assert!(html.contains("<th>OBJETO</th>"));
        assert!(html.contains(
            "<tr class=\"fila-par\"><td class=\"encabezado-fila\">SUELDO BÁSICO</td>"
        ));
        assert!(html.contains(
            "<tr class=\"fila-total\"><td class=\"encabezado-fila\">SUELDOS</td>"
        ));
        assert!(html.contains("<td class=\"numero\">$1.234.668</td>"));
        assert!(!html.contains(NO_DATA));
        assert!(html.contains("<p class=\"actualizado\">2 registros cargados</p>"));
    }

    #[test]
    fn detail_columns_render_text_cells() {
        let html = HtmlRenderer::new()
            .render(&[sample_report(ReportKind::Orientadores)])
            .unwrap();
        assert!(html.contains("<th>NOMBRE</th><th>CONCEPTO</th>"));
        assert!(html.contains(
            "<td class=\"texto-reducido\">Pago de Personal Docente orientadores</td>"
        ));
        assert!(html.contains("<td class=\"texto-reducido\">---</td>"));
    }

    #[test]
    fn notice_and_timestamp_are_shown() {
        use chrono::TimeZone;
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 14, 5, 0).unwrap();
        let html = HtmlRenderer::new()
            .fetched_at(at)
            .notice("Datos <anteriores>")
            .render(&[sample_report(ReportKind::PorFuente)])
            .unwrap();
        assert!(html.contains(
            "Datos actualizados: 2026-03-01 14:05:00 UTC · 2 registros cargados"
        ));
        assert!(html.contains("Datos &lt;anteriores&gt;"));
    }
}
