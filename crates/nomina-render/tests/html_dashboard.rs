//! Integration tests for the HTML dashboard

use nomina_core::catalog::{self, object_code, RP, SGP_I001, SGP_I002};
use nomina_core::{BudgetTable, Measure, Record, Renderer, Report, Screen};
use nomina_render::html::NO_DATA;
use nomina_render::HtmlRenderer;
use rust_decimal_macros::dec;

fn screen(screen: Screen) -> Vec<Report> {
    let table = BudgetTable::new(vec![
        Record::new(SGP_I002)
            .secondary(object_code(1, 5))
            .value(Measure::Disponible, dec!(10000)),
        Record::new(SGP_I001)
            .secondary(object_code(3, 60))
            .value(Measure::Disponible, dec!(2000)),
        Record::new(RP)
            .secondary(object_code(3, 64))
            .value(Measure::Disponible, dec!(300)),
    ]);
    screen
        .reports()
        .iter()
        .map(|kind| catalog::definition(*kind).assemble(&table))
        .collect()
}

#[test]
fn por_fuente_screen_marks_totals() {
    let html = HtmlRenderer::new()
        .title(Screen::PorFuente.title())
        .render(&screen(Screen::PorFuente))
        .unwrap();

    assert!(html.contains("TABLA RESUMEN EJECUCIÓN PRESUPUESTAL"));
    assert!(html.contains("<th>BOLSILLOS</th>"));
    assert!(html.contains(
        "<tr class=\"fila-total-general\"><td class=\"encabezado-fila\">TOTAL_GENERAL</td><td class=\"numero\">$12.300</td>"
    ));
    assert!(html.contains(
        "<tr class=\"fila-total-final\"><td class=\"encabezado-fila\">TOTAL_SGP_P8033</td><td class=\"numero\">$12.000</td>"
    ));
}

#[test]
fn labels_are_escaped() {
    let html = HtmlRenderer::new()
        .render(&screen(Screen::PorFuente))
        .unwrap();
    assert!(html.contains(
        "<td class=\"encabezado-fila\">SGP CSF (Salarios + Parafiscales)</td><td class=\"numero\">$10.000</td>"
    ));

    let mut reports = screen(Screen::PorFuente);
    reports[0].rows[0].label = "A<B & \"C\"".into();
    let html = HtmlRenderer::new().render(&reports).unwrap();
    assert!(html.contains("A&lt;B &amp; &quot;C&quot;"));
}

#[test]
fn recursos_propios_screen_has_four_tables() {
    let html = HtmlRenderer::new()
        .render(&screen(Screen::RecursosPropios))
        .unwrap();
    assert_eq!(html.matches("<table class=\"tabla-reporte\">").count(), 4);
    assert!(html.contains("EJECUCIÓN PRESUPUESTAL DOCENTES ORIENTADORES RP"));
    assert!(html.contains("EJECUCIÓN PRESUPUESTAL DOCENTES PRIMARIA BÁSICA MEDIA RP"));
}

#[test]
fn empty_report_shows_notice() {
    let mut reports = screen(Screen::RecursosPropios);
    reports[2].rows.clear();
    let html = HtmlRenderer::new().render(&reports).unwrap();
    assert!(html.contains(NO_DATA));
    assert_eq!(html.matches("<table class=\"tabla-reporte\">").count(), 3);
}
