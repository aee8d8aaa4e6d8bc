//! Predicate catalog
//!
//! Static category tables for every report kind. Each report is a value
//! built from these tables; nothing here touches data.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{LineDetail, Predicate, ReportDefinition, RowStyle, SubCode};

// ============================================================================
// Primary Codes
// ============================================================================

/// Own resources (Recursos Propios)
pub const RP: &str = "1-100-F001";

/// General participation system, instrument I001
pub const SGP_I001: &str = "2-100-I001";

/// General participation system, instrument I002
pub const SGP_I002: &str = "2-100-I002";

/// Common prefix of every payroll object code
pub const OBJECT_CODE_PREFIX: &str = "O23011722012024016903071";

/// Full object code for a segment and sub-code (`...SS0NN`)
pub fn object_code(segment: u8, sub: SubCode) -> String {
    format!("{OBJECT_CODE_PREFIX}{segment:02}0{sub:02}")
}

// ============================================================================
// Report Kinds
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown {what} '{name}' (expected one of: {expected})")]
pub struct UnknownName {
    pub what: &'static str,
    pub name: String,
    pub expected: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    PorFuente,
    RpTotal,
    PrimeraInfancia,
    Orientadores,
    PrimariaBasicaMedia,
}

impl ReportKind {
    pub const ALL: [ReportKind; 5] = [
        ReportKind::PorFuente,
        ReportKind::RpTotal,
        ReportKind::PrimeraInfancia,
        ReportKind::Orientadores,
        ReportKind::PrimariaBasicaMedia,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ReportKind::PorFuente => "por-fuente",
            ReportKind::RpTotal => "rp-total",
            ReportKind::PrimeraInfancia => "primera-infancia",
            ReportKind::Orientadores => "orientadores",
            ReportKind::PrimariaBasicaMedia => "primaria-basica-media",
        }
    }

    /// Worksheet name used for exports
    pub fn sheet_name(self) -> &'static str {
        match self {
            ReportKind::PorFuente => "POR_FUENTE",
            ReportKind::RpTotal => "TOTAL_DOCENTES",
            ReportKind::PrimeraInfancia => "PRIMERA_INFANCIA",
            ReportKind::Orientadores => "ORIENTADORES",
            ReportKind::PrimariaBasicaMedia => "PRIMARIA_BASICA_MEDIA",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ReportKind {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|k| k.slug() == wanted)
            .ok_or_else(|| UnknownName {
                what: "report",
                name: s.to_string(),
                expected: Self::ALL.map(ReportKind::slug).join(", "),
            })
    }
}

/// A dashboard screen groups one or more reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    PorFuente,
    RecursosPropios,
}

impl Screen {
    pub const ALL: [Screen; 2] = [Screen::PorFuente, Screen::RecursosPropios];

    pub fn slug(self) -> &'static str {
        match self {
            Screen::PorFuente => "por-fuente",
            Screen::RecursosPropios => "recursos-propios",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Screen::PorFuente => "Ejecución presupuestal por fuente",
            Screen::RecursosPropios => "Ejecución presupuestal docentes recursos propios",
        }
    }

    pub fn reports(self) -> &'static [ReportKind] {
        match self {
            Screen::PorFuente => &[ReportKind::PorFuente],
            Screen::RecursosPropios => &[
                ReportKind::RpTotal,
                ReportKind::PrimeraInfancia,
                ReportKind::Orientadores,
                ReportKind::PrimariaBasicaMedia,
            ],
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Screen {
    type Err = UnknownName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|k| k.slug() == wanted)
            .ok_or_else(|| UnknownName {
                what: "screen",
                name: s.to_string(),
                expected: Self::ALL.map(Screen::slug).join(", "),
            })
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// Category table for one report kind
pub fn definition(kind: ReportKind) -> ReportDefinition {
    match kind {
        ReportKind::PorFuente => por_fuente(),
        ReportKind::RpTotal => rp_total(),
        ReportKind::PrimeraInfancia => segment_report(&PRIMERA_INFANCIA),
        ReportKind::Orientadores => segment_report(&ORIENTADORES),
        ReportKind::PrimariaBasicaMedia => segment_report(&PRIMARIA_BASICA_MEDIA),
    }
}

/// Every definition, in `ReportKind::ALL` order
pub fn all() -> Vec<ReportDefinition> {
    ReportKind::ALL.into_iter().map(definition).collect()
}

fn rp() -> Predicate {
    Predicate::code(RP)
}

fn sgp() -> Predicate {
    Predicate::codes([SGP_I002, SGP_I001])
}

fn por_fuente() -> ReportDefinition {
    ReportDefinition::new(
        ReportKind::PorFuente,
        "TABLA RESUMEN EJECUCIÓN PRESUPUESTAL",
        "BOLSILLOS",
    )
    .line(
        "SGP CSF (Salarios + Parafiscales)",
        Predicate::code(SGP_I002)
            .range(1..=13)
            .range(20..=29)
            .range(33..=51),
    )
    .line("FOMAG_SSF_Empleado", sgp().values([17, 58, 59]))
    .line(
        "FOMAG_SSF_Patron",
        Predicate::code(SGP_I001).values([18, 19, 60, 61, 62, 63]),
    )
    .line("FOMAG_CSF", Predicate::code(SGP_I002).values([52, 54]))
    .total("TOTAL_DOC_SGP", sgp().range(1..=63), RowStyle::Subtotal)
    .line("ADTIVOS_SGP", Predicate::code(SGP_I002).range(65..=86))
    .total("TOTAL_SGP_P8033", sgp().range(1..=86), RowStyle::FinalTotal)
    .line("DOC_RP", rp().range(1..=63))
    .line("ADTIVOS_RP", rp().range(65..=86))
    .line("SENTENCIAS", rp().value(64))
    .subtotal(
        "TOTAL_RP_P8033",
        rp().range(1..=86),
        RowStyle::FinalTotal,
        &["DOC_RP", "ADTIVOS_RP", "SENTENCIAS"],
    )
    .subtotal(
        "TOTAL_GENERAL",
        Predicate::codes([SGP_I002, SGP_I001, RP]).range(1..=86),
        RowStyle::GrandTotal,
        &["TOTAL_SGP_P8033", "TOTAL_RP_P8033"],
    )
}

fn rp_total() -> ReportDefinition {
    const SUELDOS: [(&str, &[SubCode]); 7] = [
        ("SUELDO BÁSICO", &[33, 34, 35, 20, 1, 2]),
        ("HORAS EXTRAS", &[36, 21, 3]),
        ("PRIMA DE SERVICIOS", &[37, 22, 4]),
        ("PRIMA DE VACACIONES", &[38, 23, 5]),
        ("PRIMA DE NAVIDAD", &[39, 24, 6]),
        ("SUBSIDIO DE ALIMENTACIÓN", &[40, 7]),
        ("AUXILIO DE TRANSPORTE", &[41, 8]),
    ];
    const PARAFISCALES: [(&str, &[SubCode]); 5] = [
        ("COMPENSAR", &[42, 43, 25, 9]),
        ("ICBF", &[44, 45, 26, 10]),
        ("ESCUELAS_TECNICAS", &[46, 47, 27, 11]),
        ("SENA", &[48, 49, 28, 12]),
        ("ESAP", &[50, 51, 29, 13]),
    ];
    const FOMAG: [(&str, &[SubCode]); 3] = [
        ("SALUD", &[52, 53, 30, 14]),
        ("PENSION", &[54, 55, 31, 15]),
        ("CESANTIAS", &[56, 57, 32, 16]),
    ];

    fn lines(def: ReportDefinition, table: &[(&str, &[SubCode])]) -> ReportDefinition {
        table.iter().fold(def, |def, (label, codes)| {
            def.line(*label, rp().values(codes.iter().copied()))
        })
    }
    fn labels<'a>(table: &[(&'a str, &[SubCode])]) -> Vec<&'a str> {
        table.iter().map(|(label, _)| *label).collect()
    }

    let def = ReportDefinition::new(
        ReportKind::RpTotal,
        "TABLA RESUMEN EJECUCIÓN PRESUPUESTAL DOCENTES RP",
        "OBJETO",
    );
    let def = lines(def, &SUELDOS).subtotal(
        "SUELDOS",
        rp().range(1..=8).range(20..=24).range(33..=41),
        RowStyle::Subtotal,
        &labels(&SUELDOS),
    );
    let def = lines(def, &PARAFISCALES).subtotal(
        "PARAFISCALES",
        rp().range(42..=51).range(25..=29).range(9..=13),
        RowStyle::FinalTotal,
        &labels(&PARAFISCALES),
    );
    lines(def, &FOMAG)
        .subtotal(
            "FOMAG",
            rp().range(52..=57).range(30..=32).range(14..=16),
            RowStyle::GrandTotal,
            &labels(&FOMAG),
        )
        .total("TOTAL_DOC_RP", rp().range(1..=57), RowStyle::Subtotal)
}

// ============================================================================
// Detailed Segment Reports
// ============================================================================

struct Group {
    label: &'static str,
    codes: RangeInclusive<SubCode>,
    style: RowStyle,
}

struct Segment {
    kind: ReportKind,
    number: u8,
    title: &'static str,
    groups: [Group; 3],
    total: &'static str,
    /// (sub-code, NOMBRE, CONCEPTO)
    lines: &'static [(SubCode, &'static str, &'static str)],
}

impl Segment {
    fn span(&self) -> RangeInclusive<SubCode> {
        *self.groups[0].codes.start()..=*self.groups[2].codes.end()
    }
}

const fn group(label: &'static str, codes: RangeInclusive<SubCode>, style: RowStyle) -> Group {
    Group {
        label,
        codes,
        style,
    }
}

fn segment_report(segment: &Segment) -> ReportDefinition {
    let mut def =
        ReportDefinition::new(segment.kind, segment.title, "CÓDIGO").with_detail_columns();

    for group in &segment.groups {
        let mut parts = Vec::new();
        for (sub, nombre, concepto) in segment.lines {
            if !group.codes.contains(sub) {
                continue;
            }
            let label = object_code(segment.number, *sub);
            def = def.detailed_line(
                label.clone(),
                rp().value(*sub),
                LineDetail::new(*nombre, *concepto),
            );
            parts.push(label);
        }
        def = def.subtotal(
            group.label,
            rp().range(group.codes.clone()),
            group.style,
            &parts,
        );
    }

    let parts: Vec<&str> = segment.groups.iter().map(|g| g.label).collect();
    def.subtotal(
        segment.total,
        rp().range(segment.span()),
        RowStyle::Subtotal,
        &parts,
    )
}

const PRIMERA_INFANCIA: Segment = Segment {
    kind: ReportKind::PrimeraInfancia,
    number: 1,
    title: "EJECUCIÓN PRESUPUESTAL DOCENTES PRIMERA INFANCIA RP",
    groups: [
        group("SUELDOS", 1..=8, RowStyle::Subtotal),
        group("PARAFISCALES", 9..=13, RowStyle::FinalTotal),
        group("FOMAG", 14..=16, RowStyle::GrandTotal),
    ],
    total: "TOTAL_PRIMERA_INFANCIA",
    lines: &[
        (1, "Pago de Personal Docente primera infancia", "O231010100101 Sueldo básico"),
        (2, "Pago de Ascensos en escalafon del Personal", "O231010100101 Sueldo básico"),
        (
            3,
            "Pago de horas extras del personal docente",
            "O231010100102 Horas extras, dominicales, festivos y recargos",
        ),
        (4, "Pago de Personal Docente prima de servicio", "O231010100106 Prima de servicio"),
        (5, "Pago de Personal Docente prima de vacaciones", "O23101010010802 Prima de vacaciones"),
        (6, "Pago de Personal Docente prima de navidad", "O23101010010801 Prima de navidad"),
        (
            7,
            "Pago de Personal Docente subsidio de alimentacion",
            "O231010100104 Subsidio de alimentación",
        ),
        (8, "Pago Auxili de transporte personal docente", "O231010100105 Auxilio de Transporte"),
        (9, "Pago de Aportes para las Cajas de Compen", "O231010200401 Compensar"),
        (10, "Pago de Aportes para el ICBF personal docente", "O2310102006 Aportes al ICBF"),
        (
            11,
            "Pago de Aportes para Institutos Tecnicos",
            "O2310102009 Aportes a escuelas industriales e institutos técnicos",
        ),
        (12, "Pago de Aportes para el SENA personal docentes", "O2310102007 Aportes al SENA"),
        (13, "Pago de Aportes para la ESAP personal docente", "O2310102008 Aportes a la ESAP"),
        (14, "Pago de Aportes para Salud del personal", "Pago de Aportes para Salud del personal"),
        (
            15,
            "Pago de Aportes para Pension del persona",
            "Pago de Aportes para Pension del persona",
        ),
        (
            16,
            "Pago de Aportes para Cesantias del personal",
            "O231010200301 Aportes de cesantías a fondos públicos",
        ),
    ],
};

const ORIENTADORES: Segment = Segment {
    kind: ReportKind::Orientadores,
    number: 2,
    title: "EJECUCIÓN PRESUPUESTAL DOCENTES ORIENTADORES RP",
    groups: [
        group("SUELDOS_ORIENTADORES", 20..=24, RowStyle::Subtotal),
        group("PARAFISCALES_ORIENTADORES", 25..=29, RowStyle::FinalTotal),
        group("FOMAG_ORIENTADORES", 30..=32, RowStyle::GrandTotal),
    ],
    total: "TOTAL_DOC_ORIENTADORES",
    lines: &[
        (20, "Pago de Personal Docente orientadores", "O231010100101 Sueldo básico"),
        (
            21,
            "Pago de horas extras del personal docent",
            "O231010100102 Horas extras, dominicales, festivos y recargos",
        ),
        (22, "Pago de Personal Docente prima de servicio", "O231010100106 Prima de servicio"),
        (23, "Pago de Personal Docente prima de vacaciones", "O23101010010802 Prima de vacaciones"),
        (24, "Pago de Personal Docente prima de navidad", "O23101010010801 Prima de navidad"),
        (25, "Pago de Aportes para las Cajas de Compensacion", "O231010200401 Compensar"),
        (26, "Pago de Aportes para el ICBF personal docente", "O2310102006 Aportes al ICBF"),
        (
            27,
            "Pago de Aportes para Institutos Tecnicos",
            "O2310102009 Aportes a escuelas industriales e institutos técnicos",
        ),
        (28, "Pago de Aportes para el SENA personal docente", "O2310102007 Aportes al SENA"),
        (29, "Pago de Aportes para la ESAP personal docente", "O2310102008 Aportes a la ESAP"),
        (
            30,
            "Pago de Aportes para Salud del personal",
            "O231010200201 Aportes a la seguridad social en salud pública",
        ),
        (
            31,
            "Pago de Aportes para Pension del personal",
            "O231010200101 Aportes a la seguridad social en pensiones públicas",
        ),
        (
            32,
            "Pago de Aportes para Cesantias del personal",
            "O231010200301 Aportes de cesantías a fondos públicos",
        ),
    ],
};

const PRIMARIA_BASICA_MEDIA: Segment = Segment {
    kind: ReportKind::PrimariaBasicaMedia,
    number: 3,
    title: "EJECUCIÓN PRESUPUESTAL DOCENTES PRIMARIA BÁSICA MEDIA RP",
    groups: [
        group("SUELDOS_PBM", 33..=41, RowStyle::Subtotal),
        group("PARAFISCALES_PBM", 42..=51, RowStyle::FinalTotal),
        group("FOMAG_PBM", 52..=57, RowStyle::GrandTotal),
    ],
    total: "TOTAL_DOC_PBM",
    lines: &[
        (33, "Pago de Personal Docente", "O231010100101 Sueldo básico"),
        (34, "Pago de Personal Directivo Docente", "O231010100101 Sueldo básico"),
        (35, "Pago de Ascensos en escalafon del Personal", "O231010100101 Sueldo básico"),
        (
            36,
            "Pago de horas extras del personal docent",
            "O231010100102 Horas extras, dominicales, festivos y recargos",
        ),
        (37, "Pago de Personal Docente- prima de servicio", "O231010100106 Prima de servicio"),
        (
            38,
            "Pago de Personal Docente - prima de vacaciones",
            "O23101010010802 Prima de vacaciones",
        ),
        (39, "Pago de Personal Docente - prima de navidad", "O23101010010801 Prima de navidad"),
        (
            40,
            "Pago de Personal Docente- subsidio de alimentación",
            "O231010100104 Subsidio de alimentación",
        ),
        (41, "Pago Auxili de transporte personal docente", "O231010100105 Auxilio de Transporte"),
        (42, "Pago de Aportes para las Cajas de Compension", "O231010200401 Compensar"),
        (43, "Pago de Aportes para las Cajas de Compensacion", "O231010200401 Compensar"),
        (44, "Pago de Aportes para el ICBF personal do", "O2310102006 Aportes al ICBF"),
        (45, "Pago de Aportes para el ICBF del Personal", "O2310102006 Aportes al ICBF"),
        (
            46,
            "Pago de Aportes para Institutos Tecnicos",
            "O2310102009 Aportes a escuelas industriales e institutos técnicos",
        ),
        (
            47,
            "Pago de Aportes para Institutos Tecnicos",
            "O2310102009 Aportes a escuelas industriales e institutos técnicos",
        ),
        (48, "Pago de Aportes para el SENA del Personal", "O2310102007 Aportes al SENA"),
        (49, "Pago de Aportes para el SENA del Personal", "O2310102007 Aportes al SENA"),
        (50, "Pago de Aportes para la ESAP personal docente", "O2310102008 Aportes a la ESAP"),
        (51, "Pago de Aportes para la ESAP personal docente", "O2310102008 Aportes a la ESAP"),
        (
            52,
            "Pago de Aportes para Salud del personal",
            "O231010200201 Aportes a la seguridad social en salud pública",
        ),
        (
            53,
            "Pago de Aportes para salud del personal",
            "O231010200201 Aportes a la seguridad social en salud pública",
        ),
        (
            54,
            "Pago de Aportes para Pension del personal",
            "O231010200101 Aportes a la seguridad social en pensiones públicas",
        ),
        (
            55,
            "Pago de Aportes para Pension del personal",
            "O231010200101 Aportes a la seguridad social en pensiones públicas",
        ),
        (
            56,
            "Pago de Aportes para Cesantias del personal",
            "O231010200301 Aportes de cesantías a fondos públicos",
        ),
        (
            57,
            "Pago de Aportes para Cesantias del personal",
            "O231010200301 Aportes de cesantías a fondos públicos",
        ),
    ],
};
