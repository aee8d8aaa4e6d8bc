//! In-memory budget table
//!
//! A `BudgetTable` is an immutable snapshot of the source rows with the
//! secondary identifier forward-filled and the sub-code series computed.
//! Every report invocation builds its own table, so the derivation is applied
//! identically on every report path.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{forward_fill, sub_code, Measure, Record, SubCode, TableError};

/// Primary code column
pub const PRIMARY_COLUMN: &str = "Codigo";

/// Secondary identifier column; derived from `Codigo` when absent
pub const SECONDARY_COLUMN: &str = "Codigo_O";

/// Prefix marking an object-code header row in the `Codigo` column
const OBJECT_CODE_MARKER: char = 'O';

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BudgetTable {
    records: Vec<Record>,
    sub_codes: Vec<Option<SubCode>>,
}

impl BudgetTable {
    /// Build a table from records, forward-filling secondary identifiers
    pub fn new(mut records: Vec<Record>) -> Self {
        let filled = forward_fill(records.iter_mut().map(|r| r.secondary_id.take()));
        for (record, secondary) in records.iter_mut().zip(filled) {
            record.secondary_id = secondary;
        }
        let sub_codes = records.iter().map(Record::sub_code).collect();
        Self { records, sub_codes }
    }

    /// Build a table from a header row and text cells.
    ///
    /// `Codigo` and the five measure columns are required. When `Codigo_O`
    /// is absent it is derived from the `Codigo` cells that start with `O`.
    pub fn from_rows<H, R, C>(headers: &[H], rows: R) -> Result<Self, TableError>
    where
        H: AsRef<str>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let position = |name: &str| headers.iter().position(|h| h.as_ref().trim() == name);

        let mut missing = Vec::new();
        let primary_col = position(PRIMARY_COLUMN);
        if primary_col.is_none() {
            missing.push(PRIMARY_COLUMN.to_string());
        }
        let mut measure_cols = [0usize; 5];
        for measure in Measure::ALL {
            match position(measure.column()) {
                Some(col) => measure_cols[measure.index()] = col,
                None => missing.push(measure.column().to_string()),
            }
        }
        let Some(primary_col) = primary_col.filter(|_| missing.is_empty()) else {
            return Err(TableError::MissingColumns(missing));
        };
        let secondary_col = position(SECONDARY_COLUMN);

        let records = rows
            .into_iter()
            .map(|row| {
                let cells: Vec<Option<String>> = row
                    .into_iter()
                    .map(|cell| {
                        let text = cell.as_ref().trim();
                        (!text.is_empty()).then(|| text.to_string())
                    })
                    .collect();
                let cell = |col: usize| cells.get(col).cloned().flatten();

                let primary_code = cell(primary_col);
                let secondary_id = match secondary_col {
                    Some(col) => cell(col),
                    None => primary_code
                        .clone()
                        .filter(|code| code.starts_with(OBJECT_CODE_MARKER)),
                };
                let mut values = [None; 5];
                for measure in Measure::ALL {
                    values[measure.index()] =
                        cell(measure_cols[measure.index()]).and_then(|raw| parse_amount(&raw));
                }
                Record {
                    primary_code,
                    secondary_id,
                    values,
                }
            })
            .collect();

        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sub-code series, same length as the table
    pub fn sub_codes(&self) -> &[Option<SubCode>] {
        &self.sub_codes
    }

    /// Iterate records alongside their sub-code
    pub fn iter(&self) -> impl Iterator<Item = (&Record, Option<SubCode>)> {
        self.records.iter().zip(self.sub_codes.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Coerce a text cell into an amount.
///
/// Accepts plain decimals, a leading `$`, `,` thousands grouping, a leading
/// `-` and accounting parentheses. Returns `None` for anything else.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let mut text = raw.trim();
    let mut negative = false;

    if let Some(inner) = text.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        negative = true;
        text = inner.trim();
    }
    if let Some(rest) = text.strip_prefix('-') {
        negative = !negative;
        text = rest.trim_start();
    }
    let text = text.strip_prefix('$').unwrap_or(text);

    let cleaned: String = text.chars().filter(|c| *c != ',' && *c != ' ').collect();
    if cleaned.is_empty() {
        return None;
    }
    let value = Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()?;

    Some(if negative { -value } else { value })
}
