//! CSV body decoding

use csv::{ReaderBuilder, StringRecord};
use nomina_core::BudgetTable;
use tracing::debug;

use crate::DecodeError;

/// Parse a CSV body with a header row into a `BudgetTable`.
///
/// Rows may be shorter or longer than the header; a leading byte-order mark
/// is ignored.
pub fn decode(body: &str) -> Result<BudgetTable, DecodeError> {
    let body = body.strip_prefix('\u{feff}').unwrap_or(body);
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers = reader.headers()?.clone();
    let rows = reader
        .records()
        .collect::<Result<Vec<StringRecord>, csv::Error>>()?;

    let headers: Vec<&str> = headers.iter().collect();
    let table = BudgetTable::from_rows(&headers, rows.iter().map(StringRecord::iter))?;
    debug!(columns = headers.len(), rows = table.len(), "decoded CSV body");
    Ok(table)
}
