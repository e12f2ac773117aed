// Helpers shared by the spreadsheet readers.

use attainment::RawTable;

use crate::board::*;

/// Turns a worksheet cell into its textual form. Whole-number cells print
/// without a trailing `.0` so that they join cleanly against text keys.
pub fn cell_to_string(cell: &calamine::DataType) -> String {
    match cell {
        calamine::DataType::String(s) => s.clone(),
        calamine::DataType::Float(f) if f.fract() == 0.0 => format!("{:.0}", f),
        calamine::DataType::Float(f) => f.to_string(),
        calamine::DataType::Int(i) => i.to_string(),
        calamine::DataType::Bool(b) => b.to_string(),
        calamine::DataType::DateTime(f) => f.to_string(),
        calamine::DataType::Empty => String::new(),
        calamine::DataType::Error(_) => String::new(),
    }
}

/// Splits raw rows into a header and a body, padding short rows to the
/// header width so downstream lookups never run out of cells.
pub fn table_from_rows(path: &str, mut rows: Vec<Vec<String>>) -> PanelResult<RawTable> {
    if rows.is_empty() {
        return EmptyTableSnafu { path }.fail();
    }
    let headers = rows.remove(0);
    for row in rows.iter_mut() {
        while row.len() < headers.len() {
            row.push(String::new());
        }
    }
    Ok(RawTable::new(headers, rows))
}
