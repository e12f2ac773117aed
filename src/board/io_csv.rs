// Primitives for reading CSV files.

use std::io::Read;

use attainment::RawTable;
use snafu::prelude::*;

use crate::board::{io_common::table_from_rows, *};

pub fn read_csv_table(path: &str) -> PanelResult<RawTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let rows = collect_rows(rdr)?;
    table_from_rows(path, rows)
}

/// Same as [`read_csv_table`], over any reader. Tests and the template
/// round-trip feed in-memory bytes through this entry point.
pub fn read_csv_table_from_reader<R: Read>(label: &str, reader: R) -> PanelResult<RawTable> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let rows = collect_rows(rdr)?;
    table_from_rows(label, rows)
}

fn collect_rows<R: Read>(rdr: csv::Reader<R>) -> PanelResult<Vec<Vec<String>>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, record_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let record = record_r.context(CsvLineParseSnafu { lineno })?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }
    Ok(rows)
}
