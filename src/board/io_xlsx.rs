// Primitives for reading Excel workbooks.

use attainment::RawTable;
use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::board::{
    io_common::{cell_to_string, table_from_rows},
    *,
};

pub fn read_xlsx_table(path: &str, worksheet_name: &Option<String>) -> PanelResult<RawTable> {
    let wrange = get_range(path, worksheet_name)?;
    let rows: Vec<Vec<String>> = wrange
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    table_from_rows(path, rows)
}

fn get_range(path: &str, worksheet_name_o: &Option<String>) -> PanelResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}
