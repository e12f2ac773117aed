// The downloadable quota template.
//
// The headers are exactly the ones the quota loader consumes, so a
// template filled in by the user re-ingests without changes.

use std::fs;

use attainment::{COL_OFFICE, QUOTA_COLUMN_DISPLAY};
use snafu::prelude::*;

use crate::board::*;

/// Illustrative offices shipped in the template.
pub const TEMPLATE_SAMPLE_OFFICES: [(&str, u64); 2] = [
    ("EXEMPLO ADVOGADOS / MATRIZ", 120),
    ("EXEMPLO ADVOGADOS / FILIAL NORTE", 35),
];

pub fn quota_template_csv() -> PanelResult<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record([COL_OFFICE, QUOTA_COLUMN_DISPLAY])
        .context(TemplateSnafu {})?;
    for (office, quota) in TEMPLATE_SAMPLE_OFFICES {
        wtr.write_record([office, quota.to_string().as_str()])
            .context(TemplateSnafu {})?;
    }
    let bytes = match wtr.into_inner() {
        Ok(b) => b,
        Err(e) => whatever!("Could not flush the template writer: {}", e),
    };
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => whatever!("The template is not valid UTF-8: {}", e),
    }
}

pub fn write_quota_template(path: &str) -> PanelResult<()> {
    let contents = quota_template_csv()?;
    fs::write(path, contents).context(WritingOutputSnafu { path })
}
