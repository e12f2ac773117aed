use log::{info, warn};

use attainment::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde::Serialize;
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;

pub mod io_common;
pub mod io_csv;
pub mod io_xlsx;
pub mod template;

#[derive(Debug, Snafu)]
pub enum PanelError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("No readable worksheet in {path}"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV record at line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("The table at {path} has no header row"))]
    EmptyTable { path: String },
    #[snafu(display("Unsupported input format for {path}: expected .xlsx or .csv"))]
    UnsupportedFormat { path: String },
    #[snafu(display("{source}"))]
    InvalidInput { source: AttainmentError },
    #[snafu(display("Error assembling the quota template"))]
    Template { source: csv::Error },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error handling JSON content"))]
    ParsingJson { source: serde_json::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PanelResult<T> = Result<T, PanelError>;

/// The two panel renditions: the kiosk view for a wall-mounted screen and
/// the management view with the underlying numbers.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ViewMode {
    Tv,
    Full,
}

fn parse_mode(mode: &str) -> PanelResult<ViewMode> {
    match mode {
        "tv" => Ok(ViewMode::Tv),
        "full" => Ok(ViewMode::Full),
        x => whatever!("Unknown display mode {:?}: expected 'tv' or 'full'", x),
    }
}

/// Reads a tabular file, dispatching on its extension.
fn read_table(path: &str, worksheet_name: &Option<String>) -> PanelResult<RawTable> {
    info!("Attempting to read table {:?}", path);
    let lower = path.to_lowercase();
    if lower.ends_with(".xlsx") {
        io_xlsx::read_xlsx_table(path, worksheet_name)
    } else if lower.ends_with(".csv") {
        io_csv::read_csv_table(path)
    } else {
        UnsupportedFormatSnafu { path }.fail()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct OutputConfig {
    pub cases: String,
    pub quotas: String,
    pub mode: String,
    pub offices: usize,
}

fn summary_rows_to_json(rows: &[OfficeSummary]) -> Vec<JSValue> {
    rows.iter()
        .map(|r| {
            json!({
                "office": r.office,
                "displayName": r.display_name,
                "count": r.count,
                "quota": r.quota,
                "percent": r.percent,
                "band": r.band.tag(),
                "color": r.band.color(),
                "barWidth": r.bar_width,
            })
        })
        .collect()
}

fn build_summary_js(config: &OutputConfig, rows: &[OfficeSummary]) -> JSValue {
    json!({
        "config": config,
        "results": summary_rows_to_json(rows) })
}

// Width of the bar track in the text rendition.
const BAR_TRACK_CHARS: usize = 40;

fn fmt_quota(quota: f64) -> String {
    if quota.fract() == 0.0 {
        format!("{:.0}", quota)
    } else {
        format!("{:.1}", quota)
    }
}

/// Draws the bar track for one office. The `|` marker sits at the
/// 100%-of-quota position on the track.
fn render_track(bar_width: f64) -> String {
    let filled = (bar_width / 100.0 * BAR_TRACK_CHARS as f64).round() as usize;
    let marker = (QUOTA_MARKER_PCT / 100.0 * BAR_TRACK_CHARS as f64).round() as usize;
    let mut track: Vec<char> = (0..BAR_TRACK_CHARS)
        .map(|i| if i < filled { '█' } else { '·' })
        .collect();
    if marker < track.len() {
        track[marker] = '|';
    }
    track.into_iter().collect()
}

fn render_row(row: &OfficeSummary, mode: ViewMode) -> String {
    let track = render_track(row.bar_width);
    match mode {
        ViewMode::Tv => format!(
            "{:<28} {} {:>5}",
            row.display_name,
            track,
            row.percent_label()
        ),
        ViewMode::Full => format!(
            "{:<28} {} {:>5}  {:>6} / {:<6} {}",
            row.display_name,
            track,
            row.percent_label(),
            row.count,
            fmt_quota(row.quota),
            row.band.tag()
        ),
    }
}

fn render_panel(rows: &[OfficeSummary], mode: ViewMode) -> String {
    let mut lines: Vec<String> = Vec::new();
    lines.push("Ranking por escritório — percentual da meta".to_string());
    lines.push(format!(
        "(a linha | marca 100% da meta; a barra satura em {:.0}%)",
        BAR_CEILING_PCT
    ));
    lines.push(String::new());
    for row in rows {
        lines.push(render_row(row, mode));
    }
    lines.join("\n")
}

pub fn read_summary(path: &str) -> PanelResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn run_panel(args: &Args) -> PanelResult<()> {
    if let Some(path) = &args.template {
        template::write_quota_template(path)?;
        println!("Quota template written to {}", path);
        return Ok(());
    }

    let mode = parse_mode(args.mode.as_str())?;
    let cases_path = match &args.cases {
        Some(p) => p.clone(),
        None => whatever!("No case export provided, use --cases"),
    };
    let quotas_path = match &args.quotas {
        Some(p) => p.clone(),
        None => whatever!("No quota sheet provided, use --quotas"),
    };

    let cases = read_table(&cases_path, &args.excel_worksheet_name)?;
    let quotas = read_table(&quotas_path, &args.excel_worksheet_name)?;

    let rows = run_attainment(&cases, &quotas).context(InvalidInputSnafu {})?;
    info!("run_panel: {} offices scored", rows.len());

    println!("{}", render_panel(&rows, mode));

    let config = OutputConfig {
        cases: cases_path,
        quotas: quotas_path,
        mode: args.mode.clone(),
        offices: rows.len(),
    };
    let summary = build_summary_js(&config, &rows);
    let pretty_js_summary = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    match args.out.as_deref() {
        Some("stdout") => println!("{}", pretty_js_summary),
        Some(path) => fs::write(path, &pretty_js_summary).context(WritingOutputSnafu { path })?,
        None => {}
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        let summary_ref = read_summary(reference_path)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_summary {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_summary.as_str(),
                "\n",
            );
            whatever!("Difference detected between computed summary and reference summary");
        }
    }

    Ok(())
}
