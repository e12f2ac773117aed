use clap::Parser;

/// Renders a ranked quota-attainment panel from a case export and a
/// quota sheet.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The case export, in .xlsx or .csv format. It must contain the
    /// completion timestamp, status, subtype and responsible office columns.
    #[clap(short, long, value_parser)]
    pub cases: Option<String>,

    /// (file path) The quota sheet, in .xlsx or .csv format. It must contain the
    /// responsible office column and a quota column (see documentation for the
    /// accepted spellings).
    #[clap(short, long, value_parser)]
    pub quotas: Option<String>,

    /// (tv or full) The display mode: 'tv' shows only the name, the bar and the
    /// percentage; 'full' adds the counts, the quota and the band.
    #[clap(short, long, value_parser, default_value = "tv")]
    pub mode: String,

    /// (file path, 'stdout' or empty) If specified, the summary of the panel will
    /// be written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a panel summary in JSON format. If
    /// provided, quotaboard will check that the computed output matches the
    /// reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path) If specified, writes the quota template to the given location
    /// and exits. The template has the exact headers the quota sheet must carry.
    #[clap(short, long, value_parser)]
    pub template: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    /// By default the first worksheet is read.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
