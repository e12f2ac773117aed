// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDateTime;

/// Column holding the effective completion timestamp of a case.
pub const COL_COMPLETED: &str = "Data/hora conclusão efetiva";
/// Column holding the case status.
pub const COL_STATUS: &str = "Status";
/// Column holding the case subtype.
pub const COL_SUBTYPE: &str = "Subtipo";
/// Column holding the responsible office, in its raw "Org / Branch" form.
/// This is the join key between the case export and the quota sheet.
pub const COL_OFFICE: &str = "Escritório responsável";

/// The status value that marks a case as fulfilled.
/// The comparison against this literal is case-insensitive.
pub const STATUS_FULFILLED: &str = "cumprido";

/// The subtypes counted towards the quota, when any of them is present
/// in the data. When none of them appears, the subtype filter is skipped
/// and all fulfilled cases are counted.
pub const DEFAULT_SUBTYPES: [&str; 4] = [
    "Enviado p/ Análise ADM",
    "Enviado p/ Análise",
    "Habilitação ADM",
    "Habilitação em Processo Judicial",
];

/// Accepted spellings for the quota column of the quota sheet,
/// compared after trimming and lowercasing.
pub const QUOTA_COLUMN_ALIASES: [&str; 4] = [
    "quota",
    "meta",
    "meta_pastas_abertas",
    "meta pastas abertas",
];

/// The office column of the quota sheet, compared after trimming and
/// lowercasing. This is the same column name as in the case export.
pub const QUOTA_OFFICE_COLUMN: &str = "escritório responsável";

/// Canonical header of the quota column, as written in the template.
pub const QUOTA_COLUMN_DISPLAY: &str = "Meta Pastas Abertas";

/// The rendered bar tops out at this percentage of the quota.
/// The underlying percentage keeps its real value.
pub const BAR_CEILING_PCT: f64 = 160.0;

/// Position of the 100%-of-quota marker on the bar track, in percent of
/// the track width.
pub const QUOTA_MARKER_PCT: f64 = 100.0 / BAR_CEILING_PCT * 100.0;

/// An untyped table, as produced by the spreadsheet readers.
/// All cells are carried in their textual form.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> RawTable {
        RawTable { headers, rows }
    }

    /// The index of a column matching `name` exactly.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// The index of the first column whose trimmed, lowercased header
    /// satisfies the predicate.
    pub fn column_normalized<F>(&self, pred: F) -> Option<usize>
    where
        F: Fn(&str) -> bool,
    {
        self.headers
            .iter()
            .position(|h| pred(h.trim().to_lowercase().as_str()))
    }
}

/// One row of the case export after normalization.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CaseRecord {
    /// Completion timestamp. Unparseable values become `None` rather than
    /// failing the whole table.
    pub completed_at: Option<NaiveDateTime>,
    pub status: String,
    pub subtype: String,
    /// Raw office key, as found in the source data.
    pub office: String,
    /// Branch-only form of the office, for display.
    pub display_name: String,
}

/// The quota assigned to each office, keyed on the raw office value.
///
/// When the same office appears more than once in the quota sheet, the
/// last occurrence wins.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct QuotaTable {
    quotas: std::collections::HashMap<String, f64>,
}

impl QuotaTable {
    pub fn new() -> QuotaTable {
        QuotaTable::default()
    }

    /// Assigns a quota to an office, replacing any earlier value.
    pub fn set(&mut self, office: &str, quota: f64) {
        self.quotas.insert(office.to_string(), quota);
    }

    pub fn get(&self, office: &str) -> Option<f64> {
        self.quotas.get(office).copied()
    }

    pub fn len(&self) -> usize {
        self.quotas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotas.is_empty()
    }
}

// ******** Output data structures *********

/// Per-office case count after filtering, grouped on the raw office key.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct OfficeCount {
    pub office: String,
    pub display_name: String,
    pub count: u64,
}

/// Attainment classification of an office.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Band {
    /// Below 70% of the quota.
    Below,
    /// Between 70% and 99% of the quota.
    Near,
    /// At or above 100% of the quota.
    Met,
    /// No quota assigned: the percentage is undefined.
    NoQuota,
}

impl Band {
    /// Classifies a percentage. `None` means no quota was assigned.
    pub fn classify(percent: Option<f64>) -> Band {
        match percent {
            None => Band::NoQuota,
            Some(p) if p < 70.0 => Band::Below,
            Some(p) if p < 100.0 => Band::Near,
            Some(_) => Band::Met,
        }
    }

    /// Stable identifier for serialized output.
    pub fn tag(&self) -> &'static str {
        match self {
            Band::Below => "BELOW",
            Band::Near => "NEAR",
            Band::Met => "MET",
            Band::NoQuota => "NO_QUOTA",
        }
    }

    /// Display color of the bar for this band.
    pub fn color(&self) -> &'static str {
        match self {
            Band::Below => "#E74C3C",
            Band::Near => "#F1C40F",
            Band::Met => "#2ECC71",
            Band::NoQuota => "rgba(0,0,0,0.25)",
        }
    }
}

/// One row of the final report.
#[derive(PartialEq, Debug, Clone)]
pub struct OfficeSummary {
    /// Raw office key.
    pub office: String,
    /// Branch-only display form.
    pub display_name: String,
    /// Number of cases surviving the filters.
    pub count: u64,
    /// Assigned quota. Zero means no quota was set.
    pub quota: f64,
    /// count / quota * 100. `None` when no quota is set; may exceed 100.
    pub percent: Option<f64>,
    pub band: Band,
    /// Bar width for rendering, in [0, 100]. The bar is capped at
    /// [`BAR_CEILING_PCT`] of the quota even when `percent` is larger.
    pub bar_width: f64,
}

impl OfficeSummary {
    /// The percentage as displayed on the panel: a rounded whole number,
    /// or `--%` when no quota is set.
    pub fn percent_label(&self) -> String {
        match self.percent {
            Some(p) => format!("{}%", p.round() as i64),
            None => "--%".to_string(),
        }
    }
}

/// Errors that prevent a report from being computed.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AttainmentError {
    /// One or more required columns are absent from an input table.
    /// Cell-level problems never raise this: they coerce to null/zero.
    MissingColumns { columns: Vec<String> },
}

impl Error for AttainmentError {}

impl Display for AttainmentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttainmentError::MissingColumns { columns } => {
                write!(f, "missing required columns: {}", columns.join(", "))
            }
        }
    }
}
