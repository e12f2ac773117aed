mod config;
pub mod builder;
pub mod manual;

use log::{debug, info, warn};

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};

pub use crate::config::*;

// Formats tried in order when parsing the completion timestamp.
// Day-first forms come first: that is how the case-management tool exports.
const DATETIME_FORMATS: [&str; 5] = [
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// Derives the branch-only display form of an office: everything up to and
/// including the last `" / "` separator is dropped. Values without the
/// separator are kept as-is (trimmed); empty values stay empty.
pub fn display_name(raw_office: &str) -> String {
    let s = raw_office.trim();
    match s.rsplit_once(" / ") {
        Some((_, branch)) => branch.trim().to_string(),
        None => s.to_string(),
    }
}

fn parse_datetime_permissive(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

// Lenient numeric coercion for quota cells: trims, strips thousands
// separators, rejects anything containing letters.
fn parse_number_lenient(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_alphabetic()) {
        return None;
    }
    s.replace(',', "").parse::<f64>().ok()
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(String::as_str).unwrap_or("")
}

/// Validates and normalizes the case export.
///
/// The four required columns must all be present; otherwise the whole
/// table is rejected with the full list of missing columns. Individual
/// cells are handled best-effort: an unparseable completion timestamp
/// becomes `None` and a missing office becomes the empty string.
pub fn normalize_cases(table: &RawTable) -> Result<Vec<CaseRecord>, AttainmentError> {
    let required = [COL_COMPLETED, COL_STATUS, COL_SUBTYPE, COL_OFFICE];
    let missing: Vec<String> = required
        .iter()
        .filter(|c| table.column(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AttainmentError::MissingColumns { columns: missing });
    }

    // The indexes exist, this was checked just above.
    let completed_idx = table.column(COL_COMPLETED).unwrap();
    let status_idx = table.column(COL_STATUS).unwrap();
    let subtype_idx = table.column(COL_SUBTYPE).unwrap();
    let office_idx = table.column(COL_OFFICE).unwrap();

    let mut res: Vec<CaseRecord> = Vec::new();
    for (lineno, row) in table.rows.iter().enumerate() {
        let completed_raw = cell(row, completed_idx);
        let completed_at = parse_datetime_permissive(completed_raw);
        if completed_at.is_none() && !completed_raw.trim().is_empty() {
            warn!(
                "normalize_cases: row {}: unparseable completion timestamp {:?}",
                lineno + 1,
                completed_raw
            );
        }
        let office = cell(row, office_idx).to_string();
        res.push(CaseRecord {
            completed_at,
            status: cell(row, status_idx).to_string(),
            subtype: cell(row, subtype_idx).to_string(),
            display_name: display_name(&office),
            office,
        });
    }
    info!("normalize_cases: {} case rows", res.len());
    Ok(res)
}

/// Reads the quota sheet into a per-office quota mapping.
///
/// The two columns are located by trimmed, case-insensitive header
/// matching against [`QUOTA_OFFICE_COLUMN`] and [`QUOTA_COLUMN_ALIASES`].
/// Non-numeric or empty quota cells coerce to zero. When an office appears
/// more than once, the last occurrence wins.
pub fn load_quotas(table: &RawTable) -> Result<QuotaTable, AttainmentError> {
    let office_idx = table.column_normalized(|h| h == QUOTA_OFFICE_COLUMN);
    let quota_idx = table.column_normalized(|h| QUOTA_COLUMN_ALIASES.contains(&h));

    let (office_idx, quota_idx) = match (office_idx, quota_idx) {
        (Some(o), Some(q)) => (o, q),
        _ => {
            return Err(AttainmentError::MissingColumns {
                columns: vec![COL_OFFICE.to_string(), QUOTA_COLUMN_DISPLAY.to_string()],
            })
        }
    };

    let mut quotas = QuotaTable::new();
    for (lineno, row) in table.rows.iter().enumerate() {
        let office = cell(row, office_idx);
        if office.is_empty() {
            continue;
        }
        let quota_raw = cell(row, quota_idx);
        let quota = match parse_number_lenient(quota_raw) {
            Some(q) => q,
            None => {
                if !quota_raw.trim().is_empty() {
                    warn!(
                        "load_quotas: row {}: non-numeric quota {:?} for {:?}, using 0",
                        lineno + 1,
                        quota_raw,
                        office
                    );
                }
                0.0
            }
        };
        // Insertion overwrites, so the last occurrence of an office wins.
        quotas.set(office, quota);
    }
    info!("load_quotas: {} offices with a quota", quotas.len());
    Ok(quotas)
}

/// Applies the two inclusion filters, in order:
///
/// 1. keep rows whose status equals [`STATUS_FULFILLED`], case-insensitively;
/// 2. keep rows whose subtype is one of the [`DEFAULT_SUBTYPES`] actually
///    present in the status-filtered data. When none of the default
///    subtypes appears at all, this second filter is skipped and every
///    status-filtered row is kept.
pub fn filter_cases(records: Vec<CaseRecord>) -> Vec<CaseRecord> {
    let fulfilled: Vec<CaseRecord> = records
        .into_iter()
        .filter(|r| r.status.to_lowercase() == STATUS_FULFILLED)
        .collect();
    debug!("filter_cases: {} fulfilled rows", fulfilled.len());

    let present: HashSet<&str> = fulfilled.iter().map(|r| r.subtype.as_str()).collect();
    let selected: Vec<&str> = DEFAULT_SUBTYPES
        .iter()
        .copied()
        .filter(|s| present.contains(s))
        .collect();
    if selected.is_empty() {
        debug!("filter_cases: no default subtype present, keeping all rows");
        return fulfilled;
    }
    fulfilled
        .into_iter()
        .filter(|r| selected.contains(&r.subtype.as_str()))
        .collect()
}

/// Counts the surviving rows per (raw office, display name) pair.
/// Offices with no surviving rows do not appear in the output.
pub fn aggregate_counts(records: &[CaseRecord]) -> Vec<OfficeCount> {
    let mut counts: HashMap<(String, String), u64> = HashMap::new();
    for r in records {
        let key = (r.office.clone(), r.display_name.clone());
        *counts.entry(key).or_insert(0) += 1;
    }
    let mut res: Vec<OfficeCount> = counts
        .into_iter()
        .map(|((office, display_name), count)| OfficeCount {
            office,
            display_name,
            count,
        })
        .collect();
    res.sort_by(|a, b| a.office.cmp(&b.office));
    res
}

fn bar_width(percent: Option<f64>) -> f64 {
    match percent {
        Some(p) => (p / BAR_CEILING_PCT * 100.0).clamp(0.0, 100.0),
        None => 0.0,
    }
}

/// Left-joins the per-office counts against the quota mapping and scores
/// each office.
///
/// Offices absent from the quota sheet get a quota of zero and an
/// undefined percentage: "no quota set" is not comparable to an actual
/// attainment score, so those rows sort after every defined percentage.
/// Defined percentages sort in descending order; ties and the no-quota
/// block order by display name.
pub fn score(counts: &[OfficeCount], quotas: &QuotaTable) -> Vec<OfficeSummary> {
    let mut rows: Vec<OfficeSummary> = counts
        .iter()
        .map(|c| {
            let quota = quotas.get(&c.office).unwrap_or(0.0);
            let percent = if quota > 0.0 {
                Some(c.count as f64 / quota * 100.0)
            } else {
                None
            };
            OfficeSummary {
                office: c.office.clone(),
                display_name: c.display_name.clone(),
                count: c.count,
                quota,
                percent,
                band: Band::classify(percent),
                bar_width: bar_width(percent),
            }
        })
        .collect();

    rows.sort_by(|a, b| match (a.percent, b.percent) {
        (Some(x), Some(y)) => y
            .partial_cmp(&x)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.display_name.cmp(&b.display_name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.display_name.cmp(&b.display_name),
    });
    rows
}

/// Runs the whole pipeline: one input pair in, one ranked report out.
///
/// There is no shared state between invocations; every call recomputes
/// the report from scratch.
pub fn run_attainment(
    cases: &RawTable,
    quotas: &RawTable,
) -> Result<Vec<OfficeSummary>, AttainmentError> {
    let records = normalize_cases(cases)?;
    let quota_table = load_quotas(quotas)?;
    let surviving = filter_cases(records);
    info!("run_attainment: {} rows after filters", surviving.len());
    let counts = aggregate_counts(&surviving);
    Ok(score(&counts, &quota_table))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case_headers() -> Vec<String> {
        vec![
            COL_COMPLETED.to_string(),
            COL_STATUS.to_string(),
            COL_SUBTYPE.to_string(),
            COL_OFFICE.to_string(),
        ]
    }

    fn case_row(completed: &str, status: &str, subtype: &str, office: &str) -> Vec<String> {
        vec![
            completed.to_string(),
            status.to_string(),
            subtype.to_string(),
            office.to_string(),
        ]
    }

    fn quota_table(rows: &[(&str, &str)]) -> RawTable {
        RawTable::new(
            vec![COL_OFFICE.to_string(), QUOTA_COLUMN_DISPLAY.to_string()],
            rows.iter()
                .map(|(o, q)| vec![o.to_string(), q.to_string()])
                .collect(),
        )
    }

    #[test]
    fn display_name_strips_the_last_separator() {
        assert_eq!(display_name("FIRM / BRANCH"), "BRANCH");
        assert_eq!(display_name("A / B / C"), "C");
        assert_eq!(display_name("SOLO"), "SOLO");
        assert_eq!(display_name("  SOLO  "), "SOLO");
        assert_eq!(display_name(""), "");
    }

    #[test]
    fn missing_case_columns_are_all_reported() {
        let table = RawTable::new(
            vec![COL_STATUS.to_string(), COL_OFFICE.to_string()],
            vec![],
        );
        let err = normalize_cases(&table).unwrap_err();
        assert_eq!(
            err,
            AttainmentError::MissingColumns {
                columns: vec![COL_COMPLETED.to_string(), COL_SUBTYPE.to_string()],
            }
        );
    }

    #[test]
    fn unparseable_timestamps_become_none() {
        let table = RawTable::new(
            case_headers(),
            vec![
                case_row("31/01/2024 10:30:00", "Cumprido", "Habilitação ADM", "X / A"),
                case_row("2024-01-31 10:30", "Cumprido", "Habilitação ADM", "X / A"),
                case_row("not a date", "Cumprido", "Habilitação ADM", "X / A"),
                case_row("", "Cumprido", "Habilitação ADM", "X / A"),
            ],
        );
        let records = normalize_cases(&table).unwrap();
        assert!(records[0].completed_at.is_some());
        assert!(records[1].completed_at.is_some());
        assert!(records[2].completed_at.is_none());
        assert!(records[3].completed_at.is_none());
    }

    #[test]
    fn status_filter_is_case_insensitive() {
        let table = RawTable::new(
            case_headers(),
            vec![
                case_row("", "Cumprido", "Enviado p/ Análise", "X / A"),
                case_row("", "CUMPRIDO", "Enviado p/ Análise", "X / A"),
                case_row("", "cumprido", "Enviado p/ Análise", "X / A"),
                case_row("", "Pendente", "Enviado p/ Análise", "X / A"),
            ],
        );
        let surviving = filter_cases(normalize_cases(&table).unwrap());
        assert_eq!(surviving.len(), 3);
    }

    #[test]
    fn subtype_filter_refines_when_defaults_are_present() {
        let table = RawTable::new(
            case_headers(),
            vec![
                case_row("", "Cumprido", "Enviado p/ Análise", "X / A"),
                case_row("", "Cumprido", "Outro Subtipo", "X / A"),
            ],
        );
        let surviving = filter_cases(normalize_cases(&table).unwrap());
        assert_eq!(surviving.len(), 1);
        assert_eq!(surviving[0].subtype, "Enviado p/ Análise");
    }

    #[test]
    fn subtype_filter_is_skipped_when_no_default_is_present() {
        let table = RawTable::new(
            case_headers(),
            vec![
                case_row("", "Cumprido", "Outro Subtipo", "X / A"),
                case_row("", "Cumprido", "Mais Um", "X / B"),
            ],
        );
        let surviving = filter_cases(normalize_cases(&table).unwrap());
        assert_eq!(surviving.len(), 2);
    }

    #[test]
    fn quota_columns_are_matched_by_alias_case_insensitively() {
        for header in ["Meta Pastas Abertas", "META", "quota", "meta_pastas_abertas"] {
            let table = RawTable::new(
                vec!["escritório RESPONSÁVEL ".to_string(), header.to_string()],
                vec![vec!["X / A".to_string(), "10".to_string()]],
            );
            let quotas = load_quotas(&table).unwrap();
            assert_eq!(quotas.get("X / A"), Some(10.0));
        }
    }

    #[test]
    fn missing_quota_columns_name_both_expected_headers() {
        let table = RawTable::new(vec!["Office".to_string()], vec![]);
        let err = load_quotas(&table).unwrap_err();
        assert_eq!(
            err,
            AttainmentError::MissingColumns {
                columns: vec![COL_OFFICE.to_string(), QUOTA_COLUMN_DISPLAY.to_string()],
            }
        );
    }

    #[test]
    fn non_numeric_quotas_coerce_to_zero() {
        let table = quota_table(&[("X / A", "abc"), ("X / B", ""), ("X / C", " 1,250 ")]);
        let quotas = load_quotas(&table).unwrap();
        assert_eq!(quotas.get("X / A"), Some(0.0));
        assert_eq!(quotas.get("X / B"), Some(0.0));
        assert_eq!(quotas.get("X / C"), Some(1250.0));
    }

    #[test]
    fn duplicate_offices_keep_the_last_quota() {
        let table = quota_table(&[("X / A", "10"), ("X / A", "25")]);
        let quotas = load_quotas(&table).unwrap();
        assert_eq!(quotas.get("X / A"), Some(25.0));
    }

    #[test]
    fn aggregation_groups_on_the_raw_office_key() {
        let table = RawTable::new(
            case_headers(),
            vec![
                case_row("", "Cumprido", "Habilitação ADM", "X / A"),
                case_row("", "Cumprido", "Habilitação ADM", "X / A"),
                case_row("", "Cumprido", "Habilitação ADM", "Y / A"),
            ],
        );
        let counts = aggregate_counts(&filter_cases(normalize_cases(&table).unwrap()));
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].office, "X / A");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[1].office, "Y / A");
        assert_eq!(counts[1].count, 1);
    }

    #[test]
    fn band_boundaries() {
        assert_eq!(Band::classify(Some(0.0)), Band::Below);
        assert_eq!(Band::classify(Some(69.99)), Band::Below);
        assert_eq!(Band::classify(Some(70.0)), Band::Near);
        assert_eq!(Band::classify(Some(99.99)), Band::Near);
        assert_eq!(Band::classify(Some(100.0)), Band::Met);
        assert_eq!(Band::classify(Some(250.0)), Band::Met);
        assert_eq!(Band::classify(None), Band::NoQuota);
    }

    #[test]
    fn below_quota_scenario() {
        let counts = [OfficeCount {
            office: "FIRM / A".to_string(),
            display_name: "A".to_string(),
            count: 10,
        }];
        let mut quotas = QuotaTable::new();
        quotas.set("FIRM / A", 20.0);
        let rows = score(&counts, &quotas);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 10);
        assert_eq!(rows[0].quota, 20.0);
        assert_eq!(rows[0].percent, Some(50.0));
        assert_eq!(rows[0].band, Band::Below);
        assert!((rows[0].bar_width - 31.25).abs() < 1e-9);
    }

    #[test]
    fn over_quota_scenario() {
        let counts = [OfficeCount {
            office: "FIRM / A".to_string(),
            display_name: "A".to_string(),
            count: 10,
        }];
        let mut quotas = QuotaTable::new();
        quotas.set("FIRM / A", 8.0);
        let rows = score(&counts, &quotas);
        assert_eq!(rows[0].percent, Some(125.0));
        assert_eq!(rows[0].band, Band::Met);
        assert!((rows[0].bar_width - 78.125).abs() < 1e-9);
        assert_eq!(rows[0].percent_label(), "125%");
    }

    #[test]
    fn office_without_quota_is_marked_no_quota() {
        let counts = [OfficeCount {
            office: "FIRM / A".to_string(),
            display_name: "A".to_string(),
            count: 10,
        }];
        let rows = score(&counts, &QuotaTable::new());
        assert_eq!(rows[0].quota, 0.0);
        assert_eq!(rows[0].percent, None);
        assert_eq!(rows[0].band, Band::NoQuota);
        assert_eq!(rows[0].bar_width, 0.0);
        assert_eq!(rows[0].percent_label(), "--%");
    }

    #[test]
    fn defined_percentages_sort_before_undefined_ones() {
        let counts = [
            OfficeCount {
                office: "F / LOW".to_string(),
                display_name: "LOW".to_string(),
                count: 1,
            },
            OfficeCount {
                office: "F / NONE".to_string(),
                display_name: "NONE".to_string(),
                count: 50,
            },
            OfficeCount {
                office: "F / HIGH".to_string(),
                display_name: "HIGH".to_string(),
                count: 30,
            },
        ];
        let mut quotas = QuotaTable::new();
        quotas.set("F / LOW", 100.0);
        quotas.set("F / HIGH", 10.0);
        let rows = score(&counts, &quotas);
        let names: Vec<&str> = rows.iter().map(|r| r.display_name.as_str()).collect();
        assert_eq!(names, vec!["HIGH", "LOW", "NONE"]);
    }

    #[test]
    fn full_pipeline_over_raw_tables() {
        let cases = RawTable::new(
            case_headers(),
            vec![
                case_row("01/02/2024 09:00:00", "Cumprido", "Enviado p/ Análise", "FIRM / A"),
                case_row("02/02/2024 09:00:00", "cumprido", "Enviado p/ Análise", "FIRM / A"),
                case_row("03/02/2024 09:00:00", "Pendente", "Enviado p/ Análise", "FIRM / A"),
                case_row("04/02/2024 09:00:00", "Cumprido", "Enviado p/ Análise", "FIRM / B"),
            ],
        );
        let quotas = quota_table(&[("FIRM / A", "4"), ("FIRM / B", "1")]);
        let rows = run_attainment(&cases, &quotas).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].display_name, "B");
        assert_eq!(rows[0].percent, Some(100.0));
        assert_eq!(rows[0].band, Band::Met);
        assert_eq!(rows[1].display_name, "A");
        assert_eq!(rows[1].percent, Some(50.0));
        assert_eq!(rows[1].band, Band::Below);
    }
}
