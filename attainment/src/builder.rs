pub use crate::config::*;

use chrono::NaiveDateTime;

/// A builder for assembling a report without tabular inputs.
///
/// It is meant for callers that already hold typed case data and do not
/// want to go through [`RawTable`](crate::RawTable).
///
/// ```
/// use attainment::builder::Builder;
/// use attainment::Band;
///
/// let mut builder = Builder::new();
/// builder.add_case("Cumprido", "Enviado p/ Análise", "EXEMPLO / MATRIZ");
/// builder.add_case("Cumprido", "Enviado p/ Análise", "EXEMPLO / MATRIZ");
/// builder.set_quota("EXEMPLO / MATRIZ", 10.0);
///
/// let report = builder.run();
/// assert_eq!(report[0].display_name, "MATRIZ");
/// assert_eq!(report[0].count, 2);
/// assert_eq!(report[0].percent, Some(20.0));
/// assert_eq!(report[0].band, Band::Below);
/// ```
pub struct Builder {
    _cases: Vec<CaseRecord>,
    _quotas: QuotaTable,
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _cases: Vec::new(),
            _quotas: QuotaTable::new(),
        }
    }

    /// Adds one case row. This is the simplest use case: the completion
    /// timestamp is left unset.
    pub fn add_case(&mut self, status: &str, subtype: &str, office: &str) {
        self.add_case_dated(status, subtype, office, None)
    }

    /// Adds one case row with an optional completion timestamp.
    pub fn add_case_dated(
        &mut self,
        status: &str,
        subtype: &str,
        office: &str,
        completed_at: Option<NaiveDateTime>,
    ) {
        self._cases.push(CaseRecord {
            completed_at,
            status: status.to_string(),
            subtype: subtype.to_string(),
            office: office.to_string(),
            display_name: crate::display_name(office),
        });
    }

    /// Assigns a quota to an office. Calling this again for the same
    /// office replaces the earlier value.
    pub fn set_quota(&mut self, office: &str, quota: f64) {
        self._quotas.set(office, quota);
    }

    /// Filters, aggregates and scores the accumulated cases.
    pub fn run(self) -> Vec<OfficeSummary> {
        let surviving = crate::filter_cases(self._cases);
        let counts = crate::aggregate_counts(&surviving);
        crate::score(&counts, &self._quotas)
    }
}
