//! Diagnostic report.
//!
//! Collects the identifiers that failed to load and the identifiers that
//! were referenced but never found, and renders them as a plain-text
//! artifact at the end of the session.
//!
//! # Overview
//!
//! - **DiagnosticReport**: thread-safe accumulator fed by the loader
//! - **ReportArtifact**: the rendered file name and contents ([`DiagnosticReport::flush`])
//! - **ReportSink**: where artifacts go; [`FileReportSink`] writes them to a directory
//!
//! # Format
//!
//! ```text
//! # Assets that failed to load
//! 1234567.Bus_Data [workshop 1234567]
//!
//! # Assets that were not found
//! 77777777.Tree1 [workshop 77777777]
//! MyCity.Fence	#referenced by 1234567.House_Data, likely content bug
//! ```
//!
//! Flushing is a pure transform. Writing is left to the sink, and sink
//! errors are logged and swallowed.

mod render;
mod sink;

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use parking_lot::Mutex;

use crate::usage::UsageSets;

pub use render::{report_file_name, ReportLine};
pub use sink::{FileReportSink, MemoryReportSink, ReportSink};

/// A rendered report, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub file_name: String,
    pub contents: String,
}

#[derive(Debug, Default)]
struct ReportData {
    failed: Vec<String>,
    /// `None` until a referrer is known.
    not_found: BTreeMap<String, Option<BTreeSet<String>>>,
}

/// Accumulator for failed and not-found identifiers.
///
/// # Example
///
/// ```
/// use assetloader::report::DiagnosticReport;
///
/// let report = DiagnosticReport::new();
/// report.record_failed("1234567.Bus_Data");
/// report.record_not_found("MyCity.Fence", Some("1234567.House_Data"));
///
/// assert_eq!(report.failed(), vec!["1234567.Bus_Data"]);
/// assert_eq!(report.not_found(), vec!["MyCity.Fence"]);
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticReport {
    data: Mutex<ReportData>,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an item that failed to load.
    pub fn record_failed(&self, name: &str) {
        self.data.lock().failed.push(name.to_string());
    }

    /// Record an item that could not be found.
    ///
    /// Referrers accumulate across calls. A record without a referrer does
    /// not clear referrers already known.
    pub fn record_not_found(&self, name: &str, referrer: Option<&str>) {
        let mut data = self.data.lock();
        let entry = data.not_found.entry(name.to_string()).or_default();
        if let Some(referrer) = referrer {
            entry
                .get_or_insert_with(BTreeSet::new)
                .insert(referrer.to_string());
        }
    }

    /// Failed identifiers, sorted.
    pub fn failed(&self) -> Vec<String> {
        let mut failed = self.data.lock().failed.clone();
        failed.sort();
        failed
    }

    /// Not-found identifiers, sorted.
    pub fn not_found(&self) -> Vec<String> {
        self.data.lock().not_found.keys().cloned().collect()
    }

    /// Referrers recorded for a not-found identifier.
    pub fn referrers(&self, name: &str) -> Option<Vec<String>> {
        self.data
            .lock()
            .not_found
            .get(name)
            .and_then(|r| r.as_ref())
            .map(|r| r.iter().cloned().collect())
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        let data = self.data.lock();
        data.failed.is_empty() && data.not_found.is_empty()
    }

    /// Render the report.
    ///
    /// `usage` adds the "used in this city" sections; without it a hint
    /// line is written instead.
    pub fn flush(
        &self,
        session: &str,
        usage: Option<&UsageSets>,
        at: NaiveDateTime,
    ) -> ReportArtifact {
        let data = self.data.lock();
        ReportArtifact {
            file_name: report_file_name(session, at),
            contents: render::to_text(session, &data.failed, &data.not_found, usage),
        }
    }

    /// Drop every record.
    pub fn clear(&self) {
        let mut data = self.data.lock();
        data.failed.clear();
        data.not_found.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_accumulates_referrers() {
        let report = DiagnosticReport::new();
        report.record_not_found("A.x", None);
        assert_eq!(report.referrers("A.x"), None);

        report.record_not_found("A.x", Some("B.y"));
        report.record_not_found("A.x", Some("C.z"));
        report.record_not_found("A.x", None);
        report.record_not_found("A.x", Some("B.y"));

        assert_eq!(
            report.referrers("A.x"),
            Some(vec!["B.y".to_string(), "C.z".to_string()])
        );
        assert_eq!(report.not_found(), vec!["A.x"]);
    }

    #[test]
    fn test_failed_sorted() {
        let report = DiagnosticReport::new();
        report.record_failed("b");
        report.record_failed("a");
        assert_eq!(report.failed(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_and_clear() {
        let report = DiagnosticReport::new();
        assert!(report.is_empty());
        report.record_failed("a");
        assert!(!report.is_empty());
        report.clear();
        assert!(report.is_empty());
    }
}
