//! Plain-text report rendering.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;

use crate::ident::{classify, display_name, workshop_id, Origin};
use crate::prefab::PrefabKind;
use crate::usage::UsageSets;

/// Report file name: `<session>-AssetsReport-<YYYYmmdd-HHMMSS>.txt`.
///
/// A trailing `_Data` is removed from the session name.
///
/// # Example
///
/// ```
/// use assetloader::report::report_file_name;
/// use chrono::NaiveDate;
///
/// let at = NaiveDate::from_ymd_opt(2024, 3, 9)
///     .unwrap()
///     .and_hms_opt(14, 5, 7)
///     .unwrap();
/// assert_eq!(
///     report_file_name("Springfield", at),
///     "Springfield-AssetsReport-20240309-140507.txt"
/// );
/// ```
pub fn report_file_name(session: &str, at: NaiveDateTime) -> String {
    format!(
        "{}-AssetsReport-{}.txt",
        display_name(session),
        at.format("%Y%m%d-%H%M%S")
    )
}

/// One not-found entry, as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub name: String,
    pub referrers: Vec<String>,
    pub annotation: Option<&'static str>,
}

impl ReportLine {
    /// Build a line and derive its annotation.
    ///
    /// When every referrer is workshop content and the name is not, the
    /// name is annotated: a private name suggests a content bug, a name
    /// without a package suggests DLC content.
    pub fn new(name: &str, referrers: Option<&BTreeSet<String>>) -> Self {
        let referrers: Vec<String> = referrers
            .map(|r| r.iter().cloned().collect())
            .unwrap_or_default();
        let all_workshop =
            !referrers.is_empty() && referrers.iter().all(|r| workshop_id(r).is_some());

        let annotation = if all_workshop {
            match classify(name) {
                Origin::Workshop(_) => None,
                Origin::Private => Some("likely content bug"),
                Origin::Legacy => Some("likely DLC content"),
            }
        } else {
            None
        };

        Self {
            name: name.to_string(),
            referrers,
            annotation,
        }
    }

    fn render(&self) -> String {
        let mut line = marked(&self.name);
        if !self.referrers.is_empty() {
            line.push_str("\t#referenced by ");
            line.push_str(&self.referrers.join(", "));
            if let Some(annotation) = self.annotation {
                line.push_str(", ");
                line.push_str(annotation);
            }
        }
        line
    }
}

/// Name with a workshop marker when it has a workshop package.
fn marked(name: &str) -> String {
    match workshop_id(name) {
        Some(id) => format!("{} [workshop {}]", name, id),
        None => name.to_string(),
    }
}

fn section<'a>(lines: &mut Vec<String>, heading: &str, names: impl Iterator<Item = &'a String>) {
    lines.push(format!("# {}", heading));
    lines.extend(names.map(|n| marked(n)));
    lines.push(String::new());
}

pub(super) fn to_text(
    session: &str,
    failed: &[String],
    not_found: &BTreeMap<String, Option<BTreeSet<String>>>,
    usage: Option<&UsageSets>,
) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Assets report: {}", display_name(session)));
    lines.push("To stop saving these files, set report_assets = false in the [report] section.".to_string());
    lines.push(String::new());

    let mut failed: Vec<&String> = failed.iter().collect();
    failed.sort();
    failed.dedup();
    section(&mut lines, "Assets that failed to load", failed.into_iter());

    lines.push("# Assets that were not found".to_string());
    for (name, referrers) in not_found {
        lines.push(ReportLine::new(name, referrers.as_ref()).render());
    }
    lines.push(String::new());

    match usage {
        Some(usage) => {
            lines.push("# The following custom assets were used in this city when it was saved".to_string());
            lines.push(String::new());
            for (kind, heading) in PrefabKind::ALL
                .iter()
                .zip(["Buildings", "Props", "Trees", "Vehicles"])
            {
                section(&mut lines, heading, usage.assets(*kind).iter());
            }
        }
        None => {
            lines.push("# Used assets".to_string());
            lines.push("To also list the custom assets used in this city, set load_used = true in the [loading] section.".to_string());
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_line_without_referrers() {
        let line = ReportLine::new("77777777.Tree1", None);
        assert_eq!(line.render(), "77777777.Tree1 [workshop 77777777]");
        assert_eq!(line.annotation, None);
    }

    #[test]
    fn test_line_private_from_workshop_is_content_bug() {
        let referrers = refs(&["1234567.House_Data"]);
        let line = ReportLine::new("MyCity.Fence", Some(&referrers));
        assert_eq!(
            line.render(),
            "MyCity.Fence\t#referenced by 1234567.House_Data, likely content bug"
        );
    }

    #[test]
    fn test_line_legacy_from_workshop_is_dlc() {
        let referrers = refs(&["1234567.House_Data"]);
        let line = ReportLine::new("Fence", Some(&referrers));
        assert_eq!(line.annotation, Some("likely DLC content"));
    }

    #[test]
    fn test_line_mixed_referrers_not_annotated() {
        let referrers = refs(&["1234567.House_Data", "MyCity.Park_Data"]);
        let line = ReportLine::new("MyCity.Fence", Some(&referrers));
        assert_eq!(line.annotation, None);
        assert_eq!(
            line.render(),
            "MyCity.Fence\t#referenced by 1234567.House_Data, MyCity.Park_Data"
        );
    }

    #[test]
    fn test_line_workshop_name_not_annotated() {
        let referrers = refs(&["1234567.House_Data"]);
        let line = ReportLine::new("7654321.Fence", Some(&referrers));
        assert_eq!(line.annotation, None);
    }

    #[test]
    fn test_to_text_sections() {
        let mut not_found = BTreeMap::new();
        not_found.insert("b.two".to_string(), None);
        not_found.insert("a.one".to_string(), None);
        let failed = vec!["z.last".to_string(), "c.first".to_string()];

        let text = to_text("City", &failed, &not_found, None);
        let lines: Vec<&str> = text.lines().collect();

        let failed_at = lines
            .iter()
            .position(|l| *l == "# Assets that failed to load")
            .unwrap();
        assert_eq!(lines[failed_at + 1], "c.first");
        assert_eq!(lines[failed_at + 2], "z.last");

        let missing_at = lines
            .iter()
            .position(|l| *l == "# Assets that were not found")
            .unwrap();
        assert_eq!(lines[missing_at + 1], "a.one");
        assert_eq!(lines[missing_at + 2], "b.two");

        assert!(text.contains("# Used assets"));
    }

    #[test]
    fn test_to_text_with_usage() {
        let mut usage = UsageSets::new();
        usage.add(PrefabKind::Tree, "77777777.Tree1");
        usage.add(PrefabKind::Building, "B.house");

        let text = to_text("City", &[], &BTreeMap::new(), Some(&usage));
        assert!(text.contains("# The following custom assets were used in this city when it was saved"));
        assert!(text.contains("# Trees\n77777777.Tree1 [workshop 77777777]\n"));
        assert!(text.contains("# Buildings\nB.house\n"));
        assert!(!text.contains("# Used assets"));
    }

    #[test]
    fn test_file_name_strips_data_suffix() {
        let at = chrono::NaiveDate::from_ymd_opt(2025, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .unwrap();
        assert_eq!(
            report_file_name("City_Data", at),
            "City-AssetsReport-20250102-030405.txt"
        );
    }
}
