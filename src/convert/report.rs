//! Run report: what went in, what came out, and which degrade paths fired.

use serde::Serialize;
use std::fmt;

use crate::split::SplitCounts;

/// Summary of one conversion (and, once known, split) run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    pub input: SourceCounts,
    pub output: LabelCounts,
    /// Filled in after the dataset has been partitioned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<SplitCounts>,
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }

    /// Returns true if any issue with the given code was recorded.
    pub fn has(&self, code: ConversionIssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  input: {} images, {} categories, {} annotations",
            self.input.images, self.input.categories, self.input.annotations
        )?;
        writeln!(
            f,
            "  output: {} label files, {} labels",
            self.output.label_files, self.output.labels
        )?;

        if let Some(split) = &self.split {
            writeln!(
                f,
                "  split: {} train, {} validation, {} test",
                split.train, split.validation, split.test
            )?;
        }

        for (severity, title) in [
            (ConversionSeverity::Warning, "Warnings"),
            (ConversionSeverity::Info, "Notes"),
        ] {
            let matching: Vec<&ConversionIssue> = self
                .issues
                .iter()
                .filter(|i| i.severity == severity)
                .collect();
            if matching.is_empty() {
                continue;
            }

            writeln!(f)?;
            writeln!(f, "{} ({}):", title, matching.len())?;
            for issue in matching {
                writeln!(f, "  - {}", issue.message)?;
            }
        }

        Ok(())
    }
}

/// Counts taken from the source manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SourceCounts {
    pub images: usize,
    pub categories: usize,
    pub annotations: usize,
}

/// Counts of the converted label set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LabelCounts {
    /// One per source image, including empty ones.
    pub label_files: usize,
    pub labels: usize,
    pub unknown_category_labels: usize,
    pub dropped_annotations: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    Warning,
    Info,
}

/// Stable issue codes for the JSON report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// Annotations referencing an image id that is not in the manifest were dropped.
    DroppedUnknownImage,
    /// Annotations referencing an unlisted category were labelled with class -1.
    UnknownCategory,
    /// Category ids do not form a contiguous range starting at 1.
    CategoryIdGaps,
    /// Some images have no annotations; they get empty label files.
    EmptyImages,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_has_no_issues() {
        let report = ConversionReport::default();
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.info_count(), 0);
    }

    #[test]
    fn display_groups_issues_by_severity() {
        let mut report = ConversionReport::default();
        report.add(ConversionIssue::warning(
            ConversionIssueCode::DroppedUnknownImage,
            "2 annotation(s) dropped",
        ));
        report.add(ConversionIssue::info(
            ConversionIssueCode::EmptyImages,
            "1 image(s) without annotations",
        ));
        report.split = Some(SplitCounts {
            train: 6,
            validation: 2,
            test: 2,
        });

        let text = report.to_string();
        assert!(text.contains("Warnings (1):"));
        assert!(text.contains("Notes (1):"));
        assert!(text.contains("6 train, 2 validation, 2 test"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = ConversionReport::default();
        report.input.images = 3;
        report.add(ConversionIssue::warning(
            ConversionIssueCode::UnknownCategory,
            "1 annotation(s) mapped to class -1",
        ));

        let json = serde_json::to_string(&report).expect("serialize report");
        assert!(json.contains("\"images\":3"));
        assert!(json.contains("\"code\":\"unknown_category\""));
        assert!(!json.contains("\"split\""));
    }
}
