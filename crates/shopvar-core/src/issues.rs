//! Non-fatal issues collected while processing a batch.
//!
//! Nothing here is raised as an error: every stage appends to an
//! [`IssueReport`] that travels with the export.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::products::VariantKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A malformed size, color, or price cell was skipped.
    ParseIssue,
    /// A size token repeated within one row.
    DuplicateSize,
    /// A row was left out of variant generation.
    RowExcluded,
    /// SKU disambiguation ran out of suffixes.
    SkuCollision,
    NonPositivePrice,
    CompareBelowPrice,
    NegativeQuantity,
    MissingSku,
    MissingTitle,
    DuplicateSku,
}

impl IssueKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::ParseIssue => "parse_issue",
            IssueKind::DuplicateSize => "duplicate_size",
            IssueKind::RowExcluded => "row_excluded",
            IssueKind::SkuCollision => "sku_collision",
            IssueKind::NonPositivePrice => "non_positive_price",
            IssueKind::CompareBelowPrice => "compare_below_price",
            IssueKind::NegativeQuantity => "negative_quantity",
            IssueKind::MissingSku => "missing_sku",
            IssueKind::MissingTitle => "missing_title",
            IssueKind::DuplicateSku => "duplicate_sku",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an issue points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IssueSubject {
    Row { row: usize },
    Variant { key: VariantKey },
}

impl std::fmt::Display for IssueSubject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueSubject::Row { row } => write!(f, "row {row}"),
            IssueSubject::Variant { key } => write!(f, "{key}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub subject: IssueSubject,
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    #[must_use]
    pub fn row(row: usize, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            subject: IssueSubject::Row { row },
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn variant(key: &VariantKey, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            subject: IssueSubject::Variant { key: key.clone() },
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.subject, self.message)
    }
}

/// Issues plus a per-kind count, serialized as the batch report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueReport {
    pub summary: BTreeMap<IssueKind, usize>,
    pub issues: Vec<ValidationIssue>,
}

impl IssueReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        *self.summary.entry(issue.kind).or_insert(0) += 1;
        self.issues.push(issue);
    }

    /// Number of issues of `kind`.
    #[must_use]
    pub fn count(&self, kind: IssueKind) -> usize {
        self.summary.get(&kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter()
    }
}

impl Extend<ValidationIssue> for IssueReport {
    fn extend<T: IntoIterator<Item = ValidationIssue>>(&mut self, iter: T) {
        for issue in iter {
            self.push(issue);
        }
    }
}

impl FromIterator<ValidationIssue> for IssueReport {
    fn from_iter<T: IntoIterator<Item = ValidationIssue>>(iter: T) -> Self {
        let mut report = IssueReport::new();
        report.extend(iter);
        report
    }
}
