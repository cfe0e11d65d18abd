//! The per-variant edits file passed with `build --edits`.
//!
//! ```yaml
//! - sku: TS001-M-RED
//!   quantity: 3
//! - row: 1
//!   size: XXL
//!   price: 54.00
//!   compare_price: null   # clears the compare price
//! ```

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use shopvar_variants::{EditError, EditSession, VariantEdit};

/// One entry: a target plus the fields to change.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EditEntry {
    pub sku: Option<String>,
    pub row: Option<usize>,
    pub size: Option<String>,
    pub color: Option<String>,
    #[serde(flatten)]
    pub edit: VariantEdit,
}

impl EditEntry {
    /// Short human label for log lines and error messages.
    pub(crate) fn target(&self) -> String {
        match (&self.sku, self.row) {
            (Some(sku), _) => format!("sku {sku}"),
            (None, Some(row)) => format!(
                "row {row} / {} / {}",
                self.size.as_deref().unwrap_or("-"),
                self.color.as_deref().unwrap_or("-")
            ),
            (None, None) => "<no target>".to_string(),
        }
    }
}

/// Outcome of applying an edits file.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct EditTotals {
    pub applied: usize,
    pub skipped: usize,
}

/// Reads an edits file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a list of entries.
pub(crate) fn load_edits(path: &Path) -> anyhow::Result<Vec<EditEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read edits file {}", path.display()))?;
    parse_edits(&content).with_context(|| format!("failed to parse edits file {}", path.display()))
}

pub(crate) fn parse_edits(content: &str) -> anyhow::Result<Vec<EditEntry>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Applies `entries` in order. Entries that cannot be applied are logged and
/// skipped; the rest still go through.
pub(crate) fn apply_edits(session: &mut EditSession, entries: &[EditEntry]) -> EditTotals {
    let mut totals = EditTotals::default();
    for entry in entries {
        match apply_entry(session, entry) {
            Ok(()) => totals.applied += 1,
            Err(e) => {
                tracing::warn!(edit = %entry.target(), error = %e, "skipping edit");
                totals.skipped += 1;
            }
        }
    }
    tracing::info!(
        applied = totals.applied,
        skipped = totals.skipped,
        "applied edits file"
    );
    totals
}

fn apply_entry(session: &mut EditSession, entry: &EditEntry) -> anyhow::Result<()> {
    if entry.edit.is_empty() {
        anyhow::bail!("entry changes no fields");
    }
    if let Some(sku) = &entry.sku {
        session.edit_by_sku(sku, &entry.edit)?;
        return Ok(());
    }
    let Some(row) = entry.row else {
        anyhow::bail!("entry needs either `sku` or `row`");
    };

    // Size and color are matched case-insensitively against generated keys.
    let key = session
        .variants()
        .iter()
        .find(|v| {
            v.row() == row
                && same_axis(v.size(), entry.size.as_deref())
                && same_axis(v.color(), entry.color.as_deref())
        })
        .map(|v| v.key.clone())
        .ok_or_else(|| EditError::UnknownVariant(entry.target()))?;
    session.edit(&key, &entry.edit)?;
    Ok(())
}

fn same_axis(actual: Option<&str>, wanted: Option<&str>) -> bool {
    match (actual, wanted.map(str::trim).filter(|w| !w.is_empty())) {
        (None, None) => true,
        (Some(a), Some(w)) => a.eq_ignore_ascii_case(w),
        _ => false,
    }
}
