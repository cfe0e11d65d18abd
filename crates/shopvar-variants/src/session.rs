//! A single editing session over the variants generated from one batch.
//!
//! The session is the only owner of the variant table. Every mutation goes
//! through it, so user-modified flags, removals and enrichment results survive
//! regeneration.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;
use shopvar_core::{
    IssueReport, ProcessingSettings, SourceRow, ValidationIssue, Variant, VariantKey,
};

use crate::bulk::{apply_bulk_compare_price, apply_bulk_quantity, apply_edit, VariantEdit};
use crate::error::EditError;
use crate::generate::generate_variants;
use crate::merge::{merge_enrichment, EnrichmentOutcome, MergeSummary};
use crate::surcharge::apply_surcharges;
use crate::validate::build_report;

#[derive(Debug, Clone)]
pub struct EditSession {
    rows: Vec<SourceRow>,
    settings: ProcessingSettings,
    variants: Vec<Variant>,
    intake_issues: IssueReport,
    generation_issues: IssueReport,
    excluded_rows: Vec<usize>,
    removed: HashSet<VariantKey>,
    enrichments: BTreeMap<usize, EnrichmentOutcome>,
}

impl EditSession {
    /// Generates variants for `rows` and applies the configured surcharges.
    #[must_use]
    pub fn new(rows: Vec<SourceRow>, settings: ProcessingSettings) -> Self {
        let mut session = Self {
            rows,
            settings,
            variants: Vec::new(),
            intake_issues: IssueReport::new(),
            generation_issues: IssueReport::new(),
            excluded_rows: Vec::new(),
            removed: HashSet::new(),
            enrichments: BTreeMap::new(),
        };
        session.regenerate(false);
        session
    }

    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    #[must_use]
    pub fn rows(&self) -> &[SourceRow] {
        &self.rows
    }

    #[must_use]
    pub fn settings(&self) -> &ProcessingSettings {
        &self.settings
    }

    /// Rows that produced no variants in the last generation.
    #[must_use]
    pub fn excluded_rows(&self) -> &[usize] {
        &self.excluded_rows
    }

    /// Keeps issues raised while reading the source file. They survive
    /// regeneration and lead every report.
    pub fn record_intake_issues(&mut self, issues: impl IntoIterator<Item = ValidationIssue>) {
        self.intake_issues.extend(issues);
    }

    /// Issues raised while parsing and generating, before validation.
    #[must_use]
    pub fn generation_issues(&self) -> &IssueReport {
        &self.generation_issues
    }

    #[must_use]
    pub fn find(&self, key: &VariantKey) -> Option<&Variant> {
        self.variants.iter().find(|v| &v.key == key)
    }

    /// Looks a variant up by SKU, case-insensitively.
    #[must_use]
    pub fn find_by_sku(&self, sku: &str) -> Option<&Variant> {
        let sku = sku.trim();
        self.variants
            .iter()
            .find(|v| v.sku.as_deref().is_some_and(|s| s.eq_ignore_ascii_case(sku)))
    }

    pub fn apply_bulk_quantity(&mut self, quantity: i64) -> usize {
        apply_bulk_quantity(&mut self.variants, quantity)
    }

    pub fn apply_bulk_compare_price(&mut self, compare_price: Option<Decimal>) -> usize {
        apply_bulk_compare_price(&mut self.variants, compare_price)
    }

    /// Applies a manual edit to the variant identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownVariant`] when no variant has that key, or
    /// the error from [`apply_edit`].
    pub fn edit(&mut self, key: &VariantKey, edit: &VariantEdit) -> Result<(), EditError> {
        let variant = self
            .variants
            .iter_mut()
            .find(|v| &v.key == key)
            .ok_or_else(|| EditError::UnknownVariant(key.to_string()))?;
        apply_edit(variant, edit)?;
        tracing::debug!(variant = %key, "applied manual edit");
        Ok(())
    }

    /// Applies a manual edit to the variant with `sku` and returns its key.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::UnknownSku`] when no variant has that SKU, or the
    /// error from [`apply_edit`].
    pub fn edit_by_sku(&mut self, sku: &str, edit: &VariantEdit) -> Result<VariantKey, EditError> {
        let key = self
            .find_by_sku(sku)
            .map(|v| v.key.clone())
            .ok_or_else(|| EditError::UnknownSku(sku.to_string()))?;
        self.edit(&key, edit)?;
        Ok(key)
    }

    /// Re-applies the surcharge settings. Returns the number of surcharged
    /// variants.
    pub fn reprice(&mut self) -> usize {
        apply_surcharges(&mut self.variants, &self.settings.surcharge)
    }

    /// Swaps in new settings and regenerates, keeping user edits.
    pub fn update_settings(&mut self, settings: ProcessingSettings) {
        self.settings = settings;
        self.regenerate(true);
    }

    /// Merges an enrichment outcome for `row`. The outcome is remembered and
    /// re-merged after regeneration.
    pub fn merge_enrichment(&mut self, row: usize, outcome: EnrichmentOutcome) -> MergeSummary {
        let summary = merge_enrichment(&mut self.variants, row, &outcome);
        self.enrichments.insert(row, outcome);
        summary
    }

    /// Drops one variant. It stays dropped across regeneration.
    pub fn remove_variant(&mut self, key: &VariantKey) -> Option<Variant> {
        let pos = self.variants.iter().position(|v| &v.key == key)?;
        self.removed.insert(key.clone());
        Some(self.variants.remove(pos))
    }

    /// Drops every variant of `row`; returns how many were removed.
    pub fn remove_row(&mut self, row: usize) -> usize {
        let before = self.variants.len();
        let removed = &mut self.removed;
        self.variants.retain(|v| {
            if v.row() == row {
                removed.insert(v.key.clone());
                false
            } else {
                true
            }
        });
        before - self.variants.len()
    }

    /// Rebuilds the variant table from the source rows and current settings.
    ///
    /// With `preserve_edits`, every user-modified field of a variant whose key
    /// survives is carried over along with its flag. Without it, edits are
    /// discarded. Removed variants stay removed and remembered enrichment is
    /// merged again either way.
    pub fn regenerate(&mut self, preserve_edits: bool) {
        let generation = generate_variants(&self.rows, &self.settings);
        let previous = std::mem::take(&mut self.variants);

        self.variants = generation
            .variants
            .into_iter()
            .filter(|v| !self.removed.contains(&v.key))
            .collect();
        self.generation_issues = generation.issues;
        self.excluded_rows = generation.excluded_rows;

        apply_surcharges(&mut self.variants, &self.settings.surcharge);

        for (row, outcome) in &self.enrichments {
            merge_enrichment(&mut self.variants, *row, outcome);
        }

        if preserve_edits {
            let mut carried = 0usize;
            for old in previous.iter().filter(|v| v.edits.any()) {
                if let Some(new) = self.variants.iter_mut().find(|v| v.key == old.key) {
                    carry_edits(old, new);
                    carried += 1;
                }
            }
            tracing::debug!(carried, "preserved user edits across regeneration");
        }

        tracing::info!(
            variants = self.variants.len(),
            excluded = self.excluded_rows.len(),
            "generated variants"
        );
    }

    /// Intake and generation issues plus a fresh validation pass.
    #[must_use]
    pub fn validate(&self) -> IssueReport {
        let mut upstream = self.intake_issues.clone();
        upstream.extend(self.generation_issues.iter().cloned());
        build_report(&upstream, &self.variants)
    }

    #[must_use]
    pub fn into_variants(self) -> Vec<Variant> {
        self.variants
    }
}

fn carry_edits(old: &Variant, new: &mut Variant) {
    if old.edits.quantity {
        new.quantity = old.quantity;
    }
    if old.edits.price {
        new.price = old.price;
        new.surcharge_percent = None;
    }
    if old.edits.compare_price {
        new.compare_price = old.compare_price;
    }
    if old.edits.description {
        new.description.clone_from(&old.description);
    }
    new.edits = old.edits;
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
