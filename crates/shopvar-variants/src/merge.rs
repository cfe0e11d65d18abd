//! Merging AI enrichment results into generated variants.

use shopvar_core::{Enrichment, EnrichmentFailure, Variant};

/// Enrichment result for one source row.
pub type EnrichmentOutcome = Result<Enrichment, EnrichmentFailure>;

/// Counts from one [`merge_enrichment`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Variants of the row that were touched.
    pub matched: usize,
    /// Variants whose description was replaced.
    pub descriptions_written: usize,
    /// Variants whose description was kept because it was edited by hand.
    pub descriptions_protected: usize,
}

/// Merges the enrichment outcome for `row` into its variants.
///
/// On success the description replaces every unedited description of the
/// row and the tags replace every variant's tags. On failure descriptions are
/// kept verbatim and tags are cleared. Other rows are never touched.
pub fn merge_enrichment(
    variants: &mut [Variant],
    row: usize,
    outcome: &EnrichmentOutcome,
) -> MergeSummary {
    let mut summary = MergeSummary::default();

    if let Err(failure) = outcome {
        tracing::warn!(row, error = %failure, "enrichment failed; keeping original description");
    }

    for variant in variants.iter_mut().filter(|v| v.row() == row) {
        summary.matched += 1;
        match outcome {
            Ok(enrichment) => {
                if variant.edits.description {
                    summary.descriptions_protected += 1;
                } else if !enrichment.description.trim().is_empty() {
                    variant.description = Some(enrichment.description.clone());
                    summary.descriptions_written += 1;
                }
                variant.tags.clone_from(&enrichment.tags);
            }
            Err(_) => variant.tags.clear(),
        }
    }

    summary
}
