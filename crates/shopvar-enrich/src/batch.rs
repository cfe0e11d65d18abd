//! Concurrent, paced enrichment of many rows.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use shopvar_core::{AppConfig, Enrichment, EnrichmentFailure, SourceRow};

use crate::client::TextGenerator;
use crate::enricher::Enricher;
use crate::retry::Pacer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Rows in flight at once.
    pub max_concurrent: usize,
    /// Minimum gap between the starts of two consecutive requests, retries
    /// included.
    pub inter_request_delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            inter_request_delay: Duration::from_millis(100),
        }
    }
}

impl BatchOptions {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_concurrent: config.ai_max_concurrent.max(1),
            inter_request_delay: Duration::from_millis(config.ai_inter_request_delay_ms),
        }
    }
}

/// Enriches every row, at most `max_concurrent` at a time.
///
/// Returns one outcome per row, ordered by row index. A failed row becomes an
/// [`EnrichmentFailure`] and never affects the others.
pub async fn enrich_rows<G: TextGenerator>(
    enricher: &Enricher<G>,
    rows: &[SourceRow],
    options: &BatchOptions,
) -> Vec<(usize, Result<Enrichment, EnrichmentFailure>)> {
    let pacer = Pacer::new(options.inter_request_delay);
    let pacer = &pacer;

    let mut outcomes: Vec<(usize, Result<Enrichment, EnrichmentFailure>)> = stream::iter(rows)
        .map(|row| async move {
            let title = row.title.as_deref().unwrap_or_default();
            let outcome = enricher
                .enrich_paced(title, row.description.as_deref(), pacer)
                .await
                .map_err(|e| {
                    tracing::warn!(row = row.index, error = %e, "enrichment failed");
                    EnrichmentFailure::new(e.to_string())
                });
            (row.index, outcome)
        })
        .buffer_unordered(options.max_concurrent.max(1))
        .collect()
        .await;

    outcomes.sort_by_key(|(index, _)| *index);

    let failed = outcomes.iter().filter(|(_, o)| o.is_err()).count();
    tracing::info!(
        rows = outcomes.len(),
        failed,
        mode = %enricher.mode(),
        "enrichment complete"
    );
    outcomes
}
