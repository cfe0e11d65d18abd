//! Per-row enrichment in the configured mode.

use shopvar_core::{AiMode, AppConfig, Enrichment};

use crate::client::TextGenerator;
use crate::error::EnrichError;
use crate::prompts::{first_sentence, parse_rewrite, parse_tags, rewrite_prompt, tags_prompt};
use crate::retry::{Pacer, RetryPolicy};

/// Produces an [`Enrichment`] for one product. Side-effect free apart from
/// the model calls.
#[derive(Debug)]
pub struct Enricher<G> {
    generator: G,
    mode: AiMode,
    retry: RetryPolicy,
}

impl<G: TextGenerator> Enricher<G> {
    #[must_use]
    pub fn new(generator: G, mode: AiMode, retry: RetryPolicy) -> Self {
        Self {
            generator,
            mode,
            retry,
        }
    }

    /// Enricher using the retry settings from `config`.
    #[must_use]
    pub fn from_config(generator: G, mode: AiMode, config: &AppConfig) -> Self {
        Self::new(generator, mode, RetryPolicy::from_config(config))
    }

    #[must_use]
    pub fn mode(&self) -> AiMode {
        self.mode
    }

    /// Enriches one product.
    ///
    /// - `default` mode returns the description verbatim with no tags.
    /// - `simple` keeps the first sentence and asks the model for tags.
    /// - `full` asks the model for a rewritten description and tags.
    ///
    /// A blank description yields an empty enrichment without any call.
    ///
    /// # Errors
    ///
    /// Returns the last [`EnrichError`] once retries are exhausted, or
    /// [`EnrichError::EmptyResponse`] when a rewrite comes back blank.
    pub async fn enrich(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<Enrichment, EnrichError> {
        self.enrich_paced(title, description, &Pacer::unpaced()).await
    }

    /// [`Enricher::enrich`] with every model attempt, retries included,
    /// spaced by `pacer`.
    pub(crate) async fn enrich_paced(
        &self,
        title: &str,
        description: Option<&str>,
        pacer: &Pacer,
    ) -> Result<Enrichment, EnrichError> {
        let Some(raw) = description.filter(|d| !d.trim().is_empty()) else {
            return Ok(Enrichment::default());
        };
        let description = raw.trim();

        match self.mode {
            AiMode::Default => Ok(Enrichment {
                description: raw.to_string(),
                tags: Vec::new(),
            }),
            AiMode::Simple => {
                let sentence = first_sentence(description);
                let prompt = tags_prompt(&sentence);
                let reply = self.call(&prompt, pacer).await?;
                Ok(Enrichment {
                    description: sentence,
                    tags: parse_tags(&reply),
                })
            }
            AiMode::Full => {
                let prompt = rewrite_prompt(title, description);
                let reply = self.call(&prompt, pacer).await?;
                let (rewritten, tags) = parse_rewrite(&reply);
                if rewritten.is_empty() {
                    return Err(EnrichError::EmptyResponse);
                }
                Ok(Enrichment {
                    description: rewritten,
                    tags,
                })
            }
        }
    }

    async fn call(&self, prompt: &str, pacer: &Pacer) -> Result<String, EnrichError> {
        self.retry
            .run(pacer, || self.generator.generate(prompt))
            .await
    }
}
