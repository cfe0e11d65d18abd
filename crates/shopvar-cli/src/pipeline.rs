//! Command handlers for `build`, `validate`, and `sizes`.
//!
//! Each handler loads settings, runs the variant engine over the input and
//! prints a short summary. Per-row problems end up in the issue report; only
//! I/O, configuration, and an input with nothing to process are errors.

use std::path::{Path, PathBuf};

use anyhow::Context;
use shopvar_core::{AiMode, AppConfig, IssueReport, ProcessingSettings, SizeQuantity, SourceRow};
use shopvar_enrich::{enrich_rows, BatchOptions, Enricher, GeminiClient};
use shopvar_variants::{format_sizes, parse_sizes, EditSession, SizeOrdering};

use crate::edits::{apply_edits, load_edits};

/// Arguments of the `build` command.
#[derive(Debug, Clone)]
pub(crate) struct BuildOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub report: Option<PathBuf>,
    pub edits: Option<PathBuf>,
    pub settings: Option<PathBuf>,
    pub ai_mode: Option<AiMode>,
}

/// Full pipeline: read, generate, enrich, edit, validate, export.
///
/// # Errors
///
/// Returns an error if settings or input cannot be read, no row yields a
/// variant, or the output files cannot be written.
pub(crate) async fn run_build(config: &AppConfig, options: &BuildOptions) -> anyhow::Result<()> {
    let mut settings = resolve_settings(config, options.settings.as_deref())?;
    if let Some(mode) = options.ai_mode {
        settings.ai_mode = mode;
    }

    let mut session = open_session(&options.input, settings)?;

    enrich_session(config, &mut session).await?;

    if let Some(path) = &options.edits {
        let entries = load_edits(path)?;
        let totals = apply_edits(&mut session, &entries);
        if totals.skipped > 0 {
            println!(
                "edits: {} applied, {} skipped (see log)",
                totals.applied, totals.skipped
            );
        }
    }

    let report = session.validate();
    let lines = shopvar_io::write_shopify_file(&options.output, session.variants(), session.settings())
        .with_context(|| format!("failed to write {}", options.output.display()))?;
    if let Some(path) = &options.report {
        shopvar_io::write_report(path, &report)?;
    }

    println!(
        "wrote {lines} variants to {} ({} rows excluded)",
        options.output.display(),
        session.excluded_rows().len()
    );
    print_summary(&report);
    Ok(())
}

/// Generates and validates without exporting.
///
/// # Errors
///
/// Same as [`run_build`], minus the export.
pub(crate) fn run_validate(
    config: &AppConfig,
    input: &Path,
    report_path: Option<&Path>,
    settings_path: Option<&Path>,
) -> anyhow::Result<()> {
    let settings = resolve_settings(config, settings_path)?;
    let session = open_session(input, settings)?;
    let report = session.validate();

    if let Some(path) = report_path {
        shopvar_io::write_report(path, &report)?;
    }

    println!(
        "{} variants from {} rows ({} excluded)",
        session.variants().len(),
        session.rows().len(),
        session.excluded_rows().len()
    );
    print_summary(&report);
    for issue in report.iter() {
        println!("  {issue}");
    }
    Ok(())
}

/// Parses size cells and prints them in size order.
///
/// # Errors
///
/// Returns an error if the settings file exists but is invalid.
pub(crate) fn run_sizes(
    config: &AppConfig,
    tokens: &[String],
    settings_path: Option<&Path>,
) -> anyhow::Result<()> {
    let settings = resolve_settings(config, settings_path)?;
    let ordering = SizeOrdering::new(&settings.size_scale);

    let parsed = parse_sizes(&tokens.join(","));
    for err in &parsed.errors {
        println!("warning: {err}");
    }

    let mut sizes = parsed.sizes;
    ordering.sort_by_size(&mut sizes, |s| Some(s.size.as_str()));
    println!("{}", format_sizes(&sizes));
    for line in size_lines(&ordering, &sizes, settings.fallback_quantity) {
        println!("{line}");
    }
    Ok(())
}

/// One line per sorted size: token, quantity, and a marker for tokens that
/// sort last because no scale knows them.
fn size_lines(ordering: &SizeOrdering, sizes: &[SizeQuantity], fallback: u32) -> Vec<String> {
    sizes
        .iter()
        .enumerate()
        .map(|(idx, size)| {
            let quantity = size
                .quantity
                .map_or_else(|| format!("(fallback {fallback})"), |q| q.to_string());
            let line = format!("{:<12}{quantity}", size.size);
            if ordering.rank(&size.size, idx).is_unranked() {
                format!("{line} (unranked)")
            } else {
                line
            }
        })
        .collect()
}

/// Settings from `--settings`, else from `SHOPVAR_SETTINGS_PATH`. A missing
/// default file means defaults; a missing explicit file is an error.
fn resolve_settings(
    config: &AppConfig,
    explicit: Option<&Path>,
) -> anyhow::Result<ProcessingSettings> {
    match explicit {
        Some(path) => shopvar_core::load_settings(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => shopvar_core::load_settings_or_default(&config.settings_path).with_context(|| {
            format!(
                "failed to load settings from {}",
                config.settings_path.display()
            )
        }),
    }
}

fn open_session(input: &Path, settings: ProcessingSettings) -> anyhow::Result<EditSession> {
    let ingest = shopvar_io::read_source_file(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    if ingest.rows.is_empty() {
        anyhow::bail!("{} contains no product rows", input.display());
    }

    let mut session = EditSession::new(ingest.rows, settings);
    session.record_intake_issues(ingest.issues);
    if session.variants().is_empty() {
        anyhow::bail!(
            "no processable rows in {}: all {} rows were excluded",
            input.display(),
            session.rows().len()
        );
    }
    Ok(session)
}

/// Runs AI enrichment when the mode asks for it and a key is configured,
/// then merges every outcome into the session.
async fn enrich_session(config: &AppConfig, session: &mut EditSession) -> anyhow::Result<()> {
    let mode = session.settings().ai_mode;
    if mode == AiMode::Default {
        return Ok(());
    }
    let Some(client) = GeminiClient::from_config(config)? else {
        tracing::warn!(%mode, "GEMINI_API_KEY is not set; skipping enrichment");
        return Ok(());
    };

    let rows: Vec<SourceRow> = session
        .rows()
        .iter()
        .filter(|r| !session.excluded_rows().contains(&r.index))
        .cloned()
        .collect();

    let enricher = Enricher::from_config(client, mode, config);
    let options = BatchOptions::from_config(config);
    tracing::info!(
        rows = rows.len(),
        %mode,
        max_concurrent = options.max_concurrent,
        "enriching descriptions"
    );

    let mut failed = 0usize;
    for (row, outcome) in enrich_rows(&enricher, &rows, &options).await {
        if outcome.is_err() {
            failed += 1;
        }
        session.merge_enrichment(row, outcome);
    }
    if failed > 0 {
        println!("enrichment failed for {failed} rows; original descriptions kept");
    }
    Ok(())
}

fn print_summary(report: &IssueReport) {
    if report.is_empty() {
        println!("no issues found");
        return;
    }
    println!("{} issues:", report.len());
    for (kind, count) in &report.summary {
        println!("  {kind:<22}{count}");
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
