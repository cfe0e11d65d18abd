//! Expansion of source rows into size × color variants.

use std::str::FromStr;

use rust_decimal::Decimal;
use shopvar_core::{
    IssueKind, IssueReport, ProcessingSettings, SizeQuantity, SourceRow, UserEdits,
    ValidationIssue, Variant, VariantKey,
};

use crate::describe::compose_description;
use crate::error::NotationError;
use crate::notation::{parse_colors, parse_sizes};
use crate::size_order::SizeOrdering;
use crate::sku::{handle_for, variant_sku, HandleRegistry, SkuRegistry};

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// Output of [`generate_variants`].
#[derive(Debug, Clone, Default)]
pub struct Generation {
    /// Variants in source row order; within a row by color input order, then
    /// by size rank.
    pub variants: Vec<Variant>,
    pub issues: IssueReport,
    /// Indices of rows that produced no variants.
    pub excluded_rows: Vec<usize>,
}

/// Parses a price cell: `"299"`, `" $1,299.50 "`, `"-5"`.
///
/// Returns `None` for blank or unparseable input. Negative values are
/// returned as-is; callers decide whether they are acceptable.
#[must_use]
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let digits: String = rest
        .trim_start_matches(&CURRENCY_SYMBOLS[..])
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let digits = digits.trim();
    if digits.is_empty() {
        return None;
    }
    let value = Decimal::from_str(digits).ok()?;
    Some(if negative { -value } else { value })
}

/// SKUs and handles handed out so far in one generation run.
#[derive(Debug, Default)]
struct Claims {
    skus: SkuRegistry,
    handles: HandleRegistry,
}

/// Expands every row into its variants.
///
/// Never fails: rows without a title or a usable price are excluded with a
/// `row_excluded` issue and the batch continues. Every expanded row gets a
/// handle of its own.
#[must_use]
pub fn generate_variants(rows: &[SourceRow], settings: &ProcessingSettings) -> Generation {
    let ordering = SizeOrdering::new(&settings.size_scale);
    let mut claims = Claims::default();
    let mut generation = Generation::default();

    for row in rows {
        match expand_row(row, settings, &ordering, &mut claims, &mut generation.issues) {
            Some(variants) => {
                tracing::debug!(row = row.index, variants = variants.len(), "expanded row");
                generation.variants.extend(variants);
            }
            None => generation.excluded_rows.push(row.index),
        }
    }

    generation
}

/// Expands one row, or returns `None` after recording why it was excluded.
fn expand_row(
    row: &SourceRow,
    settings: &ProcessingSettings,
    ordering: &SizeOrdering,
    claims: &mut Claims,
    issues: &mut IssueReport,
) -> Option<Vec<Variant>> {
    let Some(title) = non_blank(row.title.as_deref()) else {
        exclude(row.index, "missing title", issues);
        return None;
    };

    let base_price = match non_blank(row.price.as_deref()) {
        None => {
            exclude(row.index, "missing price", issues);
            return None;
        }
        Some(raw) => match parse_price(raw) {
            None => {
                exclude(row.index, &format!("unparseable price \"{raw}\""), issues);
                return None;
            }
            Some(p) if p.is_sign_negative() && !p.is_zero() => {
                exclude(row.index, &format!("negative price {p}"), issues);
                return None;
            }
            Some(p) => p,
        },
    };

    let row_compare = parse_compare_price(row, issues);
    let compare_price = settings.bulk_compare_price.or(row_compare);

    let parsed = parse_sizes(row.sizes.as_deref().unwrap_or_default());
    for err in &parsed.errors {
        let kind = match err {
            NotationError::DuplicateSize { .. } => IssueKind::DuplicateSize,
            _ => IssueKind::ParseIssue,
        };
        issues.push(ValidationIssue::row(row.index, kind, err.to_string()));
    }

    let mut sizes = parsed.sizes;
    ordering.sort_by_size(&mut sizes, |s| Some(s.size.as_str()));
    let size_axis: Vec<Option<&SizeQuantity>> = if sizes.is_empty() {
        vec![None]
    } else {
        sizes.iter().map(Some).collect()
    };

    let colors = parse_colors(row.colors.as_deref().unwrap_or_default());
    let color_axis: Vec<Option<&str>> = if colors.is_empty() {
        vec![None]
    } else {
        colors.iter().map(|c| Some(c.as_str())).collect()
    };

    let base_sku = non_blank(row.sku.as_deref());
    let handle = claims.handles.claim(&handle_for(title, base_sku), row.index);
    let description = if settings.description_elements.is_empty() {
        row.description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(str::to_string)
    } else {
        compose_description(&settings.description_elements, row)
    };
    let product_category = non_blank(row.product_category.as_deref()).map(str::to_string);
    let product_type = non_blank(row.product_type.as_deref()).map(str::to_string);
    let published = row.is_published();

    let mut variants = Vec::with_capacity(size_axis.len() * color_axis.len());
    for color in &color_axis {
        for size in &size_axis {
            let size_token = size.map(|s| s.size.as_str());
            let key = VariantKey::new(row.index, size_token, *color);

            let quantity = settings.bulk_quantity.map_or_else(
                || match size.and_then(|s| s.quantity) {
                    Some(q) if q > 0 => i64::from(q),
                    _ => i64::from(settings.fallback_quantity),
                },
                i64::from,
            );

            let sku = base_sku.map(|base| {
                let candidate = variant_sku(base, size_token, *color);
                let (sku, unique) = claims.skus.claim(&candidate);
                if !unique {
                    tracing::warn!(sku = %candidate, row = row.index, "SKU suffixes exhausted");
                    issues.push(ValidationIssue::variant(
                        &key,
                        IssueKind::SkuCollision,
                        format!("SKU \"{candidate}\" collides and no free suffix remains"),
                    ));
                }
                sku
            });

            variants.push(Variant {
                key,
                title: title.to_string(),
                handle: handle.clone(),
                sku,
                quantity,
                base_price,
                price: base_price,
                compare_price,
                description: description.clone(),
                tags: Vec::new(),
                surcharge_percent: None,
                product_category: product_category.clone(),
                product_type: product_type.clone(),
                published,
                edits: UserEdits::default(),
            });
        }
    }

    Some(variants)
}

/// Row compare price: blank or zero is absent; garbage or negative is absent
/// with a parse issue.
fn parse_compare_price(row: &SourceRow, issues: &mut IssueReport) -> Option<Decimal> {
    let raw = non_blank(row.compare_price.as_deref())?;
    match parse_price(raw) {
        Some(p) if p.is_zero() => None,
        Some(p) if p.is_sign_negative() => {
            issues.push(ValidationIssue::row(
                row.index,
                IssueKind::ParseIssue,
                format!("negative compare price {p} ignored"),
            ));
            None
        }
        Some(p) => Some(p),
        None => {
            issues.push(ValidationIssue::row(
                row.index,
                IssueKind::ParseIssue,
                format!("unparseable compare price \"{raw}\" ignored"),
            ));
            None
        }
    }
}

fn exclude(row: usize, reason: &str, issues: &mut IssueReport) {
    tracing::warn!(row, reason, "row excluded");
    issues.push(ValidationIssue::row(row, IssueKind::RowExcluded, reason));
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
