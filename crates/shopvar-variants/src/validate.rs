//! Pricing and data anomaly checks. Issues are reported, never enforced.

use std::collections::HashMap;

use rust_decimal::Decimal;
use shopvar_core::{IssueKind, IssueReport, ValidationIssue, Variant, VariantKey};

/// Checks every variant and returns the issues found, in variant order.
#[must_use]
pub fn validate_variants(variants: &[Variant]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut first_by_sku: HashMap<String, &VariantKey> = HashMap::new();

    for variant in variants {
        let key = &variant.key;

        if variant.title.trim().is_empty() {
            issues.push(ValidationIssue::variant(
                key,
                IssueKind::MissingTitle,
                "variant has no title",
            ));
        }

        if variant.price <= Decimal::ZERO {
            issues.push(ValidationIssue::variant(
                key,
                IssueKind::NonPositivePrice,
                format!("price {:.2} is not positive", variant.price),
            ));
        }

        if let Some(compare) = variant.compare_price {
            if compare < variant.price {
                issues.push(ValidationIssue::variant(
                    key,
                    IssueKind::CompareBelowPrice,
                    format!(
                        "compare price {compare:.2} is below price {:.2}",
                        variant.price
                    ),
                ));
            }
        }

        if variant.quantity < 0 {
            issues.push(ValidationIssue::variant(
                key,
                IssueKind::NegativeQuantity,
                format!("quantity {} is negative", variant.quantity),
            ));
        }

        match variant.sku.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => issues.push(ValidationIssue::variant(
                key,
                IssueKind::MissingSku,
                "variant has no SKU",
            )),
            Some(sku) => {
                if let Some(first) = first_by_sku.get(&sku.to_uppercase()) {
                    issues.push(ValidationIssue::variant(
                        key,
                        IssueKind::DuplicateSku,
                        format!("SKU \"{sku}\" is also used by {first}"),
                    ));
                } else {
                    first_by_sku.insert(sku.to_uppercase(), key);
                }
            }
        }
    }

    issues
}

/// Combines issues collected upstream (parsing, generation) with a fresh
/// validation pass over `variants`.
#[must_use]
pub fn build_report(upstream: &IssueReport, variants: &[Variant]) -> IssueReport {
    let mut report = upstream.clone();
    report.extend(validate_variants(variants));
    tracing::info!(
        issues = report.len(),
        variants = variants.len(),
        "validation complete"
    );
    report
}
