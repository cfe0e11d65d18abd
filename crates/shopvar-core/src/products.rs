use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-\s]+").expect("valid separator regex"));

/// Lower-cases a column name and collapses runs of `_`, `-` and whitespace
/// into a single space: `"Product_Code"` → `"product code"`.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    let header = header.trim_start_matches('\u{feff}').trim().to_lowercase();
    SEPARATORS.replace_all(&header, " ").trim().to_string()
}

/// One input record, as read from the source sheet. Cells are kept raw;
/// interpretation (notation parsing, price parsing) happens downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRow {
    /// 0-based position among the data rows of the input.
    pub index: usize,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Raw color list, e.g. `"Red, Blue"`.
    pub colors: Option<String>,
    /// Raw size notation, e.g. `"S-4,M-8,L-12"`.
    pub sizes: Option<String>,
    /// Base SKU / product code.
    pub sku: Option<String>,
    pub price: Option<String>,
    pub compare_price: Option<String>,
    pub product_category: Option<String>,
    pub product_type: Option<String>,
    /// Raw publish flag, e.g. `"active"`.
    pub published: Option<String>,
    /// Every other non-blank cell, keyed by normalized column name. Known
    /// detail columns (fabric, fit, wash care, ...) use their canonical name.
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl SourceRow {
    /// `true` when the publish cell reads `active`, `true`, `yes` or `1`.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.published.as_deref().is_some_and(|p| {
            matches!(
                p.trim().to_ascii_lowercase().as_str(),
                "active" | "true" | "yes" | "1"
            )
        })
    }

    /// Non-blank cell for `column`: a core field by its canonical name
    /// (`title`, `description`, `sizes`, ...) or any detail column.
    #[must_use]
    pub fn value(&self, column: &str) -> Option<&str> {
        let key = normalize_header(column);
        let cell = match key.as_str() {
            "title" => self.title.as_deref(),
            "description" => self.description.as_deref(),
            "colors" => self.colors.as_deref(),
            "sizes" => self.sizes.as_deref(),
            "sku" => self.sku.as_deref(),
            "price" => self.price.as_deref(),
            "compare price" => self.compare_price.as_deref(),
            "product category" => self.product_category.as_deref(),
            "product type" => self.product_type.as_deref(),
            "published" => self.published.as_deref(),
            other => self.details.get(other).map(String::as_str),
        };
        cell.filter(|v| !v.trim().is_empty())
    }
}

/// A parsed size token and its optional inventory quantity (`M-8` → `M`, 8).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeQuantity {
    pub size: String,
    pub quantity: Option<u32>,
}

impl SizeQuantity {
    #[must_use]
    pub fn new(size: impl Into<String>, quantity: Option<u32>) -> Self {
        Self {
            size: size.into(),
            quantity,
        }
    }
}

/// Identity of a variant within one processing run.
///
/// `None` on an axis means the row had no tokens on it (the implicit default).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariantKey {
    pub row: usize,
    pub size: Option<String>,
    pub color: Option<String>,
}

impl VariantKey {
    #[must_use]
    pub fn new(row: usize, size: Option<&str>, color: Option<&str>) -> Self {
        Self {
            row,
            size: size.map(str::to_owned),
            color: color.map(str::to_owned),
        }
    }
}

impl std::fmt::Display for VariantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "row {} / {} / {}",
            self.row,
            self.size.as_deref().unwrap_or("-"),
            self.color.as_deref().unwrap_or("-")
        )
    }
}

/// Per-field record of direct human edits.
///
/// A set flag protects that field from bulk operations, surcharge re-runs,
/// enrichment, and regeneration with preserved edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEdits {
    pub quantity: bool,
    pub price: bool,
    pub compare_price: bool,
    pub description: bool,
}

impl UserEdits {
    #[must_use]
    pub fn any(&self) -> bool {
        self.quantity || self.price || self.compare_price || self.description
    }
}

/// One sellable size/color combination derived from a [`SourceRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub key: VariantKey,
    pub title: String,
    /// Shopify URL handle shared by every variant of the product.
    pub handle: String,
    pub sku: Option<String>,
    /// Inventory count. Signed so that bad manual edits surface in validation.
    pub quantity: i64,
    /// Row price before any surcharge.
    pub base_price: Decimal,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Surcharge percentage that produced `price`, if any.
    pub surcharge_percent: Option<Decimal>,
    pub product_category: Option<String>,
    pub product_type: Option<String>,
    pub published: bool,
    pub edits: UserEdits,
}

impl Variant {
    #[must_use]
    pub fn size(&self) -> Option<&str> {
        self.key.size.as_deref()
    }

    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.key.color.as_deref()
    }

    #[must_use]
    pub fn row(&self) -> usize {
        self.key.row
    }
}

/// AI-provided replacement text for a row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub description: String,
    pub tags: Vec<String>,
}

/// Enrichment could not be produced for a row; the original text is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("enrichment failed: {reason}")]
pub struct EnrichmentFailure {
    pub reason: String,
}

impl EnrichmentFailure {
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
