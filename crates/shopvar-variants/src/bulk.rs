//! Bulk and per-variant edits that respect user-modified fields.

use rust_decimal::Decimal;
use serde::Deserialize;
use shopvar_core::Variant;

use crate::error::EditError;

/// A direct edit to one variant. Only the fields that are `Some` change.
///
/// `compare_price: Some(None)` clears the compare price.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VariantEdit {
    pub quantity: Option<i64>,
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub compare_price: Option<Option<Decimal>>,
    pub description: Option<String>,
}

impl VariantEdit {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantity.is_none()
            && self.price.is_none()
            && self.compare_price.is_none()
            && self.description.is_none()
    }
}

/// Distinguishes an explicit `null` from an absent field.
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Sets the quantity of every variant whose quantity was not edited by hand.
/// Returns the number of variants changed.
pub fn apply_bulk_quantity(variants: &mut [Variant], quantity: i64) -> usize {
    let mut changed = 0;
    for variant in variants.iter_mut().filter(|v| !v.edits.quantity) {
        if variant.quantity != quantity {
            variant.quantity = quantity;
            changed += 1;
        }
    }
    tracing::debug!(quantity, changed, "applied bulk quantity");
    changed
}

/// Sets (or clears, with `None`) the compare price of every variant whose
/// compare price was not edited by hand. Returns the number changed.
pub fn apply_bulk_compare_price(variants: &mut [Variant], compare_price: Option<Decimal>) -> usize {
    let mut changed = 0;
    for variant in variants.iter_mut().filter(|v| !v.edits.compare_price) {
        if variant.compare_price != compare_price {
            variant.compare_price = compare_price;
            changed += 1;
        }
    }
    tracing::debug!(?compare_price, changed, "applied bulk compare price");
    changed
}

/// Applies `edit` to `variant` and flags every edited field as user-modified.
///
/// # Errors
///
/// Returns [`EditError::NegativePrice`] or [`EditError::NegativeComparePrice`]
/// for negative prices; the variant is left unchanged.
pub fn apply_edit(variant: &mut Variant, edit: &VariantEdit) -> Result<(), EditError> {
    if let Some(price) = edit.price {
        if price.is_sign_negative() && !price.is_zero() {
            return Err(EditError::NegativePrice(price));
        }
    }
    if let Some(Some(compare)) = edit.compare_price {
        if compare.is_sign_negative() && !compare.is_zero() {
            return Err(EditError::NegativeComparePrice(compare));
        }
    }

    if let Some(quantity) = edit.quantity {
        variant.quantity = quantity;
        variant.edits.quantity = true;
    }
    if let Some(price) = edit.price {
        variant.price = price;
        variant.surcharge_percent = None;
        variant.edits.price = true;
    }
    if let Some(compare) = edit.compare_price {
        variant.compare_price = compare;
        variant.edits.compare_price = true;
    }
    if let Some(description) = &edit.description {
        variant.description = Some(description.clone());
        variant.edits.description = true;
    }
    Ok(())
}
