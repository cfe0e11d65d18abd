//! Size-keyed percentage price increases.

use rust_decimal::{Decimal, RoundingStrategy};
use shopvar_core::{SurchargeSettings, Variant};

/// Recomputes `variant.price` from its base price.
///
/// Returns `true` when the price was recomputed. Variants with a
/// user-edited price are left alone. A non-positive base price is never
/// surcharged.
pub fn apply_surcharge(variant: &mut Variant, settings: &SurchargeSettings) -> bool {
    if variant.edits.price {
        return false;
    }

    let pct = settings
        .percent_for(variant.size())
        .filter(|_| variant.base_price > Decimal::ZERO);

    match pct {
        Some(pct) => {
            let factor = Decimal::ONE + pct / Decimal::ONE_HUNDRED;
            variant.price = (variant.base_price * factor)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            variant.surcharge_percent = Some(pct);
        }
        None => {
            variant.price = variant.base_price;
            variant.surcharge_percent = None;
        }
    }
    true
}

/// Applies [`apply_surcharge`] to every variant; returns how many carry a
/// surcharge afterwards.
pub fn apply_surcharges(variants: &mut [Variant], settings: &SurchargeSettings) -> usize {
    let mut surcharged = 0;
    for variant in variants.iter_mut() {
        apply_surcharge(variant, settings);
        if variant.surcharge_percent.is_some() {
            surcharged += 1;
        }
    }
    tracing::debug!(surcharged, total = variants.len(), "applied surcharges");
    surcharged
}
