//! Rank assignment for size tokens.
//!
//! The rank is a sort key only: unknown tokens are never rejected, they sort
//! after everything the scale knows about.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use shopvar_core::SizeScaleSettings;

/// The standard apparel scale, smallest first.
pub const STANDARD_SIZES: [&str; 12] = [
    "XXS", "XS", "S", "M", "L", "XL", "XXL", "XXXL", "2XL", "3XL", "4XL", "5XL",
];

/// Canonical spelling of a size label: standard tokens upper-cased, `custom`
/// as `Custom`, anything else trimmed with its casing kept.
pub(crate) fn canonical_size(label: &str) -> String {
    let trimmed = label.trim();
    let upper = trimmed.to_ascii_uppercase();
    if STANDARD_SIZES.contains(&upper.as_str()) {
        return upper;
    }
    if trimmed.eq_ignore_ascii_case("custom") {
        return "Custom".to_string();
    }
    trimmed.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    Standard,
    Extra,
    Numeric,
    Other,
}

/// Sort key for a size token. Compare ranks, never the tokens themselves.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SizeRank {
    tier: Tier,
    value: Decimal,
    position: usize,
}

impl SizeRank {
    /// `true` when the token was not found on the standard or extended scale
    /// and is not numeric.
    #[must_use]
    pub fn is_unranked(&self) -> bool {
        self.tier == Tier::Other
    }
}

/// Total order over size tokens: standard scale, then the configured
/// extension list, then numeric sizes by value, then everything else in
/// first-seen order.
#[derive(Debug, Clone)]
pub struct SizeOrdering {
    extra: Vec<String>,
    numeric_sizes: bool,
}

impl Default for SizeOrdering {
    fn default() -> Self {
        Self::new(&SizeScaleSettings::default())
    }
}

impl SizeOrdering {
    #[must_use]
    pub fn new(settings: &SizeScaleSettings) -> Self {
        Self {
            extra: settings
                .extra
                .iter()
                .map(|s| s.trim().to_uppercase())
                .collect(),
            numeric_sizes: settings.numeric_sizes,
        }
    }

    /// Rank of `token`. `first_seen` is the token's first position in the
    /// list being sorted and only matters for unranked tokens.
    #[must_use]
    pub fn rank(&self, token: &str, first_seen: usize) -> SizeRank {
        let trimmed = token.trim();
        let upper = trimmed.to_uppercase();

        if let Some(pos) = STANDARD_SIZES.iter().position(|s| *s == upper) {
            return SizeRank {
                tier: Tier::Standard,
                value: Decimal::ZERO,
                position: pos,
            };
        }
        if let Some(pos) = self.extra.iter().position(|s| *s == upper) {
            return SizeRank {
                tier: Tier::Extra,
                value: Decimal::ZERO,
                position: pos,
            };
        }
        if self.numeric_sizes {
            if let Ok(value) = Decimal::from_str(trimmed) {
                if !value.is_sign_negative() {
                    return SizeRank {
                        tier: Tier::Numeric,
                        value: value.normalize(),
                        position: 0,
                    };
                }
            }
        }
        SizeRank {
            tier: Tier::Other,
            value: Decimal::ZERO,
            position: first_seen,
        }
    }

    /// Stable sort of `items` by the rank of the size each one carries.
    /// Items without a size sort ahead of sized ones.
    pub fn sort_by_size<T, F>(&self, items: &mut [T], size_of: F)
    where
        F: Fn(&T) -> Option<&str>,
    {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        for item in items.iter() {
            if let Some(size) = size_of(item) {
                let next = first_seen.len();
                first_seen.entry(size.trim().to_uppercase()).or_insert(next);
            }
        }

        items.sort_by_cached_key(|item| {
            size_of(item).map(|size| {
                let seen = first_seen
                    .get(&size.trim().to_uppercase())
                    .copied()
                    .unwrap_or(usize::MAX);
                self.rank(size, seen)
            })
        });
    }

    /// Sorted copy of `tokens`.
    #[must_use]
    pub fn sorted<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        let mut out: Vec<String> = tokens.iter().map(|t| t.as_ref().to_string()).collect();
        self.sort_by_size(&mut out, |t| Some(t.as_str()));
        out
    }
}
