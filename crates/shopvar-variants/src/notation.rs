//! Parsing of the compact size/quantity and color notations used in source sheets.
//!
//! Sizes are written `TOKEN[-QUANTITY]`, comma separated (`"S-4,M-8,L-12"`);
//! colors are plain comma-separated tokens (`"Red, Blue"`). Parsing never fails
//! as a whole: unusable tokens are skipped and reported as [`NotationError`]s.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shopvar_core::SizeQuantity;

use crate::error::NotationError;
use crate::size_order::canonical_size;

/// Result of parsing one size cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSizes {
    /// Sizes in input order, one entry per distinct size.
    pub sizes: Vec<SizeQuantity>,
    /// Skipped or merged tokens, in input order.
    pub errors: Vec<NotationError>,
}

/// Parses a size cell such as `"S-4,M-8,L-12"`.
///
/// Rules:
/// - Tokens are split on commas and trimmed; empty tokens are dropped.
/// - A token is split on its **last** hyphen. If the right side is a whole
///   number it is the quantity and the left side the label (`"X-Large-3"` →
///   `X-Large`, 3). Otherwise the whole token is the label and the quantity is
///   absent (`"Free-Size"` → `Free-Size`).
/// - Standard scale labels are upper-cased (`"xl-2"` → `XL`).
/// - A repeated size keeps the position of its first occurrence and the
///   quantity of its last one; a [`NotationError::DuplicateSize`] is recorded.
#[must_use]
pub fn parse_sizes(raw: &str) -> ParsedSizes {
    let mut parsed = ParsedSizes::default();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let entry = match parse_size_token(token) {
            Ok(entry) => entry,
            Err(err) => {
                parsed.errors.push(err);
                continue;
            }
        };

        let dedup_key = entry.size.to_uppercase();
        if let Some(&idx) = positions.get(&dedup_key) {
            parsed.sizes[idx].quantity = entry.quantity;
            parsed.errors.push(NotationError::DuplicateSize {
                size: parsed.sizes[idx].size.clone(),
            });
        } else {
            positions.insert(dedup_key, parsed.sizes.len());
            parsed.sizes.push(entry);
        }
    }

    parsed
}

/// Parses one trimmed, non-empty size token.
fn parse_size_token(token: &str) -> Result<SizeQuantity, NotationError> {
    if let Some((left, right)) = token.rsplit_once('-') {
        let label = left.trim();
        let qty = right.trim();

        if !qty.is_empty() && qty.bytes().all(|b| b.is_ascii_digit()) {
            check_label(label, token)?;
            let quantity = qty
                .parse::<u32>()
                .map_err(|_| NotationError::QuantityOverflow {
                    token: token.to_owned(),
                })?;
            return Ok(SizeQuantity::new(canonical_size(label), Some(quantity)));
        }

        if looks_decimal(qty) {
            check_label(label, token)?;
            return Ok(SizeQuantity::new(
                canonical_size(label),
                Some(whole_decimal_quantity(qty, token)?),
            ));
        }
    }

    if token.trim_matches('-').trim().is_empty() {
        return Err(NotationError::EmptyLabel {
            token: token.to_owned(),
        });
    }

    Ok(SizeQuantity::new(canonical_size(token), None))
}

fn check_label(label: &str, token: &str) -> Result<(), NotationError> {
    if label.trim_matches('-').trim().is_empty() {
        return Err(NotationError::EmptyLabel {
            token: token.to_owned(),
        });
    }
    // "S--3": the quantity carries a minus sign.
    if label.ends_with('-') {
        return Err(NotationError::NegativeQuantity {
            token: token.to_owned(),
        });
    }
    Ok(())
}

/// `"4.0"` or `"4.5"`: digits with exactly one interior dot.
fn looks_decimal(s: &str) -> bool {
    let mut parts = s.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let frac = parts.next().unwrap_or_default();
    !whole.is_empty()
        && !frac.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && frac.bytes().all(|b| b.is_ascii_digit())
}

/// Accepts `"4.0"` as 4; rejects `"4.5"`.
fn whole_decimal_quantity(qty: &str, token: &str) -> Result<u32, NotationError> {
    let value = Decimal::from_str(qty).map_err(|_| NotationError::QuantityOverflow {
        token: token.to_owned(),
    })?;
    if !value.fract().is_zero() {
        return Err(NotationError::FractionalQuantity {
            token: token.to_owned(),
        });
    }
    value.to_u32().ok_or_else(|| NotationError::QuantityOverflow {
        token: token.to_owned(),
    })
}

/// Parses a color cell into trimmed, de-duplicated tokens.
///
/// Duplicates are detected case-insensitively; the first spelling wins and
/// input order is preserved.
#[must_use]
pub fn parse_colors(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .filter(|c| seen.insert(c.to_lowercase()))
        .map(str::to_owned)
        .collect()
}

/// Re-serializes sizes into `TOKEN[-QUANTITY]` notation, preserving order.
#[must_use]
pub fn format_sizes(sizes: &[SizeQuantity]) -> String {
    sizes
        .iter()
        .map(|s| match s.quantity {
            Some(q) => format!("{}-{q}", s.size),
            None => s.size.clone(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(size: &str, quantity: Option<u32>) -> SizeQuantity {
        SizeQuantity::new(size, quantity)
    }

    // -----------------------------------------------------------------------
    // parse_sizes
    // -----------------------------------------------------------------------

    #[test]
    fn parses_sizes_with_quantities() {
        let parsed = parse_sizes("S-4,M-8,L-12");
        assert_eq!(
            parsed.sizes,
            vec![sq("S", Some(4)), sq("M", Some(8)), sq("L", Some(12))]
        );
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn round_trips_to_original_notation() {
        let raw = "S-4,M-8,L-12";
        assert_eq!(format_sizes(&parse_sizes(raw).sizes), raw);
    }

    #[test]
    fn trims_whitespace_and_drops_empty_tokens() {
        let parsed = parse_sizes("  S - 4 , , M-8,   ");
        assert_eq!(parsed.sizes, vec![sq("S", Some(4)), sq("M", Some(8))]);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn token_without_hyphen_has_no_quantity() {
        let parsed = parse_sizes("S,M");
        assert_eq!(parsed.sizes, vec![sq("S", None), sq("M", None)]);
    }

    #[test]
    fn non_numeric_suffix_keeps_whole_token_as_label() {
        let parsed = parse_sizes("Free-Size");
        assert_eq!(parsed.sizes, vec![sq("Free-Size", None)]);
    }

    #[test]
    fn splits_on_last_hyphen() {
        let parsed = parse_sizes("X-Large-3");
        assert_eq!(parsed.sizes, vec![sq("X-Large", Some(3))]);
    }

    #[test]
    fn standard_labels_are_upper_cased() {
        let parsed = parse_sizes("xl-2,xxl");
        assert_eq!(parsed.sizes, vec![sq("XL", Some(2)), sq("XXL", None)]);
    }

    #[test]
    fn custom_keyword_is_canonicalized() {
        let parsed = parse_sizes("custom");
        assert_eq!(parsed.sizes, vec![sq("Custom", None)]);
    }

    #[test]
    fn whole_decimal_quantity_is_accepted() {
        let parsed = parse_sizes("M-5.0");
        assert_eq!(parsed.sizes, vec![sq("M", Some(5))]);
    }

    #[test]
    fn fractional_quantity_is_skipped() {
        let parsed = parse_sizes("S-4.5,M-2");
        assert_eq!(parsed.sizes, vec![sq("M", Some(2))]);
        assert!(matches!(
            parsed.errors.as_slice(),
            [NotationError::FractionalQuantity { token }] if token == "S-4.5"
        ));
    }

    #[test]
    fn empty_label_is_skipped() {
        let parsed = parse_sizes("-5,M-1");
        assert_eq!(parsed.sizes, vec![sq("M", Some(1))]);
        assert!(matches!(
            parsed.errors.as_slice(),
            [NotationError::EmptyLabel { .. }]
        ));
    }

    #[test]
    fn bare_hyphen_is_skipped() {
        let parsed = parse_sizes("-");
        assert!(parsed.sizes.is_empty());
        assert_eq!(parsed.errors.len(), 1);
    }

    #[test]
    fn negative_quantity_is_skipped() {
        let parsed = parse_sizes("S--3");
        assert!(parsed.sizes.is_empty());
        assert!(matches!(
            parsed.errors.as_slice(),
            [NotationError::NegativeQuantity { .. }]
        ));
    }

    #[test]
    fn overflowing_quantity_is_skipped() {
        let parsed = parse_sizes("S-99999999999");
        assert!(parsed.sizes.is_empty());
        assert!(matches!(
            parsed.errors.as_slice(),
            [NotationError::QuantityOverflow { .. }]
        ));
    }

    #[test]
    fn duplicate_size_last_quantity_wins_first_position_kept() {
        let parsed = parse_sizes("S-4,M-2,s-6");
        assert_eq!(parsed.sizes, vec![sq("S", Some(6)), sq("M", Some(2))]);
        assert!(matches!(
            parsed.errors.as_slice(),
            [NotationError::DuplicateSize { size }] if size == "S"
        ));
    }

    #[test]
    fn numeric_sizes_without_quantity() {
        let parsed = parse_sizes("28,30,32");
        assert_eq!(
            parsed.sizes,
            vec![sq("28", None), sq("30", None), sq("32", None)]
        );
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(parse_sizes(""), ParsedSizes::default());
        assert_eq!(parse_sizes(" , ,"), ParsedSizes::default());
    }

    // -----------------------------------------------------------------------
    // parse_colors
    // -----------------------------------------------------------------------

    #[test]
    fn colors_are_trimmed_and_ordered() {
        assert_eq!(
            parse_colors(" Red , Blue,Black "),
            vec!["Red", "Blue", "Black"]
        );
    }

    #[test]
    fn colors_dedup_case_insensitively_keeping_first() {
        assert_eq!(parse_colors("Red,blue,RED,Blue"), vec!["Red", "blue"]);
    }

    #[test]
    fn colors_drop_empty_tokens() {
        assert_eq!(parse_colors(",,Red,, "), vec!["Red"]);
        assert!(parse_colors("").is_empty());
    }

    // -----------------------------------------------------------------------
    // format_sizes
    // -----------------------------------------------------------------------

    #[test]
    fn format_sizes_omits_missing_quantities() {
        let sizes = vec![sq("S", Some(4)), sq("Free Size", None)];
        assert_eq!(format_sizes(&sizes), "S-4,Free Size");
    }
}
