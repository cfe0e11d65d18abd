//! SKU composition, collision suffixes, and Shopify handles.

use std::collections::HashSet;

/// Highest numeric suffix tried when disambiguating a colliding SKU.
pub const MAX_SKU_SUFFIX: u32 = 99;

/// Joins the base SKU with the size and color tokens: `TS001-M-Red`.
///
/// Whitespace inside a token becomes `-`; missing or blank parts are skipped.
#[must_use]
pub fn variant_sku(base: &str, size: Option<&str>, color: Option<&str>) -> String {
    [Some(base), size, color]
        .into_iter()
        .flatten()
        .map(|part| part.split_whitespace().collect::<Vec<_>>().join("-"))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// URL slug for a product: `title-sku`, or the title alone.
///
/// Keeps lower-cased alphanumerics of any script and `-`; whitespace, `_`
/// and `/` become `-`, other punctuation is dropped and separator runs
/// collapse. May be empty; [`HandleRegistry::claim`] supplies the fallback.
#[must_use]
pub fn handle_for(title: &str, base_sku: Option<&str>) -> String {
    let source = match base_sku.map(str::trim).filter(|s| !s.is_empty()) {
        Some(sku) => format!("{title}-{sku}"),
        None => title.to_string(),
    };
    source
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' {
                c
            } else if c.is_whitespace() || c == '_' || c == '/' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Tracks SKUs handed out in one run and disambiguates repeats.
#[derive(Debug, Default, Clone)]
pub struct SkuRegistry {
    taken: HashSet<String>,
}

impl SkuRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `candidate`, appending `-2` … `-99` when it is already taken
    /// (case-insensitively).
    ///
    /// Returns the SKU to use and whether it is unique. When every suffix is
    /// taken the candidate is returned unchanged with `false`.
    pub fn claim(&mut self, candidate: &str) -> (String, bool) {
        if self.taken.insert(candidate.to_uppercase()) {
            return (candidate.to_string(), true);
        }
        for n in 2..=MAX_SKU_SUFFIX {
            let attempt = format!("{candidate}-{n}");
            if self.taken.insert(attempt.to_uppercase()) {
                return (attempt, true);
            }
        }
        (candidate.to_string(), false)
    }
}

/// Hands out one distinct handle per source row, so that separate rows never
/// merge into one Shopify product.
#[derive(Debug, Default, Clone)]
pub struct HandleRegistry {
    taken: HashSet<String>,
}

impl HandleRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for `row`: `slug` when free, else `slug-2`, `slug-3`, ... An
    /// empty slug becomes `product-<row>`.
    pub fn claim(&mut self, slug: &str, row: usize) -> String {
        let base = if slug.is_empty() {
            format!("product-{row}")
        } else {
            slug.to_string()
        };
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut n = 2usize;
        loop {
            let attempt = format!("{base}-{n}");
            if self.taken.insert(attempt.clone()) {
                return attempt;
            }
            n += 1;
        }
    }
}
