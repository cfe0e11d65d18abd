//! Mapping of free-form spreadsheet headers onto source fields.
//!
//! Headers are matched in three passes: exact alias lookup, fuzzy name
//! similarity, then a look at the column's first values. Each pass only
//! claims fields the earlier passes left open.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
pub use shopvar_core::normalize_header;

/// Minimum name similarity for a fuzzy match.
const FUZZY_THRESHOLD: f64 = 0.7;
/// Score given when one cleaned name contains the other.
const CONTAINMENT_SCORE: f64 = 0.8;
/// Shorter names than this never get the containment score.
const MIN_CONTAINED_LEN: usize = 4;
/// Non-blank values inspected per column during content detection.
const CONTENT_SAMPLE: usize = 10;

static NAME_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-\s]+").expect("valid name noise regex"));
static PRICE_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[₹$€£,\s]").expect("valid price noise regex"));
static SIZE_PATTERNS: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        r"\b(xs|s|m|l|xl|xxl|xxxl)\b",
        r"\b\d{1,2}\b",
        r"\b(small|medium|large)\b",
        r"\b\d{1,2}-\d+\b",
    ]
    .map(|p| Regex::new(p).expect("valid size pattern regex"))
});
static CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid code regex"));

const STATUS_WORDS: [&str; 9] = [
    "active",
    "inactive",
    "draft",
    "published",
    "unpublished",
    "true",
    "false",
    "yes",
    "no",
];
const COLOR_WORDS: [&str; 16] = [
    "red", "blue", "green", "yellow", "black", "white", "pink", "purple", "orange", "brown",
    "gray", "grey", "navy", "maroon", "teal", "cyan",
];
const CATEGORY_WORDS: [&str; 12] = [
    "shirt",
    "dress",
    "pants",
    "jeans",
    "jacket",
    "shoes",
    "bag",
    "jewelry",
    "clothing",
    "apparel",
    "accessories",
    "footwear",
];
const CODE_NAME_HINTS: [&str; 5] = ["sku", "code", "id", "number", "ref"];

/// A field of [`shopvar_core::SourceRow`] that can be read from a column.
///
/// The variants from `Fabric` on are product details: they land in
/// `SourceRow::details` under [`SourceField::detail_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceField {
    Title,
    Description,
    Colors,
    Sku,
    Sizes,
    Price,
    ComparePrice,
    ProductCategory,
    ProductType,
    Published,
    Fabric,
    Fit,
    WashCare,
    CelebsName,
    DeliveryTime,
    Components,
    Embroidery,
    Technique,
    SizesInfo,
}

/// Accepted header spellings per field, already normalized.
const ALIASES: &[(SourceField, &[&str])] = &[
    (
        SourceField::Title,
        &["title", "product title", "name", "product name"],
    ),
    (
        SourceField::Description,
        &[
            "description",
            "product description",
            "desc",
            "body",
            "body (html)",
        ],
    ),
    (
        SourceField::Colors,
        &["colour", "color", "colors", "colours", "option2 value"],
    ),
    (
        SourceField::Sku,
        &["product code", "sku", "product sku", "item code", "variant sku"],
    ),
    (
        SourceField::Sizes,
        &["size", "sizes", "variant size", "option1 value"],
    ),
    (
        SourceField::Price,
        &["variant price", "price", "unit price", "cost"],
    ),
    (
        SourceField::ComparePrice,
        &[
            "variant compare at price",
            "compare price",
            "compare at price",
            "original price",
        ],
    ),
    (SourceField::ProductCategory, &["product category", "category"]),
    (SourceField::ProductType, &["type", "product type"]),
    (
        SourceField::Published,
        &["published", "status", "active", "publish status"],
    ),
    (
        SourceField::Components,
        &[
            "no of components",
            "components",
            "number of components",
            "component count",
        ],
    ),
    (SourceField::Fabric, &["fabric", "material", "fabric type"]),
    (SourceField::CelebsName, &["celebs name", "celebrity name"]),
    (SourceField::Fit, &["fit", "fitting", "size fit"]),
    (SourceField::SizesInfo, &["sizes info", "size info"]),
    (SourceField::DeliveryTime, &["delivery time", "shipping time"]),
    (SourceField::WashCare, &["wash care", "care instructions"]),
    (
        SourceField::Technique,
        &["technique used", "manufacturing technique"],
    ),
    (SourceField::Embroidery, &["embroidery details", "embroidery"]),
];

impl SourceField {
    /// Field a header maps to by exact alias, if any.
    #[must_use]
    pub fn from_header(header: &str) -> Option<Self> {
        let normalized = normalize_header(header);
        ALIASES
            .iter()
            .find(|(_, aliases)| aliases.contains(&normalized.as_str()))
            .map(|(field, _)| *field)
    }

    /// Key under which a detail field is stored in `SourceRow::details`;
    /// `None` for the core fields.
    #[must_use]
    pub fn detail_key(self) -> Option<&'static str> {
        match self {
            Self::Fabric => Some("fabric"),
            Self::Fit => Some("fit"),
            Self::WashCare => Some("wash care"),
            Self::CelebsName => Some("celebs name"),
            Self::DeliveryTime => Some("delivery time"),
            Self::Components => Some("no of components"),
            Self::Embroidery => Some("embroidery"),
            Self::Technique => Some("technique used"),
            Self::SizesInfo => Some("sizes info"),
            Self::Title
            | Self::Description
            | Self::Colors
            | Self::Sku
            | Self::Sizes
            | Self::Price
            | Self::ComparePrice
            | Self::ProductCategory
            | Self::ProductType
            | Self::Published => None,
        }
    }
}

/// How a column was matched to its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMethod {
    Exact,
    Fuzzy,
    Content,
}

/// One header → field decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub header: String,
    pub field: SourceField,
    pub method: MatchMethod,
    pub confidence: f64,
}

/// Column positions of the recognized fields in one header row.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    positions: HashMap<SourceField, usize>,
    detections: Vec<Detection>,
    unmapped: Vec<(usize, String)>,
}

impl ColumnMap {
    /// Maps each header to a field by exact alias. When two columns map to
    /// the same field the leftmost one wins.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = Self::default();
        let mut open = Vec::new();
        for (idx, header) in headers.into_iter().enumerate() {
            match SourceField::from_header(header) {
                Some(field) if !map.positions.contains_key(&field) => {
                    map.claim(idx, header, field, MatchMethod::Exact, 1.0);
                }
                _ if !header.trim().is_empty() => open.push((idx, header.to_string())),
                _ => {}
            }
        }
        map.unmapped = open;
        map
    }

    /// Maps headers by exact alias, then by name similarity, then by the
    /// content of the first `records`.
    pub fn detect(headers: &[String], records: &[Vec<String>]) -> Self {
        let mut map = Self::from_headers(headers.iter().map(String::as_str));

        let open = std::mem::take(&mut map.unmapped);
        let mut still_open = Vec::new();
        for (idx, header) in open {
            match best_fuzzy_field(&header, &map.positions) {
                Some((field, score)) => map.claim(idx, &header, field, MatchMethod::Fuzzy, score),
                None => still_open.push((idx, header)),
            }
        }

        let mut unmapped = Vec::new();
        for (idx, header) in still_open {
            let sample: Vec<String> = records
                .iter()
                .filter_map(|r| r.get(idx))
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .take(CONTENT_SAMPLE)
                .collect();
            match detect_content(&sample, &header) {
                Some((field, confidence)) if !map.positions.contains_key(&field) => {
                    map.claim(idx, &header, field, MatchMethod::Content, confidence);
                }
                _ => unmapped.push((idx, header)),
            }
        }
        map.unmapped = unmapped;

        for d in map
            .detections
            .iter()
            .filter(|d| d.method != MatchMethod::Exact)
        {
            tracing::info!(
                header = %d.header,
                field = ?d.field,
                method = ?d.method,
                confidence = d.confidence,
                "mapped column"
            );
        }
        map
    }

    fn claim(
        &mut self,
        idx: usize,
        header: &str,
        field: SourceField,
        method: MatchMethod,
        confidence: f64,
    ) {
        self.positions.insert(field, idx);
        self.detections.push(Detection {
            header: header.to_string(),
            field,
            method,
            confidence,
        });
    }

    #[must_use]
    pub fn position(&self, field: SourceField) -> Option<usize> {
        self.positions.get(&field).copied()
    }

    #[must_use]
    pub fn contains(&self, field: SourceField) -> bool {
        self.positions.contains_key(&field)
    }

    /// Fields with their column positions.
    pub fn fields(&self) -> impl Iterator<Item = (SourceField, usize)> + '_ {
        self.positions.iter().map(|(f, p)| (*f, *p))
    }

    /// Every mapping decision, in the order it was made.
    #[must_use]
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Non-blank headers that matched no field, with their positions, in
    /// column order.
    #[must_use]
    pub fn unmapped(&self) -> &[(usize, String)] {
        &self.unmapped
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn clean_name(name: &str) -> String {
    NAME_NOISE.replace_all(&name.to_lowercase(), "").into_owned()
}

fn best_fuzzy_field(
    header: &str,
    taken: &HashMap<SourceField, usize>,
) -> Option<(SourceField, f64)> {
    let header = clean_name(header);
    let mut best: Option<(SourceField, f64)> = None;
    for (field, aliases) in ALIASES {
        if taken.contains_key(field) {
            continue;
        }
        for alias in *aliases {
            let score = name_similarity(&header, &clean_name(alias));
            if score > FUZZY_THRESHOLD && best.is_none_or(|(_, b)| score > b) {
                best = Some((*field, score));
            }
        }
    }
    best
}

fn name_similarity(a: &str, b: &str) -> f64 {
    let score = similarity(a, b);
    let shorter = a.chars().count().min(b.chars().count());
    if shorter >= MIN_CONTAINED_LEN && (a.contains(b) || b.contains(a)) {
        score.max(CONTAINMENT_SCORE)
    } else {
        score
    }
}

/// Ratcliff/Obershelp similarity: twice the matched characters over the
/// combined length.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    fraction(2 * matching_chars(&a, &b), total)
}

#[allow(clippy::cast_precision_loss)]
fn fraction(part: usize, whole: usize) -> f64 {
    part as f64 / whole as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_common_run(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + len..], &b[j + len..])
}

/// Start in `a`, start in `b` and length of the longest common substring;
/// the earliest one on ties.
fn longest_common_run(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        let mut row = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                row[j + 1] = prev[j] + 1;
                if row[j + 1] > best.2 {
                    best = (i + 1 - row[j + 1], j + 1 - row[j + 1], row[j + 1]);
                }
            }
        }
        prev = row;
    }
    best
}

/// Field a column's lower-cased sample values suggest, with a confidence.
fn detect_content(sample: &[String], header: &str) -> Option<(SourceField, f64)> {
    if sample.is_empty() {
        return None;
    }
    let count = |pred: &dyn Fn(&str) -> bool| {
        fraction(sample.iter().filter(|v| pred(v)).count(), sample.len())
    };

    if count(&looks_like_price) > 0.7 {
        return Some((SourceField::Price, 0.8));
    }
    if count(&|v| STATUS_WORDS.contains(&v)) > 0.6 {
        return Some((SourceField::Published, 0.7));
    }
    if count(&|v| SIZE_PATTERNS.iter().any(|p| p.is_match(v))) > 0.6 {
        return Some((SourceField::Sizes, 0.7));
    }
    if count(&|v| COLOR_WORDS.iter().any(|c| v.contains(c))) > 0.6 {
        return Some((SourceField::Colors, 0.7));
    }
    if count(&|v| CATEGORY_WORDS.iter().any(|c| v.contains(c))) > 0.5 {
        return Some((SourceField::ProductCategory, 0.6));
    }
    let name = header.to_lowercase();
    let name_bonus = if CODE_NAME_HINTS.iter().any(|h| name.contains(h)) {
        0.3
    } else {
        0.0
    };
    // Plain words also fit the code charset; a code carries a digit.
    let codes = count(&|v| {
        v.chars().count() > 2 && CODE.is_match(v) && v.chars().any(|c| c.is_ascii_digit())
    });
    if (codes + name_bonus).min(1.0) > 0.7 {
        return Some((SourceField::Sku, 0.8));
    }
    None
}

fn looks_like_price(value: &str) -> bool {
    PRICE_NOISE
        .replace_all(value, "")
        .parse::<f64>()
        .is_ok_and(|n| n > 0.0 && n < 100_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn records(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| (*s).to_string()).collect())
            .collect()
    }

    // -----------------------------------------------------------------------
    // exact aliases
    // -----------------------------------------------------------------------

    #[test]
    fn from_header_matches_aliases_case_insensitively() {
        assert_eq!(SourceField::from_header("PRODUCT NAME"), Some(SourceField::Title));
        assert_eq!(SourceField::from_header("Colour"), Some(SourceField::Colors));
        assert_eq!(SourceField::from_header("item_code"), Some(SourceField::Sku));
        assert_eq!(
            SourceField::from_header("Variant Compare At Price"),
            Some(SourceField::ComparePrice)
        );
        assert_eq!(SourceField::from_header("Option1 Value"), Some(SourceField::Sizes));
        assert_eq!(SourceField::from_header("Status"), Some(SourceField::Published));
        assert_eq!(SourceField::from_header("Weight"), None);
    }

    #[test]
    fn detail_aliases_map_to_canonical_keys() {
        for (header, key) in [
            ("Material", "fabric"),
            ("Care_Instructions", "wash care"),
            ("Celebrity Name", "celebs name"),
            ("Number of Components", "no of components"),
            ("Shipping Time", "delivery time"),
            ("Manufacturing Technique", "technique used"),
            ("Embroidery Details", "embroidery"),
            ("Size Fit", "fit"),
            ("Size Info", "sizes info"),
        ] {
            let field = SourceField::from_header(header).expect(header);
            assert_eq!(field.detail_key(), Some(key), "{header}");
        }
        assert_eq!(SourceField::Title.detail_key(), None);
    }

    #[test]
    fn column_map_keeps_leftmost_duplicate() {
        let map = ColumnMap::from_headers(["Name", "Price", "Title", "Notes", ""]);
        assert_eq!(map.position(SourceField::Title), Some(0));
        assert_eq!(map.position(SourceField::Price), Some(1));
        assert!(!map.contains(SourceField::Sizes));
        assert_eq!(
            map.unmapped(),
            &[(2, "Title".to_string()), (3, "Notes".to_string())]
        );
    }

    #[test]
    fn column_map_empty_when_nothing_matches() {
        let map = ColumnMap::from_headers(["foo", "bar"]);
        assert!(map.is_empty());
    }

    // -----------------------------------------------------------------------
    // fuzzy names
    // -----------------------------------------------------------------------

    #[test]
    fn similarity_matches_ratcliff_obershelp() {
        assert!((similarity("abcd", "bcde") - 0.75).abs() < 1e-9);
        assert!((similarity("", "") - 1.0).abs() < 1e-9);
        assert!(similarity("prodctname", "productname") > 0.9);
        assert!(similarity("notes", "sizes") < 0.5);
    }

    #[test]
    fn misspelled_headers_map_by_similarity() {
        let map = ColumnMap::detect(&headers(&["Prodct Name", "Pric", "Colr"]), &[]);
        assert_eq!(map.position(SourceField::Title), Some(0));
        assert_eq!(map.position(SourceField::Price), Some(1));
        assert_eq!(map.position(SourceField::Colors), Some(2));
        assert!(map
            .detections()
            .iter()
            .all(|d| d.method == MatchMethod::Fuzzy && d.confidence > FUZZY_THRESHOLD));
    }

    #[test]
    fn fuzzy_match_skips_claimed_fields() {
        let map = ColumnMap::detect(&headers(&["Title", "Titel"]), &[]);
        assert_eq!(map.position(SourceField::Title), Some(0));
        assert_eq!(map.unmapped(), &[(1, "Titel".to_string())]);
    }

    #[test]
    fn short_names_do_not_match_by_containment() {
        assert!(name_similarity("id", "productid") < FUZZY_THRESHOLD);
        assert!((name_similarity("fabricsource", "fabric") - CONTAINMENT_SCORE).abs() < 1e-9);
    }

    // -----------------------------------------------------------------------
    // content
    // -----------------------------------------------------------------------

    #[test]
    fn unnamed_columns_map_by_content() {
        let map = ColumnMap::detect(
            &headers(&["Name", "Amount", "Options", "Shade"]),
            &records(&[
                &["Kurta", "₹1,299", "S-4,M-8", "Red"],
                &["Tee", "299", "M", "navy blue"],
                &["Hoodie", "59.00", "XL-2", "Grey"],
            ]),
        );
        assert_eq!(map.position(SourceField::Price), Some(1));
        assert_eq!(map.position(SourceField::Sizes), Some(2));
        assert_eq!(map.position(SourceField::Colors), Some(3));
        let price = map
            .detections()
            .iter()
            .find(|d| d.field == SourceField::Price)
            .expect("price detection");
        assert_eq!(price.method, MatchMethod::Content);
    }

    #[test]
    fn code_columns_need_digits_or_a_hinting_name() {
        let map = ColumnMap::detect(
            &headers(&["Title", "Notes"]),
            &records(&[&["A", "fragile"], &["B", "handle-with-care"]]),
        );
        assert!(!map.contains(SourceField::Sku));
        assert_eq!(map.unmapped(), &[(1, "Notes".to_string())]);

        let map = ColumnMap::detect(
            &headers(&["Title", "Ref"]),
            &records(&[&["A", "KR-101"], &["B", "KR-102"]]),
        );
        assert_eq!(map.position(SourceField::Sku), Some(1));
    }

    #[test]
    fn content_never_overrides_a_named_column() {
        let map = ColumnMap::detect(
            &headers(&["Price", "Other"]),
            &records(&[&["10", "20"], &["11", "21"]]),
        );
        assert_eq!(map.position(SourceField::Price), Some(0));
        assert_eq!(map.unmapped(), &[(1, "Other".to_string())]);
    }
}
