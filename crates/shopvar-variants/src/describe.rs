//! Product bodies composed from several source columns.

use std::str::FromStr;

use rust_decimal::Decimal;
use shopvar_core::{normalize_header, DescriptionElement, HtmlTag, SourceRow};

/// Columns whose numeric values are always written as whole numbers.
const COUNT_COLUMNS: [&str; 5] = ["components", "quantity", "qty", "count", "pieces"];

/// Builds the HTML body for `row` from `elements`, in ascending `order`.
///
/// Elements whose column is blank in this row are skipped. Returns `None`
/// when nothing was emitted.
#[must_use]
pub fn compose_description(elements: &[DescriptionElement], row: &SourceRow) -> Option<String> {
    let mut ordered: Vec<&DescriptionElement> = elements.iter().collect();
    ordered.sort_by_key(|e| e.order);

    let parts: Vec<String> = ordered
        .into_iter()
        .filter_map(|element| {
            let value = clean_value(&element.column, row.value(&element.column)?);
            let label = element.label.as_deref().map(str::trim).filter(|l| !l.is_empty());
            Some(render(element.tag, label, &value))
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join(" "))
}

fn render(tag: HtmlTag, label: Option<&str>, value: &str) -> String {
    let name = tag.name();
    match (tag, label) {
        (HtmlTag::Plain, Some(label)) => format!("{label}: {value}"),
        (HtmlTag::Br, Some(label)) => format!("{label}: {value}<br>"),
        (HtmlTag::Li, Some(label)) => format!("<li>{label}: {value}</li>"),
        (HtmlTag::P, Some(label)) => format!("<p>{label}: {value}</p>"),
        // Heading-like tags mark up the label only.
        (_, Some(label)) => format!("<p><{name}>{label} : </{name}> {value}</p>"),
        (HtmlTag::Plain, None) => value.to_string(),
        (HtmlTag::Br, None) => format!("{value}<br>"),
        (HtmlTag::Li, None) => format!("<li>{value}</li>"),
        (HtmlTag::P, None) => format!("<p>{value}</p>"),
        (_, None) => format!("<p><{name}>{value}</{name}></p>"),
    }
}

/// Trims the cell and drops spreadsheet float noise: `"3.0"` → `"3"`. Count
/// columns are truncated to whole numbers.
fn clean_value(column: &str, raw: &str) -> String {
    let trimmed = raw.trim();
    let column = normalize_header(column);
    let is_count = COUNT_COLUMNS.iter().any(|c| column.contains(c));
    // Codes such as "001" only look numeric.
    if !is_count && !trimmed.contains('.') {
        return trimmed.to_string();
    }
    let Ok(number) = Decimal::from_str(trimmed) else {
        return trimmed.to_string();
    };
    if is_count || number.fract().is_zero() {
        number.trunc().normalize().to_string()
    } else {
        trimmed.to_string()
    }
}
