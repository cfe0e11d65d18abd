//! Shopify product-import CSV and JSON issue report output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use rust_decimal::Decimal;
use shopvar_core::{IssueReport, ProcessingSettings, Variant};

use crate::error::ExportError;

/// Shopify product CSV columns, in import order.
pub const SHOPIFY_COLUMNS: [&str; 70] = [
    "Handle",
    "Title",
    "Body (HTML)",
    "Vendor",
    "Product Category",
    "Type",
    "Tags",
    "Published",
    "Option1 Name",
    "Option1 Value",
    "Option1 Linked To",
    "Option2 Name",
    "Option2 Value",
    "Option2 Linked To",
    "Option3 Name",
    "Option3 Value",
    "Option3 Linked To",
    "Variant SKU",
    "Variant Grams",
    "Variant Inventory Tracker",
    "Variant Inventory Qty",
    "Variant Inventory Policy",
    "Variant Fulfillment Service",
    "Variant Price",
    "Variant Compare At Price",
    "Variant Requires Shipping",
    "Variant Taxable",
    "Unit Price Total Measure",
    "Unit Price Total Measure Unit",
    "Unit Price Base Measure",
    "Unit Price Base Measure Unit",
    "Variant Barcode",
    "Image Src",
    "Image Position",
    "Image Alt Text",
    "Gift Card",
    "SEO Title",
    "SEO Description",
    "Google Shopping / Google Product Category",
    "Google Shopping / Gender",
    "Google Shopping / Age Group",
    "Google Shopping / MPN",
    "Google Shopping / Condition",
    "Google Shopping / Custom Product",
    "Google Shopping / Custom Label 0",
    "Google Shopping / Custom Label 1",
    "Google Shopping / Custom Label 2",
    "Google Shopping / Custom Label 3",
    "Google Shopping / Custom Label 4",
    "Gender (product.metafields.custom.gender)",
    "Google: Custom Product (product.metafields.mm-google-shopping.custom_product)",
    "Age group (product.metafields.shopify.age-group)",
    "Color (product.metafields.shopify.color-pattern)",
    "Dress occasion (product.metafields.shopify.dress-occasion)",
    "Dress style (product.metafields.shopify.dress-style)",
    "Fabric (product.metafields.shopify.fabric)",
    "Neckline (product.metafields.shopify.neckline)",
    "Size (product.metafields.shopify.size)",
    "Skirt/Dress length type (product.metafields.shopify.skirt-dress-length-type)",
    "Sleeve length type (product.metafields.shopify.sleeve-length-type)",
    "Target gender (product.metafields.shopify.target-gender)",
    "Complementary products (product.metafields.shopify--discovery--product_recommendation.complementary_products)",
    "Related products (product.metafields.shopify--discovery--product_recommendation.related_products)",
    "Related products settings (product.metafields.shopify--discovery--product_recommendation.related_products_display)",
    "Search product boosts (product.metafields.shopify--discovery--product_search_boost.queries)",
    "Variant Image",
    "Variant Weight Unit",
    "Variant Tax Code",
    "Cost per item",
    "Status",
];

/// One output line, addressed by column name.
struct Record(Vec<String>);

impl Record {
    fn new() -> Self {
        Self(vec![String::new(); SHOPIFY_COLUMNS.len()])
    }

    fn set(&mut self, column: &str, value: impl Into<String>) {
        if let Some(idx) = SHOPIFY_COLUMNS.iter().position(|c| *c == column) {
            self.0[idx] = value.into();
        }
    }
}

/// Which option slots a product uses, in slot order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionAxis {
    Size,
    Color,
    DefaultTitle,
}

impl OptionAxis {
    fn name(self) -> &'static str {
        match self {
            OptionAxis::Size => "Size",
            OptionAxis::Color => "Color",
            OptionAxis::DefaultTitle => "Title",
        }
    }

    fn value(self, variant: &Variant) -> &str {
        match self {
            OptionAxis::Size => variant.size().unwrap_or_default(),
            OptionAxis::Color => variant.color().unwrap_or_default(),
            OptionAxis::DefaultTitle => "Default Title",
        }
    }
}

/// Builds the Shopify records for `variants`, grouped by handle in order of
/// first appearance. The first variant of each handle is the product row.
///
/// Shopify keeps one body per product. It is taken from the first variant
/// whose description was edited by hand, else from the first variant; other
/// differing descriptions in the group are dropped with a warning.
#[must_use]
pub fn shopify_records(variants: &[Variant], settings: &ProcessingSettings) -> Vec<Vec<String>> {
    let mut handles: Vec<&str> = Vec::new();
    for variant in variants {
        if !handles.contains(&variant.handle.as_str()) {
            handles.push(&variant.handle);
        }
    }

    let mut records = Vec::with_capacity(variants.len());
    for handle in handles {
        let group: Vec<&Variant> = variants.iter().filter(|v| v.handle == handle).collect();
        let axes = option_axes(&group);
        let body = product_body(handle, &group);

        for (position, variant) in group.iter().enumerate() {
            let mut record = Record::new();
            record.set("Handle", handle);
            if position == 0 {
                fill_product_columns(&mut record, variant, body, &axes, settings);
            }
            for (slot, axis) in axes.iter().enumerate() {
                record.set(&format!("Option{} Value", slot + 1), axis.value(variant));
            }
            fill_variant_columns(&mut record, variant, settings);
            records.push(record.0);
        }
    }
    records
}

fn product_body<'a>(handle: &str, group: &[&'a Variant]) -> Option<&'a str> {
    let source: &'a Variant = group
        .iter()
        .copied()
        .find(|v| v.edits.description)
        .or_else(|| group.first().copied())?;
    let body = source.description.as_deref();
    let dropped = group
        .iter()
        .filter(|v| v.description.as_deref() != body)
        .count();
    if dropped > 0 {
        tracing::warn!(
            handle,
            variant = %source.key,
            dropped,
            "variants of one product have different descriptions; keeping one"
        );
    }
    body
}

fn option_axes(group: &[&Variant]) -> Vec<OptionAxis> {
    let mut axes = Vec::with_capacity(2);
    if group.iter().any(|v| v.size().is_some()) {
        axes.push(OptionAxis::Size);
    }
    if group.iter().any(|v| v.color().is_some()) {
        axes.push(OptionAxis::Color);
    }
    if axes.is_empty() {
        axes.push(OptionAxis::DefaultTitle);
    }
    axes
}

fn fill_product_columns(
    record: &mut Record,
    variant: &Variant,
    body: Option<&str>,
    axes: &[OptionAxis],
    settings: &ProcessingSettings,
) {
    record.set("Title", variant.title.as_str());
    record.set("Body (HTML)", body_html(body.unwrap_or_default()));
    record.set("Vendor", settings.vendor_name.as_str());
    record.set(
        "Product Category",
        variant.product_category.clone().unwrap_or_default(),
    );
    record.set("Type", variant.product_type.clone().unwrap_or_default());
    record.set("Tags", variant.tags.join(", "));
    record.set("Published", if variant.published { "TRUE" } else { "FALSE" });
    for (slot, axis) in axes.iter().enumerate() {
        record.set(&format!("Option{} Name", slot + 1), axis.name());
    }
    record.set("Status", settings.status.as_str());
}

fn fill_variant_columns(record: &mut Record, variant: &Variant, settings: &ProcessingSettings) {
    record.set("Variant SKU", variant.sku.clone().unwrap_or_default());
    record.set("Variant Grams", "0");
    record.set("Variant Inventory Tracker", "shopify");
    record.set("Variant Inventory Qty", variant.quantity.to_string());
    record.set(
        "Variant Inventory Policy",
        settings.inventory_policy.to_string(),
    );
    record.set("Variant Fulfillment Service", "manual");
    record.set("Variant Price", format_money(variant.price));
    record.set(
        "Variant Compare At Price",
        variant
            .compare_price
            .filter(|c| !c.is_zero())
            .map(format_money)
            .unwrap_or_default(),
    );
    record.set("Variant Requires Shipping", "TRUE");
    record.set("Variant Taxable", "TRUE");
    record.set("Gift Card", "FALSE");
}

fn format_money(value: Decimal) -> String {
    format!("{value:.2}")
}

/// Wraps plain text in `<p>`; text that already looks like HTML is kept.
/// The text itself is never altered.
fn body_html(description: &str) -> String {
    let trimmed = description.trim_start();
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('<') {
        description.to_string()
    } else {
        format!("<p>{description}</p>")
    }
}

/// Writes the Shopify CSV for `variants`; returns the number of data lines.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] if writing fails.
pub fn write_shopify_csv<W: Write>(
    writer: W,
    variants: &[Variant],
    settings: &ProcessingSettings,
) -> Result<usize, ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(SHOPIFY_COLUMNS)?;
    let records = shopify_records(variants, settings);
    for record in &records {
        csv_writer.write_record(record)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(records.len())
}

/// Writes the Shopify CSV to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`ExportError::Io`] if the file cannot be created and
/// [`ExportError::Csv`] if writing fails.
pub fn write_shopify_file(
    path: &Path,
    variants: &[Variant],
    settings: &ProcessingSettings,
) -> Result<usize, ExportError> {
    let file = create_file(path)?;
    let written = write_shopify_csv(file, variants, settings)?;
    tracing::info!(path = %path.display(), lines = written, "wrote Shopify CSV");
    Ok(written)
}

/// Writes the issue report as pretty JSON.
///
/// # Errors
///
/// Returns [`ExportError::Io`] or [`ExportError::Report`].
pub fn write_report(path: &Path, report: &IssueReport) -> Result<(), ExportError> {
    let mut file = create_file(path)?;
    serde_json::to_writer_pretty(&mut file, report)?;
    file.write_all(b"\n").map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::info!(path = %path.display(), issues = report.len(), "wrote issue report");
    Ok(())
}

fn create_file(path: &Path) -> Result<File, ExportError> {
    let io_err = |source: std::io::Error| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    File::create(path).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use shopvar_core::{UserEdits, VariantKey};

    use super::*;

    fn column(name: &str) -> usize {
        SHOPIFY_COLUMNS
            .iter()
            .position(|c| *c == name)
            .expect("known column")
    }

    fn variant(handle: &str, size: Option<&str>, color: Option<&str>) -> Variant {
        Variant {
            key: VariantKey::new(0, size, color),
            title: "Cotton T-Shirt".to_string(),
            handle: handle.to_string(),
            sku: Some(format!(
                "TS-{}-{}",
                size.unwrap_or_default(),
                color.unwrap_or_default()
            )),
            quantity: 12,
            base_price: Decimal::new(299, 0),
            price: Decimal::new(299, 0),
            compare_price: None,
            description: Some("Soft cotton tee.".to_string()),
            tags: vec!["cotton".to_string(), "tee".to_string()],
            surcharge_percent: None,
            product_category: None,
            product_type: Some("Shirts".to_string()),
            published: true,
            edits: UserEdits::default(),
        }
    }

    #[test]
    fn column_order_starts_and_ends_like_shopify() {
        assert_eq!(SHOPIFY_COLUMNS[0], "Handle");
        assert_eq!(SHOPIFY_COLUMNS[23], "Variant Price");
        assert_eq!(SHOPIFY_COLUMNS[SHOPIFY_COLUMNS.len() - 1], "Status");
    }

    #[test]
    fn first_variant_of_handle_carries_product_columns() {
        let variants = vec![
            variant("tee", Some("S"), Some("Red")),
            variant("tee", Some("M"), Some("Red")),
        ];
        let records = shopify_records(&variants, &ProcessingSettings::default());
        assert_eq!(records.len(), 2);

        let product = &records[0];
        assert_eq!(product[column("Title")], "Cotton T-Shirt");
        assert_eq!(product[column("Body (HTML)")], "<p>Soft cotton tee.</p>");
        assert_eq!(product[column("Vendor")], "YourBrandName");
        assert_eq!(product[column("Tags")], "cotton, tee");
        assert_eq!(product[column("Published")], "TRUE");
        assert_eq!(product[column("Option1 Name")], "Size");
        assert_eq!(product[column("Option2 Name")], "Color");
        assert_eq!(product[column("Status")], "draft");

        let follow = &records[1];
        assert_eq!(follow[column("Handle")], "tee");
        assert_eq!(follow[column("Title")], "");
        assert_eq!(follow[column("Option1 Name")], "");
        assert_eq!(follow[column("Option1 Value")], "M");
        assert_eq!(follow[column("Option2 Value")], "Red");
        assert_eq!(follow[column("Variant SKU")], "TS-M-Red");
    }

    #[test]
    fn prices_have_two_decimals_and_blank_compare() {
        let mut v = variant("tee", Some("S"), None);
        v.price = Decimal::new(1105, 1);
        let mut w = variant("tee", Some("M"), None);
        w.compare_price = Some(Decimal::new(350, 0));
        let records = shopify_records(&[v, w], &ProcessingSettings::default());
        assert_eq!(records[0][column("Variant Price")], "110.50");
        assert_eq!(records[0][column("Variant Compare At Price")], "");
        assert_eq!(records[1][column("Variant Compare At Price")], "350.00");
        assert_eq!(records[0][column("Variant Inventory Qty")], "12");
        assert_eq!(records[0][column("Variant Inventory Policy")], "deny");
    }

    #[test]
    fn color_only_products_use_first_option_slot() {
        let records = shopify_records(
            &[variant("tee", None, Some("Red"))],
            &ProcessingSettings::default(),
        );
        assert_eq!(records[0][column("Option1 Name")], "Color");
        assert_eq!(records[0][column("Option1 Value")], "Red");
        assert_eq!(records[0][column("Option2 Name")], "");
    }

    #[test]
    fn single_variant_products_use_default_title_option() {
        let records =
            shopify_records(&[variant("tee", None, None)], &ProcessingSettings::default());
        assert_eq!(records[0][column("Option1 Name")], "Title");
        assert_eq!(records[0][column("Option1 Value")], "Default Title");
    }

    #[test]
    fn groups_by_handle_in_first_seen_order() {
        let variants = vec![
            variant("b", Some("S"), None),
            variant("a", Some("S"), None),
            variant("b", Some("M"), None),
        ];
        let records = shopify_records(&variants, &ProcessingSettings::default());
        let handles: Vec<&str> = records.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(handles, vec!["b", "b", "a"]);
        assert_eq!(records[2][column("Title")], "Cotton T-Shirt");
        assert_eq!(records[1][column("Title")], "");
    }

    #[test]
    fn html_descriptions_are_not_rewrapped() {
        assert_eq!(body_html("<ul><li>x</li></ul>"), "<ul><li>x</li></ul>");
        assert_eq!(body_html(" <p>x</p>\n"), " <p>x</p>\n");
        assert_eq!(body_html("  plain\n\ntext "), "<p>  plain\n\ntext </p>");
        assert_eq!(body_html("  "), "");
        assert_eq!(body_html(""), "");
    }

    #[test]
    fn edited_description_on_any_variant_becomes_the_body() {
        let first = variant("tee", Some("S"), None);
        let mut second = variant("tee", Some("M"), None);
        second.description = Some("Hand-edited copy.".to_string());
        second.edits.description = true;

        let records = shopify_records(&[first, second], &ProcessingSettings::default());
        assert_eq!(records[0][column("Body (HTML)")], "<p>Hand-edited copy.</p>");
        assert_eq!(records[1][column("Body (HTML)")], "");
    }

    #[test]
    fn unedited_group_uses_first_description() {
        let first = variant("tee", Some("S"), None);
        let mut second = variant("tee", Some("M"), None);
        second.description = Some("Other copy.".to_string());

        let records = shopify_records(&[first, second], &ProcessingSettings::default());
        assert_eq!(records[0][column("Body (HTML)")], "<p>Soft cotton tee.</p>");
    }

    #[test]
    fn distinct_handles_stay_separate_products() {
        let mut kurta = variant("قمیص", Some("S"), None);
        kurta.title = "قمیص".to_string();
        let mut hoodie = variant("hoodie-2", Some("S"), None);
        hoodie.title = "Hoodie".to_string();
        let records = shopify_records(
            &[variant("hoodie", Some("S"), None), kurta, hoodie],
            &ProcessingSettings::default(),
        );
        let titles: Vec<&str> = records.iter().map(|r| r[column("Title")].as_str()).collect();
        assert_eq!(titles, vec!["Cotton T-Shirt", "قمیص", "Hoodie"]);
    }

    #[test]
    fn write_csv_emits_header_and_records() {
        let mut out = Vec::new();
        let written = write_shopify_csv(
            &mut out,
            &[variant("tee", Some("S"), None)],
            &ProcessingSettings::default(),
        )
        .expect("csv written");
        assert_eq!(written, 1);
        let text = String::from_utf8(out).expect("utf8");
        let mut lines = text.lines();
        assert!(lines
            .next()
            .is_some_and(|h| h.starts_with("Handle,Title,Body (HTML),Vendor")));
        assert!(lines.next().is_some_and(|l| l.starts_with("tee,Cotton T-Shirt")));
    }
}
