use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Shopify `Variant Inventory Policy`: what happens when stock runs out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryPolicy {
    /// Stop sales when out of stock.
    #[default]
    Deny,
    /// Allow sales when out of stock.
    Continue,
}

impl std::fmt::Display for InventoryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryPolicy::Deny => write!(f, "deny"),
            InventoryPolicy::Continue => write!(f, "continue"),
        }
    }
}

/// How descriptions are enriched before export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiMode {
    /// No AI calls; descriptions pass through unchanged.
    #[default]
    Default,
    /// First sentence of the description plus generated tags.
    Simple,
    /// Rewritten description plus generated tags.
    Full,
}

impl std::fmt::Display for AiMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiMode::Default => write!(f, "default"),
            AiMode::Simple => write!(f, "simple"),
            AiMode::Full => write!(f, "full"),
        }
    }
}

impl FromStr for AiMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "none" | "off" => Ok(AiMode::Default),
            "simple" => Ok(AiMode::Simple),
            "full" => Ok(AiMode::Full),
            other => Err(format!(
                "unknown AI mode '{other}'; expected default, simple, or full"
            )),
        }
    }
}

/// Size-keyed percentage price increases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurchargeSettings {
    pub enabled: bool,
    /// When set, this percentage applies to every size and `rules` is ignored.
    pub bulk_percent: Option<Decimal>,
    /// Size token → percentage, e.g. `XXL: 10` for +10 %.
    pub rules: BTreeMap<String, Decimal>,
}

impl SurchargeSettings {
    /// Percentage for `size`, matched case-insensitively.
    ///
    /// Returns `None` when surcharges are disabled or no rule covers the size.
    #[must_use]
    pub fn percent_for(&self, size: Option<&str>) -> Option<Decimal> {
        if !self.enabled {
            return None;
        }
        if let Some(bulk) = self.bulk_percent {
            return Some(bulk);
        }
        let size = size?.trim();
        self.rules
            .iter()
            .find(|(token, _)| token.trim().eq_ignore_ascii_case(size))
            .map(|(_, pct)| *pct)
    }
}

/// Extension of the standard size scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeScaleSettings {
    /// Custom tokens ranked after the standard scale, in this order.
    pub extra: Vec<String>,
    /// Rank purely numeric sizes (waist 28, 30, …) by value.
    pub numeric_sizes: bool,
}

impl Default for SizeScaleSettings {
    fn default() -> Self {
        Self {
            extra: Vec::new(),
            numeric_sizes: true,
        }
    }
}

/// Markup applied to one description element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HtmlTag {
    /// `<p>label: value</p>`
    #[default]
    P,
    H3,
    H4,
    Strong,
    Div,
    /// `<li>label: value</li>`
    Li,
    /// `label: value<br>`
    Br,
    /// Bare `label: value`.
    #[serde(rename = "none")]
    Plain,
}

impl HtmlTag {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            HtmlTag::P => "p",
            HtmlTag::H3 => "h3",
            HtmlTag::H4 => "h4",
            HtmlTag::Strong => "strong",
            HtmlTag::Div => "div",
            HtmlTag::Li => "li",
            HtmlTag::Br => "br",
            HtmlTag::Plain => "none",
        }
    }
}

/// One piece of a composed product description: the value of `column`,
/// optionally labelled, wrapped in `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionElement {
    /// Canonical field (`description`, `fabric`, ...) or any other column name.
    pub column: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub tag: HtmlTag,
    /// Elements are emitted by ascending order; equal orders keep file order.
    #[serde(default)]
    pub order: i32,
}

/// Processing settings consumed by the variant engine and exporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingSettings {
    pub vendor_name: String,
    pub inventory_policy: InventoryPolicy,
    /// Quantity used when a size carries no parsed quantity.
    pub fallback_quantity: u32,
    /// Bulk quantity mode: every unedited variant gets this quantity.
    pub bulk_quantity: Option<u32>,
    /// Bulk compare-price mode: every unedited variant gets this compare price.
    pub bulk_compare_price: Option<Decimal>,
    pub ai_mode: AiMode,
    /// Shopify product status written on product rows.
    pub status: String,
    pub surcharge: SurchargeSettings,
    pub size_scale: SizeScaleSettings,
    /// When non-empty, product bodies are composed from these elements
    /// instead of the description column alone.
    pub description_elements: Vec<DescriptionElement>,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            vendor_name: "YourBrandName".to_string(),
            inventory_policy: InventoryPolicy::Deny,
            fallback_quantity: 10,
            bulk_quantity: None,
            bulk_compare_price: None,
            ai_mode: AiMode::Default,
            status: "draft".to_string(),
            surcharge: SurchargeSettings::default(),
            size_scale: SizeScaleSettings::default(),
            description_elements: Vec::new(),
        }
    }
}

/// Load and validate processing settings from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_settings(path: &Path) -> Result<ProcessingSettings, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SettingsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let settings: ProcessingSettings = serde_yaml::from_str(&content)?;
    validate_settings(&settings)?;

    Ok(settings)
}

/// Like [`load_settings`], but a missing file yields the defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read, parsed, or
/// fails validation.
pub fn load_settings_or_default(path: &Path) -> Result<ProcessingSettings, ConfigError> {
    if path.exists() {
        load_settings(path)
    } else {
        Ok(ProcessingSettings::default())
    }
}

pub(crate) fn validate_settings(settings: &ProcessingSettings) -> Result<(), ConfigError> {
    if settings.vendor_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "vendor_name must be non-empty".to_string(),
        ));
    }

    if !["active", "draft", "archived"].contains(&settings.status.as_str()) {
        return Err(ConfigError::Validation(format!(
            "invalid status '{}'; must be active, draft, or archived",
            settings.status
        )));
    }

    if let Some(price) = settings.bulk_compare_price {
        if price.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "bulk_compare_price must be non-negative, got {price}"
            )));
        }
    }

    if let Some(pct) = settings.surcharge.bulk_percent {
        if pct.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "surcharge.bulk_percent must be non-negative, got {pct}"
            )));
        }
    }

    let mut seen_sizes = HashSet::new();
    for (size, pct) in &settings.surcharge.rules {
        if size.trim().is_empty() {
            return Err(ConfigError::Validation(
                "surcharge rule size must be non-empty".to_string(),
            ));
        }
        if pct.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "surcharge for size '{size}' must be non-negative, got {pct}"
            )));
        }
        if !seen_sizes.insert(size.trim().to_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate surcharge rule for size '{size}'"
            )));
        }
    }

    let mut seen_extra = HashSet::new();
    for token in &settings.size_scale.extra {
        if token.trim().is_empty() {
            return Err(ConfigError::Validation(
                "size_scale.extra entries must be non-empty".to_string(),
            ));
        }
        if !seen_extra.insert(token.trim().to_uppercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate size_scale.extra entry '{token}'"
            )));
        }
    }

    if settings
        .description_elements
        .iter()
        .any(|e| e.column.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "description_elements entries need a column".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
