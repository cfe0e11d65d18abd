//! Shared domain types, issue reporting, and configuration for shopvar.

pub mod app_config;
pub mod config;
pub mod issues;
pub mod products;
pub mod settings;

use thiserror::Error;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use issues::{IssueKind, IssueReport, IssueSubject, ValidationIssue};
pub use products::{
    normalize_header, Enrichment, EnrichmentFailure, SizeQuantity, SourceRow, UserEdits, Variant,
    VariantKey,
};
pub use settings::{
    load_settings, load_settings_or_default, AiMode, DescriptionElement, HtmlTag, InventoryPolicy,
    ProcessingSettings, SizeScaleSettings, SurchargeSettings,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read settings file {path}: {source}")]
    SettingsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file: {0}")]
    SettingsFileParse(#[from] serde_yaml::Error),

    #[error("settings validation failed: {0}")]
    Validation(String),
}
