//! CSV and spreadsheet ingest, Shopify export.

pub mod columns;
pub mod error;
pub mod export;
pub mod reader;

pub use columns::{normalize_header, similarity, ColumnMap, Detection, MatchMethod, SourceField};
pub use error::{ExportError, IngestError};
pub use export::{
    shopify_records, write_report, write_shopify_csv, write_shopify_file, SHOPIFY_COLUMNS,
};
pub use reader::{read_source_file, read_source_rows, Ingest};
