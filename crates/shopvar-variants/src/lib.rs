//! Variant expansion and reconciliation engine.
//!
//! Turns [`shopvar_core::SourceRow`]s into ordered, priced
//! [`shopvar_core::Variant`]s and keeps them consistent across bulk edits,
//! manual edits, enrichment merges and re-runs.

pub mod bulk;
pub mod describe;
pub mod error;
pub mod generate;
pub mod merge;
pub mod notation;
pub mod session;
pub mod size_order;
pub mod sku;
pub mod surcharge;
pub mod validate;

pub use bulk::{apply_bulk_compare_price, apply_bulk_quantity, apply_edit, VariantEdit};
pub use describe::compose_description;
pub use error::{EditError, NotationError};
pub use generate::{generate_variants, parse_price, Generation};
pub use merge::{merge_enrichment, EnrichmentOutcome, MergeSummary};
pub use notation::{format_sizes, parse_colors, parse_sizes, ParsedSizes};
pub use session::EditSession;
pub use size_order::{SizeOrdering, SizeRank, STANDARD_SIZES};
pub use sku::{handle_for, variant_sku, HandleRegistry, SkuRegistry, MAX_SKU_SUFFIX};
pub use surcharge::{apply_surcharge, apply_surcharges};
pub use validate::{build_report, validate_variants};
