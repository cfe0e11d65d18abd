use rust_decimal::Decimal;
use thiserror::Error;

/// A size token that could not be used as written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("size token \"{token}\" has no size label")]
    EmptyLabel { token: String },

    #[error("size token \"{token}\" has a negative quantity")]
    NegativeQuantity { token: String },

    #[error("size token \"{token}\" has a fractional quantity")]
    FractionalQuantity { token: String },

    #[error("size token \"{token}\" has a quantity that is too large")]
    QuantityOverflow { token: String },

    #[error("size \"{size}\" is listed more than once; the last quantity wins")]
    DuplicateSize { size: String },
}

/// A manual or bulk edit that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no variant matches {0}")]
    UnknownVariant(String),

    #[error("no variant has SKU \"{0}\"")]
    UnknownSku(String),

    #[error("price must be non-negative, got {0}")]
    NegativePrice(Decimal),

    #[error("compare price must be non-negative, got {0}")]
    NegativeComparePrice(Decimal),
}
