use thiserror::Error;

use crate::domain::product::ProductId;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("cart already holds an entry for product {0}")]
    DuplicateEntry(ProductId),
    #[error("cart has no entry for product {0}")]
    EntryNotFound(ProductId),
    #[error("malformed cart payload: {0}")]
    MalformedPayload(String),
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

/// Failures raised by a stock/product lookup backend.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("product {0} was not found by the catalog")]
    NotFound(ProductId),
    #[error("catalog returned status {status} for `{path}`")]
    Status { status: u16, path: String },
    #[error("catalog transport failure: {0}")]
    Transport(String),
    #[error("catalog response could not be decoded: {0}")]
    Decode(String),
}

/// Failures raised by a key-value store backend.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store backend failure: {0}")]
    Backend(String),
    #[error("store is unavailable: {0}")]
    Unavailable(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("requested amount {requested} of product {product_id} exceeds available stock {available}")]
    StockUnavailable { product_id: ProductId, requested: u32, available: u32 },
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl CartError {
    pub fn is_stock_unavailable(&self) -> bool {
        matches!(self, Self::StockUnavailable { .. })
    }
}
