//! Cart state management.
//!
//! [`CartManager`] owns the committed cart snapshot and is the only writer.
//! The remote catalog and the durable key-value store are injected through
//! the [`StockLookup`] and [`KeyValueStore`] ports; user-facing messages go
//! out through a [`Notifier`].

use async_trait::async_trait;

use crate::domain::product::{Product, ProductId, Stock};
use crate::errors::{LookupError, StoreError};

pub mod manager;
pub mod notice;
pub mod summary;

pub use manager::{CartManager, MutationOutcome, SkipReason, UpdateProductAmount};
pub use notice::{LogNotifier, Notice, Notifier, RecordingNotifier};
pub use summary::{CartSummary, LineSummary};

pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

#[async_trait]
pub trait StockLookup: Send + Sync {
    async fn stock(&self, product_id: ProductId) -> Result<Stock, LookupError>;
    async fn product(&self, product_id: ProductId) -> Result<Product, LookupError>;
}

/// Durable string key-value medium the cart is mirrored into.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
