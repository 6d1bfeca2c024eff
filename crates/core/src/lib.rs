pub mod cart;
pub mod config;
pub mod domain;
pub mod errors;

pub use cart::{
    CartManager, CartSummary, KeyValueStore, LineSummary, LogNotifier, MutationOutcome, Notice,
    Notifier, RecordingNotifier, SkipReason, StockLookup, UpdateProductAmount, DEFAULT_CART_KEY,
};
pub use domain::cart::{Cart, CartItem};
pub use domain::product::{Product, ProductId, Stock};
pub use errors::{CartError, DomainError, LookupError, StoreError};
