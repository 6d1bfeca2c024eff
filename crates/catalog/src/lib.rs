//! Stock and product lookups for the cart manager.
//!
//! [`HttpCatalog`] talks to the storefront API (`/stock/{id}` and
//! `/products/{id}`); [`InMemoryCatalog`] serves a fixed product table.

pub mod http;
pub mod memory;

pub use http::{CatalogClientError, HttpCatalog};
pub use memory::InMemoryCatalog;
