use std::collections::HashMap;

use async_trait::async_trait;
use rocketshoes_core::{LookupError, Product, ProductId, Stock, StockLookup};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryCatalog {
    entries: RwLock<HashMap<ProductId, (Product, u32)>>,
}

impl InMemoryCatalog {
    pub fn new(entries: impl IntoIterator<Item = (Product, u32)>) -> Self {
        let entries = entries.into_iter().map(|(product, stock)| (product.id, (product, stock)));
        Self { entries: RwLock::new(entries.collect()) }
    }

    /// Stock levels are read-only to the cart; this exists for fixtures.
    pub async fn set_stock(&self, product_id: ProductId, amount: u32) {
        let mut entries = self.entries.write().await;
        if let Some((_, stock)) = entries.get_mut(&product_id) {
            *stock = amount;
        }
    }
}

#[async_trait]
impl StockLookup for InMemoryCatalog {
    async fn stock(&self, product_id: ProductId) -> Result<Stock, LookupError> {
        let entries = self.entries.read().await;
        entries
            .get(&product_id)
            .map(|(_, amount)| Stock { id: product_id, amount: *amount })
            .ok_or(LookupError::NotFound(product_id))
    }

    async fn product(&self, product_id: ProductId) -> Result<Product, LookupError> {
        let entries = self.entries.read().await;
        entries
            .get(&product_id)
            .map(|(product, _)| product.clone())
            .ok_or(LookupError::NotFound(product_id))
    }
}
