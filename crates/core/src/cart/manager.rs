//! Cart state manager.
//!
//! Mutations run one at a time behind a single-writer lock. Each one reads
//! the committed snapshot, validates against the stock service, builds the
//! next snapshot, writes it to the store and only then publishes it. A store
//! failure therefore leaves both the published snapshot and the persisted
//! mirror on the previous version.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::notice::{Notice, Notifier};
use super::summary::CartSummary;
use super::{KeyValueStore, StockLookup};
use crate::domain::cart::{Cart, CartItem};
use crate::domain::product::{ProductId, Stock};
use crate::errors::{CartError, LookupError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotInCart,
    NonPositiveAmount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum MutationOutcome {
    Committed { version: u64 },
    Skipped { reason: SkipReason },
}

impl MutationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }

    fn skipped(reason: SkipReason) -> Self {
        Self::Skipped { reason }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CartOperation {
    Add,
    Remove,
    Update,
}

impl CartOperation {
    fn event_name(self, stage: Stage) -> &'static str {
        match (self, stage) {
            (Self::Add, Stage::Start) => "cart.add.start",
            (Self::Add, Stage::Committed) => "cart.add.committed",
            (Self::Add, Stage::Skipped) => "cart.add.skipped",
            (Self::Add, Stage::Rejected) => "cart.add.rejected",
            (Self::Remove, Stage::Start) => "cart.remove.start",
            (Self::Remove, Stage::Committed) => "cart.remove.committed",
            (Self::Remove, Stage::Skipped) => "cart.remove.skipped",
            (Self::Remove, Stage::Rejected) => "cart.remove.rejected",
            (Self::Update, Stage::Start) => "cart.update.start",
            (Self::Update, Stage::Committed) => "cart.update.committed",
            (Self::Update, Stage::Skipped) => "cart.update.skipped",
            (Self::Update, Stage::Rejected) => "cart.update.rejected",
        }
    }

    fn failure_notice(self, product_id: ProductId) -> Notice {
        match self {
            Self::Add => Notice::AddFailed { product_id },
            Self::Remove => Notice::RemoveFailed { product_id },
            Self::Update => Notice::UpdateFailed { product_id },
        }
    }
}

#[derive(Clone, Copy)]
enum Stage {
    Start,
    Committed,
    Skipped,
    Rejected,
}

pub struct CartManager {
    storage_key: String,
    lookup: Arc<dyn StockLookup>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    writer: Mutex<()>,
    state: watch::Sender<Arc<Cart>>,
}

impl CartManager {
    /// Restores the cart mirrored under `storage_key`.
    ///
    /// A missing value starts an empty cart. An unreadable or malformed value
    /// also starts an empty cart and raises [`Notice::StoredCartDiscarded`].
    pub async fn hydrate(
        storage_key: impl Into<String>,
        lookup: Arc<dyn StockLookup>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let storage_key = storage_key.into();

        let cart = match store.get(&storage_key).await {
            Ok(None) => Cart::empty(),
            Ok(Some(payload)) => match Cart::from_json(&payload) {
                Ok(cart) => cart,
                Err(error) => {
                    warn!(
                        event_name = "cart.hydrate.discarded",
                        storage_key = %storage_key,
                        error = %error,
                        "stored cart payload is malformed; starting with an empty cart"
                    );
                    notifier.notify(Notice::StoredCartDiscarded);
                    Cart::empty()
                }
            },
            Err(error) => {
                warn!(
                    event_name = "cart.hydrate.discarded",
                    storage_key = %storage_key,
                    error = %error,
                    "stored cart could not be read; starting with an empty cart"
                );
                notifier.notify(Notice::StoredCartDiscarded);
                Cart::empty()
            }
        };

        info!(
            event_name = "cart.hydrate.complete",
            storage_key = %storage_key,
            entries = cart.len(),
            "cart hydrated from store"
        );

        let (state, _) = watch::channel(Arc::new(cart));
        Self { storage_key, lookup, store, notifier, writer: Mutex::new(()), state }
    }

    /// Latest committed snapshot.
    pub fn cart(&self) -> Arc<Cart> {
        Arc::clone(&self.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.state.subscribe()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary::from_cart(&self.cart())
    }

    pub async fn add_product(&self, product_id: ProductId) -> Result<MutationOutcome, CartError> {
        let correlation_id = begin(CartOperation::Add, product_id);
        let _writer = self.writer.lock().await;
        let current = self.cart();

        let result = self.try_add(&current, product_id).await;
        self.finish(CartOperation::Add, product_id, &correlation_id, result)
    }

    pub async fn remove_product(
        &self,
        product_id: ProductId,
    ) -> Result<MutationOutcome, CartError> {
        let correlation_id = begin(CartOperation::Remove, product_id);
        let _writer = self.writer.lock().await;
        let current = self.cart();

        let result = if current.contains(product_id) {
            match current.without(product_id) {
                Ok(next) => self.commit(next).await,
                Err(error) => Err(error.into()),
            }
        } else {
            Ok(MutationOutcome::skipped(SkipReason::NotInCart))
        };
        self.finish(CartOperation::Remove, product_id, &correlation_id, result)
    }

    pub async fn update_product_amount(
        &self,
        request: UpdateProductAmount,
    ) -> Result<MutationOutcome, CartError> {
        let UpdateProductAmount { product_id, amount } = request;
        let correlation_id = begin(CartOperation::Update, product_id);
        let _writer = self.writer.lock().await;
        let current = self.cart();

        let result = self.try_update(&current, product_id, amount).await;
        self.finish(CartOperation::Update, product_id, &correlation_id, result)
    }

    /// Raises an existing entry by one, subject to stock.
    pub async fn increment_product(
        &self,
        product_id: ProductId,
    ) -> Result<MutationOutcome, CartError> {
        self.step_product(product_id, 1).await
    }

    /// Lowers an existing entry by one; an entry at one stays at one.
    pub async fn decrement_product(
        &self,
        product_id: ProductId,
    ) -> Result<MutationOutcome, CartError> {
        self.step_product(product_id, -1).await
    }

    async fn step_product(
        &self,
        product_id: ProductId,
        delta: i64,
    ) -> Result<MutationOutcome, CartError> {
        let correlation_id = begin(CartOperation::Update, product_id);
        let _writer = self.writer.lock().await;
        let current = self.cart();

        let result = match current.find(product_id) {
            Some(item) => {
                let target = i64::from(item.amount) + delta;
                self.try_update(&current, product_id, target).await
            }
            None => Ok(MutationOutcome::skipped(SkipReason::NotInCart)),
        };
        self.finish(CartOperation::Update, product_id, &correlation_id, result)
    }

    async fn try_add(
        &self,
        current: &Cart,
        product_id: ProductId,
    ) -> Result<MutationOutcome, CartError> {
        let stock = self.stock_for(product_id).await?;

        let next = match current.find(product_id) {
            Some(item) => {
                if item.amount >= stock.amount {
                    return Err(CartError::StockUnavailable {
                        product_id,
                        requested: item.amount.saturating_add(1),
                        available: stock.amount,
                    });
                }
                current.with_amount(product_id, item.amount + 1)?
            }
            None => {
                if stock.amount == 0 {
                    return Err(CartError::StockUnavailable {
                        product_id,
                        requested: 1,
                        available: 0,
                    });
                }
                let product = self.lookup.product(product_id).await?;
                if product.id != product_id {
                    return Err(LookupError::Decode(format!(
                        "catalog returned product {} for requested product {product_id}",
                        product.id
                    ))
                    .into());
                }
                current.with_appended(CartItem::from_product(product, 1))?
            }
        };

        self.commit(next).await
    }

    async fn try_update(
        &self,
        current: &Cart,
        product_id: ProductId,
        amount: i64,
    ) -> Result<MutationOutcome, CartError> {
        if amount <= 0 {
            return Ok(MutationOutcome::skipped(SkipReason::NonPositiveAmount));
        }
        if !current.contains(product_id) {
            return Ok(MutationOutcome::skipped(SkipReason::NotInCart));
        }

        let requested = u32::try_from(amount).unwrap_or(u32::MAX);
        let stock = self.stock_for(product_id).await?;
        if requested > stock.amount {
            return Err(CartError::StockUnavailable {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let next = current.with_amount(product_id, requested)?;
        self.commit(next).await
    }

    async fn stock_for(&self, product_id: ProductId) -> Result<Stock, CartError> {
        let stock = self.lookup.stock(product_id).await?;
        if stock.id != product_id {
            return Err(LookupError::Decode(format!(
                "stock service answered for product {} instead of {product_id}",
                stock.id
            ))
            .into());
        }
        Ok(stock)
    }

    async fn commit(&self, next: Cart) -> Result<MutationOutcome, CartError> {
        let payload = next.to_json()?;
        self.store.set(&self.storage_key, &payload).await?;

        let version = next.version();
        self.state.send_replace(Arc::new(next));
        Ok(MutationOutcome::Committed { version })
    }

    fn finish(
        &self,
        operation: CartOperation,
        product_id: ProductId,
        correlation_id: &str,
        result: Result<MutationOutcome, CartError>,
    ) -> Result<MutationOutcome, CartError> {
        match &result {
            Ok(MutationOutcome::Committed { version }) => info!(
                event_name = operation.event_name(Stage::Committed),
                correlation_id,
                product_id = product_id.0,
                version,
                "cart mutation committed"
            ),
            Ok(MutationOutcome::Skipped { reason }) => debug!(
                event_name = operation.event_name(Stage::Skipped),
                correlation_id,
                product_id = product_id.0,
                reason = ?reason,
                "cart mutation skipped"
            ),
            Err(error) => {
                let notice = if error.is_stock_unavailable() {
                    Notice::OutOfStock { product_id }
                } else {
                    operation.failure_notice(product_id)
                };
                warn!(
                    event_name = operation.event_name(Stage::Rejected),
                    correlation_id,
                    product_id = product_id.0,
                    error = %error,
                    "cart mutation rejected"
                );
                self.notifier.notify(notice);
            }
        }
        result
    }
}

fn begin(operation: CartOperation, product_id: ProductId) -> String {
    let correlation_id = Uuid::new_v4().to_string();
    debug!(
        event_name = operation.event_name(Stage::Start),
        correlation_id = %correlation_id,
        product_id = product_id.0,
        "cart mutation started"
    );
    correlation_id
}
