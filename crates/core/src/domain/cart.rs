use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};
use crate::errors::DomainError;

/// One product's record inside the cart. Metadata is frozen at insertion;
/// only `amount` changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub image: String,
    pub amount: u32,
}

impl CartItem {
    pub fn from_product(product: Product, amount: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount,
        }
    }

    /// Saturates rather than panicking; [`Cart`] never holds an entry where
    /// this would overflow.
    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.amount))
    }
}

/// Committed cart snapshot.
///
/// Every mutating method consumes `&self` and returns a new `Cart` with the
/// version bumped, so a snapshot handed out to readers is never changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
    version: u64,
}

impl Cart {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a cart from stored items, enforcing id uniqueness and positive amounts.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, DomainError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.amount == 0 {
                return Err(DomainError::InvariantViolation(format!(
                    "cart entry {} has a zero amount",
                    item.id
                )));
            }
            if !seen.insert(item.id) {
                return Err(DomainError::DuplicateEntry(item.id));
            }
        }

        checked_total(&items)?;
        Ok(Self { items, version: 0 })
    }

    pub fn from_json(payload: &str) -> Result<Self, DomainError> {
        let items: Vec<CartItem> = serde_json::from_str(payload)
            .map_err(|error| DomainError::MalformedPayload(error.to_string()))?;
        Self::from_items(items)
    }

    pub fn to_json(&self) -> Result<String, DomainError> {
        serde_json::to_string(&self.items)
            .map_err(|error| DomainError::MalformedPayload(error.to_string()))
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, product_id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.find(product_id).is_some()
    }

    pub fn with_appended(&self, item: CartItem) -> Result<Self, DomainError> {
        if item.amount == 0 {
            return Err(DomainError::InvariantViolation(format!(
                "cannot insert cart entry {} with a zero amount",
                item.id
            )));
        }
        if self.contains(item.id) {
            return Err(DomainError::DuplicateEntry(item.id));
        }

        let mut items = self.items.clone();
        items.push(item);
        self.next(items)
    }

    pub fn with_amount(&self, product_id: ProductId, amount: u32) -> Result<Self, DomainError> {
        if amount == 0 {
            return Err(DomainError::InvariantViolation(format!(
                "cannot set cart entry {product_id} to a zero amount"
            )));
        }

        let mut found = false;
        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == product_id {
                    found = true;
                    CartItem { amount, ..item.clone() }
                } else {
                    item.clone()
                }
            })
            .collect();

        if !found {
            return Err(DomainError::EntryNotFound(product_id));
        }
        self.next(items)
    }

    pub fn without(&self, product_id: ProductId) -> Result<Self, DomainError> {
        if !self.contains(product_id) {
            return Err(DomainError::EntryNotFound(product_id));
        }

        let items = self.items.iter().filter(|item| item.id != product_id).cloned().collect();
        self.next(items)
    }

    fn next(&self, items: Vec<CartItem>) -> Result<Self, DomainError> {
        checked_total(&items)?;
        Ok(Self { items, version: self.version + 1 })
    }
}

/// Every line subtotal and the running total must fit in a `Decimal`.
fn checked_total(items: &[CartItem]) -> Result<Decimal, DomainError> {
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        item.price
            .checked_mul(Decimal::from(item.amount))
            .and_then(|subtotal| total.checked_add(subtotal))
            .ok_or_else(|| {
                DomainError::InvariantViolation(format!(
                    "cart total overflows at entry {} (price {}, amount {})",
                    item.id, item.price, item.amount
                ))
            })
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::domain::product::ProductId;
    use crate::errors::DomainError;

    use super::{Cart, CartItem};

    fn item(id: u64, amount: u32) -> CartItem {
        CartItem {
            id: ProductId(id),
            title: format!("Sneaker {id}"),
            price: Decimal::new(13990, 2),
            image: format!("https://example.test/{id}.jpg"),
            amount,
        }
    }

    #[test]
    fn mutations_leave_previous_snapshot_untouched() {
        let base = Cart::from_items(vec![item(1, 1), item(2, 3)]).expect("valid cart");

        let updated = base.with_amount(ProductId(1), 4).expect("update");
        let removed = updated.without(ProductId(2)).expect("remove");

        assert_eq!(base.find(ProductId(1)).map(|item| item.amount), Some(1));
        assert_eq!(base.len(), 2);
        assert_eq!(updated.find(ProductId(1)).map(|item| item.amount), Some(4));
        assert_eq!(removed.items(), &[item(1, 4)]);
        assert_eq!(removed.version(), 2);
    }

    #[test]
    fn append_rejects_duplicate_identifiers() {
        let cart = Cart::from_items(vec![item(1, 1)]).expect("valid cart");
        let error = cart.with_appended(item(1, 1)).expect_err("duplicate append");
        assert_eq!(error, DomainError::DuplicateEntry(ProductId(1)));
    }

    #[test]
    fn zero_amounts_are_never_accepted() {
        let cart = Cart::from_items(vec![item(1, 2)]).expect("valid cart");
        assert!(cart.with_amount(ProductId(1), 0).is_err());
        assert!(cart.with_appended(item(2, 0)).is_err());
        assert!(Cart::from_items(vec![item(3, 0)]).is_err());
    }

    #[test]
    fn missing_entries_are_reported() {
        let cart = Cart::empty();
        assert_eq!(
            cart.without(ProductId(99)).expect_err("missing"),
            DomainError::EntryNotFound(ProductId(99))
        );
        assert!(cart.with_amount(ProductId(99), 2).is_err());
    }

    #[test]
    fn json_payload_preserves_order_and_amounts() {
        let cart = Cart::from_items(vec![item(2, 3), item(1, 1)]).expect("valid cart");
        let payload = cart.to_json().expect("encode");
        let restored = Cart::from_json(&payload).expect("decode");

        assert_eq!(restored.items(), cart.items());
        assert_eq!(restored.version(), 0);
    }

    #[test]
    fn stored_payload_with_duplicates_is_rejected() {
        let payload = r#"[
            {"id":1,"title":"a","price":10,"image":"a.jpg","amount":1},
            {"id":1,"title":"a","price":10,"image":"a.jpg","amount":2}
        ]"#;
        assert_eq!(
            Cart::from_json(payload).expect_err("duplicate"),
            DomainError::DuplicateEntry(ProductId(1))
        );
        assert!(matches!(
            Cart::from_json("{not json"),
            Err(DomainError::MalformedPayload(_))
        ));
    }

    #[test]
    fn subtotal_multiplies_price_by_amount() {
        assert_eq!(item(1, 3).subtotal(), Decimal::new(41970, 2));
    }

    #[test]
    fn stored_payload_with_overflowing_subtotal_is_rejected() {
        let payload = r#"[{"id":1,"title":"a","price":"79228162514264337593543950335","image":"a.jpg","amount":2}]"#;

        assert!(matches!(
            Cart::from_json(payload),
            Err(DomainError::InvariantViolation(message)) if message.contains("overflows")
        ));
    }

    #[test]
    fn mutations_that_would_overflow_the_total_are_rejected() {
        let expensive = CartItem { price: Decimal::MAX, ..item(1, 1) };
        let cart = Cart::from_items(vec![expensive]).expect("a single unit fits");

        assert!(matches!(
            cart.with_amount(ProductId(1), 2),
            Err(DomainError::InvariantViolation(_))
        ));
        assert!(matches!(cart.with_appended(item(2, 1)), Err(DomainError::InvariantViolation(_))));
        assert_eq!(cart.without(ProductId(1)).expect("remove").len(), 0);
    }
}
