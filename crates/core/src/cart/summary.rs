use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::cart::Cart;
use crate::domain::product::ProductId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSummary {
    pub product_id: ProductId,
    pub title: String,
    pub image: String,
    pub unit_price: Decimal,
    pub amount: u32,
    pub subtotal: Decimal,
    /// A decrement below one is a no-op, so front ends disable the control.
    pub can_decrement: bool,
}

/// Display-ready totals derived from a committed cart snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub version: u64,
    pub lines: Vec<LineSummary>,
    pub item_count: u64,
    pub total: Decimal,
}

impl CartSummary {
    pub fn from_cart(cart: &Cart) -> Self {
        let lines: Vec<LineSummary> = cart
            .items()
            .iter()
            .map(|item| LineSummary {
                product_id: item.id,
                title: item.title.clone(),
                image: item.image.clone(),
                unit_price: item.price,
                amount: item.amount,
                subtotal: item.subtotal(),
                can_decrement: item.amount > 1,
            })
            .collect();

        let total =
            lines.iter().fold(Decimal::ZERO, |total, line| total.saturating_add(line.subtotal));
        let item_count = lines.iter().map(|line| u64::from(line.amount)).sum();

        Self { version: cart.version(), lines, item_count, total }
    }
}
