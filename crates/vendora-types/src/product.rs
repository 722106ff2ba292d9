//! Catalog product type.
//!
//! Price and stock are read at checkout time; the price is snapshotted into
//! the order line, the stock is decremented by the settlement kernel.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ProductId, UserId};

/// A catalog product listed by one seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub seller_id: UserId,
    pub name: String,
    pub unit_price: Decimal,
    /// Invariant: never negative (underflow is rejected before decrement).
    pub stock: u32,
}

impl Product {
    #[must_use]
    pub fn new(
        seller_id: UserId,
        name: impl Into<String>,
        unit_price: Decimal,
        stock: u32,
    ) -> Self {
        Self {
            id: ProductId::new(),
            seller_id,
            name: name.into(),
            unit_price,
            stock,
        }
    }

    /// Price of `quantity` units at the current unit price.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Decimal {
        self.unit_price * Decimal::from(quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_multiplies() {
        let p = Product::new(UserId::new(), "Widget", Decimal::new(300, 0), 5);
        assert_eq!(p.line_total(2), Decimal::new(600, 0));
        assert_eq!(p.line_total(0), Decimal::ZERO);
    }

    #[test]
    fn product_serde_roundtrip() {
        let p = Product::new(UserId::new(), "Mug", Decimal::new(2550, 2), 10);
        let json = serde_json::to_string(&p).unwrap();
        let back: Product = serde_json::from_str(&json).unwrap();
        assert_eq!(p.id, back.id);
        assert_eq!(p.unit_price, back.unit_price);
        assert_eq!(p.stock, back.stock);
    }
}
