//! Order aggregate types.
//!
//! Every order has exactly one seller — a multi-seller cart always settles
//! into multiple orders. Line items are embedded eagerly in the aggregate;
//! there is no just-in-time loading of related rows anywhere in the engine.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderId, ProductId, UserId};

/// Lifecycle status of an order.
///
/// Settlement is synchronous, so orders are created already completed.
/// A richer fulfillment lifecycle, if ever needed, is a separate state
/// machine layered on top of this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Completed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// One line of an order, with the unit price snapshotted at settlement time.
///
/// `price_per_unit` is independent of any later catalog price change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_per_unit: Decimal,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price_per_unit * Decimal::from(self.quantity)
    }
}

/// A settled order: one buyer, exactly one seller, eager line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub buyer_id: UserId,
    pub seller_id: UserId,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Sum of the line totals.
    #[must_use]
    pub fn items_total(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    /// Invariant: `total_price == Σ quantity × price_per_unit`.
    #[must_use]
    pub fn total_matches_items(&self) -> bool {
        self.total_price == self.items_total()
    }
}
