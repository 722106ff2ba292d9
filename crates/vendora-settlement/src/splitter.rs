//! Order splitting — partitions one cart into per-seller order aggregates.
//!
//! Every order has exactly one seller, so a multi-seller cart settles into
//! multiple orders. Grouping uses a `BTreeMap` keyed by seller id: the
//! seller processing order is deterministic within one invocation.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use vendora_types::{Order, OrderId, OrderItem, OrderStatus, UserId};

use crate::snapshot::{CartLine, CartSnapshot};

/// One seller's share of a cart, ready to materialize into an [`Order`].
#[derive(Debug, Clone)]
pub struct SellerOrderDraft {
    pub seller_id: UserId,
    pub lines: Vec<CartLine>,
}

impl SellerOrderDraft {
    /// Group subtotal at the snapshot's resolved prices.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Materialize the order aggregate, snapshotting each line's unit price.
    #[must_use]
    pub fn into_order(self, buyer_id: UserId, at: DateTime<Utc>) -> Order {
        let total_price = self.subtotal();
        let items = self
            .lines
            .into_iter()
            .map(|line| OrderItem {
                product_id: line.product_id,
                quantity: line.quantity,
                price_per_unit: line.unit_price,
            })
            .collect();
        Order {
            id: OrderId::new(),
            buyer_id,
            seller_id: self.seller_id,
            total_price,
            status: OrderStatus::Completed,
            created_at: at,
            items,
        }
    }
}

/// Partition the snapshot's lines by seller, in deterministic seller order.
#[must_use]
pub fn split_by_seller(snapshot: &CartSnapshot) -> Vec<SellerOrderDraft> {
    let mut groups: BTreeMap<UserId, Vec<CartLine>> = BTreeMap::new();
    for line in &snapshot.lines {
        groups.entry(line.seller_id).or_default().push(line.clone());
    }
    groups
        .into_iter()
        .map(|(seller_id, lines)| SellerOrderDraft { seller_id, lines })
        .collect()
}
