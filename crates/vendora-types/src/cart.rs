//! Cart types — the ephemeral buyer-session state.
//!
//! A cart exists only between add-to-cart and checkout. Items are kept in
//! insertion order so one settlement attempt iterates them deterministically.
//! The cart is cleared (all items removed) only after a full settlement
//! commits.

use serde::{Deserialize, Serialize};

use crate::{CartId, ProductId, UserId};

/// One line in a buyer's cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    /// Invariant: at least 1 (zero quantities are rejected on add).
    pub quantity: u32,
}

/// A buyer's cart. One per buyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub buyer_id: UserId,
    pub items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new(buyer_id: UserId) -> Self {
        Self {
            id: CartId::new(),
            buyer_id,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` of a product, merging into an existing line if present.
    pub fn add(&mut self, product_id: ProductId, quantity: u32) {
        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity += quantity;
        } else {
            self.items.push(CartItem {
                product_id,
                quantity,
            });
        }
    }

    /// Remove every item. Called only after a settlement commits.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
