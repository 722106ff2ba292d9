//! Cart snapshot resolution.
//!
//! One settlement attempt works from a single consistent read of the cart:
//! every line resolved against the live product record (price, stock,
//! seller) at that moment. Resolution fails before any mutation if the cart
//! is missing or empty.

use rust_decimal::Decimal;

use vendora_types::{CartId, ProductId, Result, UserId, VendoraError};

use crate::store::StoreInner;

/// One cart line with its product resolved.
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product_id: ProductId,
    pub seller_id: UserId,
    pub product_name: String,
    pub quantity: u32,
    /// The product's price as of this read — the value snapshotted into the
    /// order line.
    pub unit_price: Decimal,
    /// Stock level as of this read. Advisory only: the decrement re-checks.
    pub available_stock: u32,
}

impl CartLine {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// A buyer's cart resolved for one settlement attempt.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    pub cart_id: CartId,
    pub buyer_id: UserId,
    pub lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// The cart total at current prices.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

/// Load the buyer's cart and resolve every line.
///
/// # Errors
/// - [`VendoraError::CartNotFound`] if the buyer has no cart
/// - [`VendoraError::EmptyCart`] if the cart has zero items
/// - [`VendoraError::UnknownProduct`] if a line references a vanished product
pub(crate) fn resolve_cart(inner: &StoreInner, buyer_id: UserId) -> Result<CartSnapshot> {
    let cart = inner
        .carts
        .get(&buyer_id)
        .ok_or(VendoraError::CartNotFound(buyer_id))?;

    if cart.is_empty() {
        return Err(VendoraError::EmptyCart);
    }

    let mut lines = Vec::with_capacity(cart.items.len());
    for item in &cart.items {
        let product = inner
            .products
            .get(&item.product_id)
            .ok_or(VendoraError::UnknownProduct(item.product_id))?;
        lines.push(CartLine {
            product_id: product.id,
            seller_id: product.seller_id,
            product_name: product.name.clone(),
            quantity: item.quantity,
            unit_price: product.unit_price,
            available_stock: product.stock,
        });
    }

    Ok(CartSnapshot {
        cart_id: cart.id,
        buyer_id,
        lines,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MarketStore;
    use vendora_types::{Product, Role, User};

    #[test]
    fn snapshot_resolves_price_seller_and_stock() {
        let store = MarketStore::new();
        let buyer = User::new("b@example.com", Role::Buyer);
        let seller = User::new("s@example.com", Role::Seller);
        let product = Product::new(seller.id, "Widget", Decimal::new(300, 0), 5);
        store.add_user(buyer.clone());
        store.add_user(seller.clone());
        store.add_product(product.clone());
        store.add_to_cart(buyer.id, product.id, 2).unwrap();

        let snap = store.cart_snapshot(buyer.id).unwrap();
        assert_eq!(snap.buyer_id, buyer.id);
        assert_eq!(snap.lines.len(), 1);
        let line = &snap.lines[0];
        assert_eq!(line.seller_id, seller.id);
        assert_eq!(line.unit_price, Decimal::new(300, 0));
        assert_eq!(line.available_stock, 5);
        assert_eq!(snap.total(), Decimal::new(600, 0));
    }

    #[test]
    fn missing_cart_fails() {
        let store = MarketStore::new();
        let err = store.cart_snapshot(UserId::new()).unwrap_err();
        assert!(matches!(err, VendoraError::CartNotFound(_)));
    }

    #[test]
    fn empty_cart_fails() {
        let store = MarketStore::new();
        let buyer = User::new("b@example.com", Role::Buyer);
        store.add_user(buyer.clone());
        let err = store.cart_snapshot(buyer.id).unwrap_err();
        assert!(matches!(err, VendoraError::EmptyCart));
    }

    #[test]
    fn total_sums_across_sellers() {
        let store = MarketStore::new();
        let buyer = User::new("b@example.com", Role::Buyer);
        let s1 = User::new("s1@example.com", Role::Seller);
        let s2 = User::new("s2@example.com", Role::Seller);
        let a = Product::new(s1.id, "A", Decimal::new(300, 0), 5);
        let b = Product::new(s2.id, "B", Decimal::new(250, 0), 1);
        store.add_user(buyer.clone());
        store.add_user(s1);
        store.add_user(s2);
        store.add_product(a.clone());
        store.add_product(b.clone());
        store.add_to_cart(buyer.id, a.id, 2).unwrap();
        store.add_to_cart(buyer.id, b.id, 1).unwrap();

        let snap = store.cart_snapshot(buyer.id).unwrap();
        assert_eq!(snap.total(), Decimal::new(850, 0));
    }
}
