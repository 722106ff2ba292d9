//! Stock validation and inventory decrement.
//!
//! `validate_stock` is the read-only precondition check; cheap enough to
//! re-run before every settlement attempt. `apply_stock_decrements` is the
//! write side, and re-checks the level at decrement time: the two run in
//! the same unit of work, so a concurrent checkout that consumed stock in
//! between is impossible to act on.

use tracing::warn;

use vendora_types::{Order, Result, VendoraError};

use crate::snapshot::CartSnapshot;
use crate::store::StoreInner;

/// Check every cart line against live stock. Performs no writes.
///
/// # Errors
/// [`VendoraError::InsufficientStock`] for the first offending line in cart
/// order.
pub(crate) fn validate_stock(inner: &StoreInner, snapshot: &CartSnapshot) -> Result<()> {
    for line in &snapshot.lines {
        let product = inner
            .products
            .get(&line.product_id)
            .ok_or(VendoraError::UnknownProduct(line.product_id))?;
        if product.stock < line.quantity {
            warn!(
                product = %product.id,
                requested = line.quantity,
                available = product.stock,
                "stock check failed"
            );
            return Err(VendoraError::InsufficientStock {
                product_id: product.id,
                requested: line.quantity,
                available: product.stock,
            });
        }
    }
    Ok(())
}

/// Decrement stock for every line of a settled order.
///
/// Guards `stock >= quantity` again at decrement time rather than trusting
/// an earlier validation.
pub(crate) fn apply_stock_decrements(inner: &mut StoreInner, order: &Order) -> Result<()> {
    for item in &order.items {
        let product = inner
            .products
            .get_mut(&item.product_id)
            .ok_or(VendoraError::UnknownProduct(item.product_id))?;
        if product.stock < item.quantity {
            return Err(VendoraError::InsufficientStock {
                product_id: product.id,
                requested: item.quantity,
                available: product.stock,
            });
        }
        product.stock -= item.quantity;
    }
    Ok(())
}
