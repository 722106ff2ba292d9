//! Checkout orchestration — both settlement entry points.
//!
//! The buyer-initiated path debits the buyer's wallet; the gateway-initiated
//! path skips the debit because the funds were captured outside the wallet
//! system. Everything else — stock validation, per-seller splitting, seller
//! credits, inventory decrement, order persistence, cart clearing — is the
//! same kernel, executed as one atomic unit of work.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};

use vendora_types::{
    authorize, AmountMismatchPolicy, Order, Principal, Result, Role, TradeRef, UserId,
    VendoraError,
};

use crate::store::{MarketStore, StoreInner};
use crate::{ledger, snapshot, splitter, stock};

/// How a settlement attempt is funded.
enum Funding {
    /// Debit the buyer's wallet for the cart total.
    WalletDebit,
    /// Funds were captured by the external gateway; no wallet debit.
    External {
        trade_ref: TradeRef,
        paid_amount: Decimal,
        policy: AmountMismatchPolicy,
    },
}

/// Outcome of a gateway-funded settlement attempt.
#[derive(Debug)]
pub enum ExternalSettlement {
    /// The cart settled into these orders.
    Settled(Vec<Order>),
    /// The trade reference was already settled, or the cart was already
    /// cleared by a previous delivery — a duplicate, not an error.
    AlreadyProcessed,
}

/// The settlement engine. Cheap to clone; all state lives in the store.
#[derive(Clone)]
pub struct CheckoutEngine {
    store: Arc<MarketStore>,
}

impl CheckoutEngine {
    #[must_use]
    pub fn new(store: Arc<MarketStore>) -> Self {
        Self { store }
    }

    /// Buyer-initiated checkout: validate, debit the buyer, split per
    /// seller, credit sellers, decrement stock, persist orders, clear the
    /// cart — all or nothing.
    ///
    /// # Errors
    /// Validation errors (`EmptyCart`, `InsufficientStock`,
    /// `InsufficientFunds`) and integrity errors abort with zero side
    /// effects.
    pub fn checkout(&self, principal: &Principal) -> Result<Vec<Order>> {
        let buyer = authorize(principal, Role::Buyer)?;
        info!(buyer = %buyer.user_id, "checkout started");

        let orders = self.store.transaction(|inner| {
            settle_cart(inner, buyer.user_id, &Funding::WalletDebit, Utc::now())
        })?;

        info!(
            buyer = %buyer.user_id,
            orders = orders.len(),
            "checkout completed"
        );
        Ok(orders)
    }

    /// Gateway-initiated settlement: the external twin of [`checkout`].
    ///
    /// Skips the buyer debit (the money never passed through the wallet)
    /// and is idempotent per trade reference: a repeat delivery returns
    /// [`ExternalSettlement::AlreadyProcessed`] without writing anything.
    ///
    /// [`checkout`]: CheckoutEngine::checkout
    pub fn settle_external(
        &self,
        principal: &Principal,
        trade_ref: &TradeRef,
        paid_amount: Decimal,
        policy: AmountMismatchPolicy,
    ) -> Result<ExternalSettlement> {
        let buyer = authorize(principal, Role::Buyer)?;
        info!(
            buyer = %buyer.user_id,
            trade_ref = %trade_ref,
            %paid_amount,
            "external settlement started"
        );

        self.store.transaction(|inner| {
            if inner.processed_refs.is_processed(trade_ref) {
                info!(trade_ref = %trade_ref, "trade reference already settled; no-op");
                return Ok(ExternalSettlement::AlreadyProcessed);
            }

            let funding = Funding::External {
                trade_ref: trade_ref.clone(),
                paid_amount,
                policy,
            };
            match settle_cart(inner, buyer.user_id, &funding, Utc::now()) {
                Ok(orders) => Ok(ExternalSettlement::Settled(orders)),
                // An empty cart here means a previous delivery already
                // settled this checkout and cleared the cart.
                Err(VendoraError::EmptyCart) => {
                    warn!(
                        buyer = %buyer.user_id,
                        trade_ref = %trade_ref,
                        "cart already empty; treating callback as duplicate"
                    );
                    Ok(ExternalSettlement::AlreadyProcessed)
                }
                Err(err) => Err(err),
            }
        })
    }
}

/// The shared settlement kernel. Runs entirely inside one unit of work.
fn settle_cart(
    inner: &mut StoreInner,
    buyer_id: UserId,
    funding: &Funding,
    now: DateTime<Utc>,
) -> Result<Vec<Order>> {
    // 1. Consistent cart snapshot; aborts on missing or empty cart.
    let snap = snapshot::resolve_cart(inner, buyer_id)?;

    // 2. Whole-cart stock check before any money moves.
    stock::validate_stock(inner, &snap)?;

    // 3. Funding leg.
    let total = snap.total();
    match funding {
        Funding::WalletDebit => {
            let wallet = inner
                .wallets
                .get(&buyer_id)
                .ok_or(VendoraError::WalletNotFound(buyer_id))?;
            if !wallet.can_cover(total) {
                warn!(
                    buyer = %buyer_id,
                    balance = %wallet.balance,
                    %total,
                    "insufficient funds"
                );
                return Err(VendoraError::InsufficientFunds {
                    needed: total,
                    available: wallet.balance,
                });
            }
            ledger::debit(inner, buyer_id, total, now)?;
        }
        Funding::External {
            paid_amount,
            policy,
            ..
        } => {
            if *paid_amount != total {
                match policy {
                    AmountMismatchPolicy::Reject => {
                        return Err(VendoraError::AmountMismatch {
                            expected: total,
                            reported: *paid_amount,
                        });
                    }
                    AmountMismatchPolicy::LogOnly => {
                        warn!(
                            buyer = %buyer_id,
                            cart_total = %total,
                            reported = %paid_amount,
                            "gateway amount mismatch; settling anyway per policy"
                        );
                    }
                }
            }
        }
    }

    // 4. Split into per-seller orders and settle each.
    let drafts = splitter::split_by_seller(&snap);
    let mut orders = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let seller_id = draft.seller_id;
        if !inner.users.contains_key(&seller_id) {
            return Err(VendoraError::SellerNotFound(seller_id));
        }

        let subtotal = draft.subtotal();
        ledger::credit(inner, seller_id, subtotal, now)?;

        let order = draft.into_order(buyer_id, now);
        stock::apply_stock_decrements(inner, &order)?;
        info!(
            order = %order.id,
            seller = %seller_id,
            total = %order.total_price,
            "order created"
        );
        orders.push(order.clone());
        inner.orders.push(order);
    }

    // 5. Clear the cart — only reachable when every order settled.
    if let Some(cart) = inner.carts.get_mut(&buyer_id) {
        cart.clear();
    }

    // 6. Externally funded settlements mint wallet supply and consume the
    //    trade reference, inside the same unit.
    if let Funding::External { trade_ref, .. } = funding {
        inner.conservation.record_funding(total);
        inner.processed_refs.mark_processed(trade_ref)?;
    }

    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendora_types::{Product, User};

    struct Fixture {
        engine: CheckoutEngine,
        store: Arc<MarketStore>,
        buyer: User,
        seller1: User,
        seller2: User,
        product_a: Product,
        product_b: Product,
    }

    /// The reference scenario: wallet 1000; A (seller1, 300, stock 5) × 2
    /// and B (seller2, 250, stock 1) × 1 in the cart.
    fn fixture() -> Fixture {
        let store = Arc::new(MarketStore::new());
        let buyer = User::new("buyer@example.com", Role::Buyer);
        let seller1 = User::new("s1@example.com", Role::Seller);
        let seller2 = User::new("s2@example.com", Role::Seller);
        let product_a = Product::new(seller1.id, "Product A", Decimal::new(300, 0), 5);
        let product_b = Product::new(seller2.id, "Product B", Decimal::new(250, 0), 1);

        store.add_user(buyer.clone());
        store.add_user(seller1.clone());
        store.add_user(seller2.clone());
        store.add_product(product_a.clone());
        store.add_product(product_b.clone());
        store.fund_wallet(buyer.id, Decimal::new(1000, 0)).unwrap();
        store.add_to_cart(buyer.id, product_a.id, 2).unwrap();
        store.add_to_cart(buyer.id, product_b.id, 1).unwrap();

        Fixture {
            engine: CheckoutEngine::new(Arc::clone(&store)),
            store,
            buyer,
            seller1,
            seller2,
            product_a,
            product_b,
        }
    }

    #[test]
    fn reference_scenario_settles() {
        let f = fixture();
        let orders = f.engine.checkout(&Principal::of(&f.buyer)).unwrap();

        assert_eq!(orders.len(), 2);
        let mut totals: Vec<Decimal> = orders.iter().map(|o| o.total_price).collect();
        totals.sort_unstable();
        assert_eq!(totals, vec![Decimal::new(250, 0), Decimal::new(600, 0)]);

        assert_eq!(
            f.store.wallet_balance(f.buyer.id),
            Some(Decimal::new(150, 0))
        );
        assert_eq!(
            f.store.wallet_balance(f.seller1.id),
            Some(Decimal::new(600, 0))
        );
        assert_eq!(
            f.store.wallet_balance(f.seller2.id),
            Some(Decimal::new(250, 0))
        );
        assert_eq!(f.store.product_stock(f.product_a.id), Some(3));
        assert_eq!(f.store.product_stock(f.product_b.id), Some(0));
        assert!(f.store.cart_items(f.buyer.id).is_empty());
        f.store.verify_conservation().unwrap();
    }

    #[test]
    fn every_order_has_one_seller_and_matching_total() {
        let f = fixture();
        let orders = f.engine.checkout(&Principal::of(&f.buyer)).unwrap();
        for order in &orders {
            assert!(order.total_matches_items());
            assert!(order.seller_id == f.seller1.id || order.seller_id == f.seller2.id);
        }
    }

    #[test]
    fn insufficient_funds_aborts_without_writes() {
        let store = Arc::new(MarketStore::new());
        let buyer = User::new("buyer@example.com", Role::Buyer);
        let seller = User::new("s@example.com", Role::Seller);
        let a = Product::new(seller.id, "A", Decimal::new(300, 0), 5);
        let b = Product::new(seller.id, "B", Decimal::new(250, 0), 1);
        store.add_user(buyer.clone());
        store.add_user(seller.clone());
        store.add_product(a.clone());
        store.add_product(b.clone());
        store.fund_wallet(buyer.id, Decimal::new(500, 0)).unwrap();
        store.add_to_cart(buyer.id, a.id, 2).unwrap();
        store.add_to_cart(buyer.id, b.id, 1).unwrap();

        let engine = CheckoutEngine::new(Arc::clone(&store));
        let err = engine.checkout(&Principal::of(&buyer)).unwrap_err();
        assert!(matches!(err, VendoraError::InsufficientFunds { .. }));

        // Nothing moved.
        assert_eq!(store.wallet_balance(buyer.id), Some(Decimal::new(500, 0)));
        assert_eq!(store.wallet_balance(seller.id), Some(Decimal::ZERO));
        assert_eq!(store.product_stock(a.id), Some(5));
        assert_eq!(store.product_stock(b.id), Some(1));
        assert_eq!(store.cart_items(buyer.id).len(), 2);
        assert!(store.transactions_for(buyer.id).is_empty());
    }

    #[test]
    fn insufficient_stock_aborts_without_writes() {
        let store = Arc::new(MarketStore::new());
        let buyer = User::new("buyer@example.com", Role::Buyer);
        let seller = User::new("s@example.com", Role::Seller);
        let b = Product::new(seller.id, "B", Decimal::new(250, 0), 1);
        store.add_user(buyer.clone());
        store.add_user(seller.clone());
        store.add_product(b.clone());
        store.fund_wallet(buyer.id, Decimal::new(1000, 0)).unwrap();
        store.add_to_cart(buyer.id, b.id, 2).unwrap();

        let engine = CheckoutEngine::new(Arc::clone(&store));
        let err = engine.checkout(&Principal::of(&buyer)).unwrap_err();
        assert!(matches!(
            err,
            VendoraError::InsufficientStock {
                requested: 2,
                available: 1,
                ..
            }
        ));
        assert_eq!(store.wallet_balance(buyer.id), Some(Decimal::new(1000, 0)));
        assert_eq!(store.product_stock(b.id), Some(1));
    }

    #[test]
    fn empty_cart_rejected() {
        let store = Arc::new(MarketStore::new());
        let buyer = User::new("buyer@example.com", Role::Buyer);
        store.add_user(buyer.clone());
        let engine = CheckoutEngine::new(store);
        let err = engine.checkout(&Principal::of(&buyer)).unwrap_err();
        assert!(matches!(err, VendoraError::EmptyCart));
    }

    #[test]
    fn seller_without_wallet_rolls_back_everything() {
        // An integrity fault mid-sequence: seller user exists but the wallet
        // row is gone. The buyer debit made earlier in the unit must not
        // survive.
        let store = Arc::new(MarketStore::new());
        let buyer = User::new("buyer@example.com", Role::Buyer);
        let seller = User::new("s@example.com", Role::Seller);
        let p = Product::new(seller.id, "P", Decimal::new(100, 0), 5);
        store.add_user(buyer.clone());
        store.add_user(seller.clone());
        store.add_product(p.clone());
        store.fund_wallet(buyer.id, Decimal::new(1000, 0)).unwrap();
        store.add_to_cart(buyer.id, p.id, 1).unwrap();

        // Sabotage: remove the seller's wallet row directly.
        store
            .transaction(|inner| {
                inner.wallets.remove(&seller.id);
                Ok(())
            })
            .unwrap();

        let engine = CheckoutEngine::new(Arc::clone(&store));
        let err = engine.checkout(&Principal::of(&buyer)).unwrap_err();
        assert!(err.is_integrity());

        // The debit was rolled back with the rest of the unit.
        assert_eq!(store.wallet_balance(buyer.id), Some(Decimal::new(1000, 0)));
        assert_eq!(store.product_stock(p.id), Some(5));
        assert_eq!(store.cart_items(buyer.id).len(), 1);
        assert!(store.transactions_for(buyer.id).is_empty());
    }

    #[test]
    fn seller_principal_cannot_checkout() {
        let f = fixture();
        let err = f.engine.checkout(&Principal::of(&f.seller1)).unwrap_err();
        assert!(matches!(err, VendoraError::WrongRole { .. }));
    }

    #[test]
    fn external_settlement_skips_buyer_debit() {
        let f = fixture();
        let trade_ref = TradeRef::new("TOSN1722580000000");
        let result = f
            .engine
            .settle_external(
                &Principal::of(&f.buyer),
                &trade_ref,
                Decimal::new(850, 0),
                AmountMismatchPolicy::LogOnly,
            )
            .unwrap();

        let orders = match result {
            ExternalSettlement::Settled(orders) => orders,
            ExternalSettlement::AlreadyProcessed => panic!("expected settlement"),
        };
        assert_eq!(orders.len(), 2);

        // Buyer wallet untouched; sellers credited; stock decremented.
        assert_eq!(
            f.store.wallet_balance(f.buyer.id),
            Some(Decimal::new(1000, 0))
        );
        assert_eq!(
            f.store.wallet_balance(f.seller1.id),
            Some(Decimal::new(600, 0))
        );
        assert_eq!(
            f.store.wallet_balance(f.seller2.id),
            Some(Decimal::new(250, 0))
        );
        assert_eq!(f.store.product_stock(f.product_a.id), Some(3));
        assert!(f.store.cart_items(f.buyer.id).is_empty());
        assert!(f.store.is_ref_processed(&trade_ref));
        f.store.verify_conservation().unwrap();
    }

    #[test]
    fn external_settlement_is_idempotent_per_trade_ref() {
        let f = fixture();
        let trade_ref = TradeRef::new("TOSN1722580000000");
        let principal = Principal::of(&f.buyer);

        let first = f
            .engine
            .settle_external(
                &principal,
                &trade_ref,
                Decimal::new(850, 0),
                AmountMismatchPolicy::LogOnly,
            )
            .unwrap();
        assert!(matches!(first, ExternalSettlement::Settled(_)));

        let second = f
            .engine
            .settle_external(
                &principal,
                &trade_ref,
                Decimal::new(850, 0),
                AmountMismatchPolicy::LogOnly,
            )
            .unwrap();
        assert!(matches!(second, ExternalSettlement::AlreadyProcessed));

        // Exactly one settlement's worth of effects.
        assert_eq!(
            f.store.wallet_balance(f.seller1.id),
            Some(Decimal::new(600, 0))
        );
        assert_eq!(f.store.product_stock(f.product_a.id), Some(3));
        assert_eq!(f.store.orders_for_buyer(f.buyer.id).len(), 2);
    }

    #[test]
    fn amount_mismatch_log_only_settles() {
        let f = fixture();
        let result = f
            .engine
            .settle_external(
                &Principal::of(&f.buyer),
                &TradeRef::new("TOSN9"),
                Decimal::new(9999, 0),
                AmountMismatchPolicy::LogOnly,
            )
            .unwrap();
        assert!(matches!(result, ExternalSettlement::Settled(_)));
    }

    #[test]
    fn amount_mismatch_reject_aborts_without_writes() {
        let f = fixture();
        let trade_ref = TradeRef::new("TOSN9");
        let err = f
            .engine
            .settle_external(
                &Principal::of(&f.buyer),
                &trade_ref,
                Decimal::new(9999, 0),
                AmountMismatchPolicy::Reject,
            )
            .unwrap_err();
        assert!(matches!(err, VendoraError::AmountMismatch { .. }));

        assert_eq!(f.store.wallet_balance(f.seller1.id), Some(Decimal::ZERO));
        assert_eq!(f.store.product_stock(f.product_a.id), Some(5));
        assert_eq!(f.store.cart_items(f.buyer.id).len(), 2);
        // The reference stays unconsumed so a corrected retry can settle.
        assert!(!f.store.is_ref_processed(&trade_ref));
    }
}
