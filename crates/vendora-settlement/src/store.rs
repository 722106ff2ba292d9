//! The market store — shared mutable state with unit-of-work semantics.
//!
//! All records a settlement touches (users, wallets, transactions, products,
//! carts, orders, the processed-reference ledger, conservation tallies) live
//! behind one lock. The unit of work (`transaction`) clones the inner state,
//! runs the closure against the clone, and commits by swap only on `Ok` —
//! an `Err` drops the clone and nothing is observable. Holding the lock for
//! the whole attempt serializes concurrent checkouts, so a stock or balance
//! check and the write it guards always see the same state.

use std::collections::HashMap;
use std::sync::Mutex;

use rust_decimal::Decimal;

use vendora_types::{
    Cart, CartItem, Order, Product, ProductId, Result, TradeRef, User, UserId, VendoraError,
    Wallet, WalletTransaction,
};

use crate::conservation::MoneyConservation;
use crate::idempotency::ProcessedRefLedger;
use crate::snapshot::{self, CartSnapshot};

/// The full persisted state, cloned per unit of work.
#[derive(Debug, Clone)]
pub(crate) struct StoreInner {
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) wallets: HashMap<UserId, Wallet>,
    pub(crate) transactions: Vec<WalletTransaction>,
    pub(crate) products: HashMap<ProductId, Product>,
    /// Keyed by buyer — one cart per buyer.
    pub(crate) carts: HashMap<UserId, Cart>,
    pub(crate) orders: Vec<Order>,
    pub(crate) processed_refs: ProcessedRefLedger,
    pub(crate) conservation: MoneyConservation,
}

impl StoreInner {
    fn new() -> Self {
        Self {
            users: HashMap::new(),
            wallets: HashMap::new(),
            transactions: Vec::new(),
            products: HashMap::new(),
            carts: HashMap::new(),
            orders: Vec::new(),
            processed_refs: ProcessedRefLedger::new(
                vendora_types::constants::PROCESSED_REF_CAPACITY,
            ),
            conservation: MoneyConservation::new(),
        }
    }
}

/// Shared store handle. All settlement flows and the gateway boundary go
/// through this type.
pub struct MarketStore {
    inner: Mutex<StoreInner>,
}

impl MarketStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::new()),
        }
    }

    /// Run `f` as one atomic, serialized unit of work.
    ///
    /// Every read inside the closure observes the same state the writes
    /// apply to. On `Ok` the mutated clone replaces the store state; on
    /// `Err` it is dropped and no side effect persists.
    pub(crate) fn transaction<T>(
        &self,
        f: impl FnOnce(&mut StoreInner) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut working = guard.clone();
        let out = f(&mut working)?;
        *guard = working;
        Ok(out)
    }

    /// Run a read-only closure under the store lock.
    pub(crate) fn read<T>(&self, f: impl FnOnce(&StoreInner) -> T) -> T {
        let guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        f(&guard)
    }

    // -----------------------------------------------------------------
    // Seeding / collaborator CRUD
    // -----------------------------------------------------------------

    /// Register a user. Creates the wallet, and a cart for buyers.
    pub fn add_user(&self, user: User) {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.wallets.insert(user.id, Wallet::new(user.id));
        if user.role == vendora_types::Role::Buyer {
            guard.carts.insert(user.id, Cart::new(user.id));
        }
        guard.users.insert(user.id, user);
    }

    /// Deposit external funds into a wallet. Counts toward the conservation
    /// tally: money entering the system from outside.
    pub fn fund_wallet(&self, user_id: UserId, amount: Decimal) -> Result<()> {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let wallet = guard
            .wallets
            .get_mut(&user_id)
            .ok_or(VendoraError::WalletNotFound(user_id))?;
        wallet.balance += amount;
        guard.conservation.record_funding(amount);
        Ok(())
    }

    /// List a product in the catalog.
    pub fn add_product(&self, product: Product) {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.products.insert(product.id, product);
    }

    /// Add `quantity` of a product to a buyer's cart.
    pub fn add_to_cart(&self, buyer_id: UserId, product_id: ProductId, quantity: u32) -> Result<()> {
        if quantity == 0 {
            return Err(VendoraError::InvalidQuantity { quantity });
        }
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if !guard.products.contains_key(&product_id) {
            return Err(VendoraError::UnknownProduct(product_id));
        }
        let cart = guard
            .carts
            .get_mut(&buyer_id)
            .ok_or(VendoraError::CartNotFound(buyer_id))?;
        cart.add(product_id, quantity);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// Look up a user record.
    #[must_use]
    pub fn user(&self, user_id: UserId) -> Option<User> {
        self.read(|inner| inner.users.get(&user_id).cloned())
    }

    /// Current wallet balance, if the user has a wallet.
    #[must_use]
    pub fn wallet_balance(&self, user_id: UserId) -> Option<Decimal> {
        self.read(|inner| inner.wallets.get(&user_id).map(|w| w.balance))
    }

    /// Current stock count, if the product exists.
    #[must_use]
    pub fn product_stock(&self, product_id: ProductId) -> Option<u32> {
        self.read(|inner| inner.products.get(&product_id).map(|p| p.stock))
    }

    /// The buyer's current cart items.
    #[must_use]
    pub fn cart_items(&self, buyer_id: UserId) -> Vec<CartItem> {
        self.read(|inner| {
            inner
                .carts
                .get(&buyer_id)
                .map(|c| c.items.clone())
                .unwrap_or_default()
        })
    }

    /// Resolve the buyer's cart against live product records, as one
    /// consistent read. Used by the outbound gateway initiation, which runs
    /// outside any settlement unit.
    pub fn cart_snapshot(&self, buyer_id: UserId) -> Result<CartSnapshot> {
        self.read(|inner| snapshot::resolve_cart(inner, buyer_id))
    }

    /// All orders where this user is the buyer, eager line items included.
    #[must_use]
    pub fn orders_for_buyer(&self, buyer_id: UserId) -> Vec<Order> {
        self.read(|inner| {
            inner
                .orders
                .iter()
                .filter(|o| o.buyer_id == buyer_id)
                .cloned()
                .collect()
        })
    }

    /// All orders where this user is the seller, eager line items included.
    #[must_use]
    pub fn orders_for_seller(&self, seller_id: UserId) -> Vec<Order> {
        self.read(|inner| {
            inner
                .orders
                .iter()
                .filter(|o| o.seller_id == seller_id)
                .cloned()
                .collect()
        })
    }

    /// The append-only transaction trail for one user.
    #[must_use]
    pub fn transactions_for(&self, user_id: UserId) -> Vec<WalletTransaction> {
        self.read(|inner| {
            inner
                .transactions
                .iter()
                .filter(|t| t.user_id == user_id)
                .cloned()
                .collect()
        })
    }

    /// Whether a gateway trade reference has already been settled.
    #[must_use]
    pub fn is_ref_processed(&self, trade_ref: &TradeRef) -> bool {
        self.read(|inner| inner.processed_refs.is_processed(trade_ref))
    }

    /// Verify the conservation invariant: the sum of all wallet balances
    /// equals the recorded funding total.
    pub fn verify_conservation(&self) -> Result<()> {
        self.read(|inner| {
            let actual: Decimal = inner.wallets.values().map(|w| w.balance).sum();
            inner.conservation.verify(actual)
        })
    }
}

impl Default for MarketStore {
    fn default() -> Self {
        Self::new()
    }
}
