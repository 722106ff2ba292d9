//! # vendora-settlement
//!
//! The settlement kernel: the subsystem that turns a validated cart into
//! persisted per-seller orders plus matching ledger and stock mutations.
//!
//! ## Architecture
//!
//! Both entry points converge on the same primitives:
//!
//! ```text
//! CheckoutEngine::checkout        (buyer-initiated, debits the wallet)
//! CheckoutEngine::settle_external (gateway-initiated, funds arrived outside)
//!        │
//!        ▼
//! MarketStore::transaction ── resolve snapshot → validate stock
//!        → [debit buyer | amount policy check]
//!        → split by seller → credit seller → decrement stock → persist order
//!        → clear cart → [mark trade ref processed]
//! ```
//!
//! ## Atomicity
//!
//! The store's unit of work runs each attempt against a clone of the
//! store state and commits by swap only on success. A failure at any step
//! leaves wallets, stock, orders, and the cart exactly as they were. The
//! store lock is held for the whole attempt, serializing concurrent
//! checkouts that touch the same wallets or products.

pub mod checkout;
pub mod conservation;
pub mod idempotency;
pub mod ledger;
pub mod snapshot;
pub mod splitter;
pub mod stock;
pub mod store;

pub use checkout::{CheckoutEngine, ExternalSettlement};
pub use conservation::MoneyConservation;
pub use idempotency::ProcessedRefLedger;
pub use snapshot::{CartLine, CartSnapshot};
pub use splitter::SellerOrderDraft;
pub use store::MarketStore;
