//! # vendora-types
//!
//! Shared types, errors, and configuration for the **Vendora** checkout
//! & settlement engine.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`ProductId`], [`CartId`], [`OrderId`], [`TxId`], [`TradeRef`]
//! - **Accounts**: [`User`], [`Role`], [`Principal`], the [`authorize`] capability check
//! - **Wallet model**: [`Wallet`], [`WalletTransaction`], [`TransactionKind`]
//! - **Catalog model**: [`Product`]
//! - **Cart model**: [`Cart`], [`CartItem`]
//! - **Order model**: [`Order`], [`OrderItem`], [`OrderStatus`]
//! - **Configuration**: [`GatewayConfig`], [`AmountMismatchPolicy`]
//! - **Errors**: [`VendoraError`] with `MKT_ERR_` prefix codes
//! - **Constants**: gateway field names and system-wide limits

pub mod cart;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod order;
pub mod product;
pub mod user;
pub mod wallet;

// Re-export all primary types at crate root for ergonomic imports:
//   use vendora_types::{Order, Wallet, Cart, Principal, ...};

pub use cart::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use order::*;
pub use product::*;
pub use user::*;
pub use wallet::*;

// Constants are accessed via `vendora_types::constants::FOO`
// (not re-exported to avoid name collisions).
