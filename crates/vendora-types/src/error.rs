//! Error types for the Vendora checkout & settlement engine.
//!
//! All errors use the `MKT_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Checkout validation errors (expected, user-facing)
//! - 2xx: Wallet / ledger errors
//! - 3xx: Integrity errors (data that should exist but doesn't)
//! - 4xx: Gateway / callback errors
//! - 5xx: Authorization errors
//! - 8xx: Audit errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{ProductId, Role, TradeRef, UserId};

/// Central error enum for all Vendora operations.
#[derive(Debug, Error)]
pub enum VendoraError {
    // =================================================================
    // Checkout Validation Errors (1xx)
    // =================================================================
    /// The buyer's cart has no items.
    #[error("MKT_ERR_100: Cart is empty")]
    EmptyCart,

    /// A cart line asks for more units than the product has in stock.
    #[error("MKT_ERR_101: Insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// The buyer's wallet cannot cover the cart total.
    #[error("MKT_ERR_102: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// A cart mutation with a zero quantity.
    #[error("MKT_ERR_103: Invalid quantity: {quantity}")]
    InvalidQuantity { quantity: u32 },

    // =================================================================
    // Wallet / Ledger Errors (2xx)
    // =================================================================
    /// The user has no wallet row.
    #[error("MKT_ERR_200: Wallet not found for user {0}")]
    WalletNotFound(UserId),

    /// A ledger operation would drive a balance negative.
    #[error("MKT_ERR_201: Balance underflow")]
    BalanceUnderflow,

    // =================================================================
    // Integrity Errors (3xx)
    // =================================================================
    /// The buyer has no cart row.
    #[error("MKT_ERR_300: Cart not found for buyer {0}")]
    CartNotFound(UserId),

    /// No user record for this identifier.
    #[error("MKT_ERR_301: User not found: {0}")]
    UserNotFound(UserId),

    /// A cart line references a product that no longer exists.
    #[error("MKT_ERR_302: Unknown product: {0}")]
    UnknownProduct(ProductId),

    /// An order group references a seller that no longer exists.
    #[error("MKT_ERR_303: Seller not found: {0}")]
    SellerNotFound(UserId),

    // =================================================================
    // Gateway / Callback Errors (4xx)
    // =================================================================
    /// The callback checksum did not verify — potential forgery.
    #[error("MKT_ERR_400: Gateway checksum invalid: received {received}, computed {computed}")]
    SignatureInvalid { received: String, computed: String },

    /// The callback carries no buyer correlation field.
    #[error("MKT_ERR_401: Callback missing buyer correlation field")]
    MissingCorrelation,

    /// The gateway-reported amount differs from the cart total.
    #[error("MKT_ERR_402: Amount mismatch: cart total {expected}, gateway reported {reported}")]
    AmountMismatch { expected: Decimal, reported: Decimal },

    /// A callback field failed to parse.
    #[error("MKT_ERR_403: Malformed callback: {reason}")]
    MalformedCallback { reason: String },

    /// This trade reference has already been settled (idempotency guard).
    #[error("MKT_ERR_404: Trade reference already settled: {0}")]
    DuplicateSettlement(TradeRef),

    // =================================================================
    // Authorization Errors (5xx)
    // =================================================================
    /// The principal holds a different role than the operation requires.
    #[error("MKT_ERR_500: Wrong role: required {required}, actual {actual}")]
    WrongRole { required: Role, actual: Role },

    /// No principal could be resolved for the request.
    #[error("MKT_ERR_501: Unauthenticated")]
    Unauthenticated,

    // =================================================================
    // Audit Errors (8xx)
    // =================================================================
    /// Money conservation invariant violated — critical safety alert.
    #[error("MKT_ERR_800: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("MKT_ERR_900: Internal error: {0}")]
    Internal(String),
}

impl VendoraError {
    /// Expected, user-facing failures local to one checkout attempt.
    /// These abort before any write; the caller reports the exact condition.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyCart
                | Self::InsufficientStock { .. }
                | Self::InsufficientFunds { .. }
                | Self::InvalidQuantity { .. }
        )
    }

    /// Data-inconsistency failures for an otherwise well-formed request.
    /// Surfaced as internal failures, never retried automatically.
    #[must_use]
    pub fn is_integrity(&self) -> bool {
        matches!(
            self,
            Self::WalletNotFound(_)
                | Self::CartNotFound(_)
                | Self::UserNotFound(_)
                | Self::UnknownProduct(_)
                | Self::SellerNotFound(_)
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, VendoraError>;
