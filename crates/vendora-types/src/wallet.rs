//! Wallet and ledger record types.
//!
//! Every user has exactly one wallet holding a non-negative balance.
//! Balances are mutated only by the ledger settlement operations in
//! `vendora-settlement`; every mutation appends a [`WalletTransaction`],
//! the append-only audit trail.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{TxId, UserId};

/// A user's stored-value balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    pub user_id: UserId,
    /// Invariant: never negative.
    pub balance: Decimal,
}

impl Wallet {
    /// Create a zero-balance wallet for a user.
    #[must_use]
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            balance: Decimal::ZERO,
        }
    }

    /// Whether the wallet can cover a debit of `amount`.
    #[must_use]
    pub fn can_cover(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }
}

/// The kind of balance change a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Debit leg: buyer pays for a checkout.
    Purchase,
    /// Credit leg: seller receives settlement proceeds.
    PaymentReceived,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Purchase => write!(f, "PURCHASE"),
            Self::PaymentReceived => write!(f, "PAYMENT_RECEIVED"),
        }
    }
}

/// An append-only record of one balance change. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: TxId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    /// Signed: negative for debits, positive for credits.
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    /// Record a debit of `amount` (stored negated).
    #[must_use]
    pub fn debit(user_id: UserId, amount: Decimal, at: DateTime<Utc>) -> Self {
        Self {
            id: TxId::new(),
            user_id,
            kind: TransactionKind::Purchase,
            amount: -amount,
            created_at: at,
        }
    }

    /// Record a credit of `amount`.
    #[must_use]
    pub fn credit(user_id: UserId, amount: Decimal, at: DateTime<Utc>) -> Self {
        Self {
            id: TxId::new(),
            user_id,
            kind: TransactionKind::PaymentReceived,
            amount,
            created_at: at,
        }
    }
}
