//! Ledger settlement — the only code that mutates wallet balances.
//!
//! Every balance change appends a [`WalletTransaction`]; the trail is
//! append-only. A debit that would drive a balance negative is rejected
//! with no record appended. Both operations run inside the enclosing unit
//! of work, so an unpaired debit is never observable.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::debug;

use vendora_types::{Result, UserId, VendoraError, WalletTransaction};

use crate::store::StoreInner;

/// Debit `amount` from the user's wallet and append a purchase record.
///
/// # Errors
/// - [`VendoraError::WalletNotFound`] if the user has no wallet
/// - [`VendoraError::InsufficientFunds`] if the balance cannot cover it
pub(crate) fn debit(
    inner: &mut StoreInner,
    user_id: UserId,
    amount: Decimal,
    at: DateTime<Utc>,
) -> Result<()> {
    let wallet = inner
        .wallets
        .get_mut(&user_id)
        .ok_or(VendoraError::WalletNotFound(user_id))?;

    if wallet.balance < amount {
        return Err(VendoraError::InsufficientFunds {
            needed: amount,
            available: wallet.balance,
        });
    }

    wallet.balance -= amount;
    inner
        .transactions
        .push(WalletTransaction::debit(user_id, amount, at));
    debug!(user = %user_id, %amount, "wallet debited");
    Ok(())
}

/// Credit `amount` to the user's wallet and append a payment-received record.
///
/// # Errors
/// [`VendoraError::WalletNotFound`] if the user has no wallet.
pub(crate) fn credit(
    inner: &mut StoreInner,
    user_id: UserId,
    amount: Decimal,
    at: DateTime<Utc>,
) -> Result<()> {
    let wallet = inner
        .wallets
        .get_mut(&user_id)
        .ok_or(VendoraError::WalletNotFound(user_id))?;

    wallet.balance += amount;
    inner
        .transactions
        .push(WalletTransaction::credit(user_id, amount, at));
    debug!(user = %user_id, %amount, "wallet credited");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MarketStore;
    use vendora_types::{Role, TransactionKind, User};

    fn funded_store(amount: Decimal) -> (MarketStore, User) {
        let store = MarketStore::new();
        let user = User::new("u@example.com", Role::Buyer);
        store.add_user(user.clone());
        store.fund_wallet(user.id, amount).unwrap();
        (store, user)
    }

    #[test]
    fn debit_reduces_balance_and_appends_record() {
        let (store, user) = funded_store(Decimal::new(1000, 0));
        store
            .transaction(|inner| debit(inner, user.id, Decimal::new(850, 0), Utc::now()))
            .unwrap();
        assert_eq!(store.wallet_balance(user.id), Some(Decimal::new(150, 0)));

        let txs = store.transactions_for(user.id);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].kind, TransactionKind::Purchase);
        assert_eq!(txs[0].amount, Decimal::new(-850, 0));
    }

    #[test]
    fn overdraft_rejected_without_record() {
        let (store, user) = funded_store(Decimal::new(500, 0));
        let err = store
            .transaction(|inner| debit(inner, user.id, Decimal::new(850, 0), Utc::now()))
            .unwrap_err();
        assert!(matches!(err, VendoraError::InsufficientFunds { .. }));
        // Balance untouched, no transaction appended.
        assert_eq!(store.wallet_balance(user.id), Some(Decimal::new(500, 0)));
        assert!(store.transactions_for(user.id).is_empty());
    }

    #[test]
    fn exact_balance_debit_allowed() {
        let (store, user) = funded_store(Decimal::new(850, 0));
        store
            .transaction(|inner| debit(inner, user.id, Decimal::new(850, 0), Utc::now()))
            .unwrap();
        assert_eq!(store.wallet_balance(user.id), Some(Decimal::ZERO));
    }

    #[test]
    fn credit_increases_balance_and_appends_record() {
        let (store, user) = funded_store(Decimal::ZERO);
        store
            .transaction(|inner| credit(inner, user.id, Decimal::new(600, 0), Utc::now()))
            .unwrap();
        assert_eq!(store.wallet_balance(user.id), Some(Decimal::new(600, 0)));

        let txs = store.transactions_for(user.id);
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].kind, TransactionKind::PaymentReceived);
        assert_eq!(txs[0].amount, Decimal::new(600, 0));
    }

    #[test]
    fn debit_missing_wallet_is_integrity_error() {
        let store = MarketStore::new();
        let err = store
            .transaction(|inner| debit(inner, UserId::new(), Decimal::ONE, Utc::now()))
            .unwrap_err();
        assert!(err.is_integrity());
    }
}
