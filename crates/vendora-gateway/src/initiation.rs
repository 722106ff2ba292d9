//! Outbound checkout initiation.
//!
//! Builds the signed redirect payload the buyer's client auto-submits to
//! the gateway's service URL. This runs outside any settlement unit: it
//! only reads the cart. The buyer's id travels in the correlation field so
//! the asynchronous notification can be mapped back to the originating
//! cart, and the generated trade number becomes the idempotency key.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::info;

use vendora_settlement::{CartSnapshot, MarketStore};
use vendora_types::{authorize, constants, GatewayConfig, Principal, Result, Role, TradeRef};

use crate::signature::compute_checksum;

/// The redirect payload: ordered fields the client posts to `action_url`.
#[derive(Debug, Clone)]
pub struct PaymentRedirect {
    pub action_url: String,
    /// Key/value pairs in submission order, checksum last.
    pub fields: Vec<(String, String)>,
}

impl PaymentRedirect {
    /// Look up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Join the cart lines into the gateway's item description format:
/// `name x qty` pairs separated by `#`, falling back to a generic label
/// when the result exceeds the gateway's length limit.
fn item_description(snapshot: &CartSnapshot) -> String {
    let joined = snapshot
        .lines
        .iter()
        .map(|line| format!("{} x {}", line.product_name, line.quantity))
        .collect::<Vec<_>>()
        .join("#");
    if joined.len() > constants::MAX_ITEM_DESC_LEN {
        constants::FALLBACK_ITEM_DESC.to_string()
    } else {
        joined
    }
}

/// Build the signed redirect payload for the buyer's current cart.
///
/// # Errors
/// - [`VendoraError::WrongRole`](vendora_types::VendoraError::WrongRole) for a non-buyer principal
/// - [`VendoraError::CartNotFound`](vendora_types::VendoraError::CartNotFound) /
///   [`VendoraError::EmptyCart`](vendora_types::VendoraError::EmptyCart) when there is nothing to pay for
pub fn create_payment_redirect(
    store: &MarketStore,
    config: &GatewayConfig,
    principal: &Principal,
    now: DateTime<Utc>,
) -> Result<PaymentRedirect> {
    let buyer = authorize(principal, Role::Buyer)?;

    let snapshot = store.cart_snapshot(buyer.user_id)?;
    let total = snapshot.total();

    let trade_ref = TradeRef::generate(now.timestamp_millis());
    let trade_date = now.format(constants::TRADE_DATE_FORMAT).to_string();

    let fields: Vec<(String, String)> = vec![
        ("MerchantID".to_string(), config.merchant_id.clone()),
        ("MerchantTradeNo".to_string(), trade_ref.to_string()),
        ("MerchantTradeDate".to_string(), trade_date),
        (
            "PaymentType".to_string(),
            constants::PAYMENT_TYPE_AIO.to_string(),
        ),
        // The gateway takes whole currency units.
        ("TotalAmount".to_string(), total.trunc().to_string()),
        ("TradeDesc".to_string(), constants::TRADE_DESC.to_string()),
        (
            "ChoosePayment".to_string(),
            constants::CHOOSE_PAYMENT_ALL.to_string(),
        ),
        ("ItemName".to_string(), item_description(&snapshot)),
        // Correlation: lets the notification map back to this buyer.
        (
            constants::CORRELATION_FIELD.to_string(),
            buyer.user_id.to_string(),
        ),
        (
            "ClientBackURL".to_string(),
            config.client_back_url.clone(),
        ),
        ("ReturnURL".to_string(), config.notify_url.clone()),
    ];

    let param_map: BTreeMap<String, String> = fields.iter().cloned().collect();
    let checksum = compute_checksum(&param_map, &config.hash_key, &config.hash_iv);

    let mut fields = fields;
    fields.push((constants::CHECKSUM_FIELD.to_string(), checksum));

    info!(
        buyer = %buyer.user_id,
        trade_ref = %trade_ref,
        %total,
        "payment redirect created"
    );

    Ok(PaymentRedirect {
        action_url: config.service_url.clone(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::verify_checksum;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use vendora_types::{Product, User, VendoraError};

    fn seeded() -> (Arc<MarketStore>, User) {
        let store = Arc::new(MarketStore::new());
        let buyer = User::new("buyer@example.com", Role::Buyer);
        let seller = User::new("seller@example.com", Role::Seller);
        let a = Product::new(seller.id, "Widget", Decimal::new(300, 0), 5);
        let b = Product::new(seller.id, "Gadget", Decimal::new(250, 0), 2);
        store.add_user(buyer.clone());
        store.add_user(seller);
        store.add_product(a.clone());
        store.add_product(b.clone());
        store.add_to_cart(buyer.id, a.id, 2).unwrap();
        store.add_to_cart(buyer.id, b.id, 1).unwrap();
        (store, buyer)
    }

    #[test]
    fn redirect_carries_total_correlation_and_valid_checksum() {
        let (store, buyer) = seeded();
        let config = GatewayConfig::sandbox();
        let redirect =
            create_payment_redirect(&store, &config, &Principal::of(&buyer), Utc::now()).unwrap();

        assert_eq!(redirect.action_url, config.service_url);
        assert_eq!(redirect.field("TotalAmount"), Some("850"));
        assert_eq!(
            redirect.field("CustomField1"),
            Some(buyer.id.to_string().as_str())
        );
        assert_eq!(redirect.field("ItemName"), Some("Widget x 2#Gadget x 1"));
        assert!(redirect
            .field("MerchantTradeNo")
            .unwrap()
            .starts_with("TOSN"));

        // Checksum is last and verifies over the full field set.
        let (last_key, _) = redirect.fields.last().unwrap();
        assert_eq!(last_key, "CheckMacValue");
        let params: BTreeMap<String, String> = redirect.fields.iter().cloned().collect();
        assert!(verify_checksum(&params, &config.hash_key, &config.hash_iv));
    }

    #[test]
    fn field_order_is_stable() {
        let (store, buyer) = seeded();
        let config = GatewayConfig::sandbox();
        let redirect =
            create_payment_redirect(&store, &config, &Principal::of(&buyer), Utc::now()).unwrap();

        let keys: Vec<&str> = redirect.fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys[0], "MerchantID");
        assert_eq!(keys[1], "MerchantTradeNo");
        assert_eq!(*keys.last().unwrap(), "CheckMacValue");
    }

    #[test]
    fn empty_cart_has_nothing_to_pay_for() {
        let store = MarketStore::new();
        let buyer = User::new("buyer@example.com", Role::Buyer);
        store.add_user(buyer.clone());
        let err = create_payment_redirect(
            &store,
            &GatewayConfig::sandbox(),
            &Principal::of(&buyer),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, VendoraError::EmptyCart));
    }

    #[test]
    fn non_buyer_is_denied() {
        let (store, _) = seeded();
        let seller = User::new("other-seller@example.com", Role::Seller);
        store.add_user(seller.clone());
        let err = create_payment_redirect(
            &store,
            &GatewayConfig::sandbox(),
            &Principal::of(&seller),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, VendoraError::WrongRole { .. }));
    }

    #[test]
    fn oversized_item_description_falls_back() {
        let store = Arc::new(MarketStore::new());
        let buyer = User::new("buyer@example.com", Role::Buyer);
        let seller = User::new("seller@example.com", Role::Seller);
        let long_name = "X".repeat(300);
        let p = Product::new(seller.id, long_name, Decimal::new(10, 0), 5);
        store.add_user(buyer.clone());
        store.add_user(seller);
        store.add_product(p.clone());
        store.add_to_cart(buyer.id, p.id, 1).unwrap();

        let redirect = create_payment_redirect(
            &store,
            &GatewayConfig::sandbox(),
            &Principal::of(&buyer),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(
            redirect.field("ItemName"),
            Some(constants::FALLBACK_ITEM_DESC)
        );
    }
}
