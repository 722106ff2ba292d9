//! Configuration types for the payment-gateway boundary.

use serde::{Deserialize, Serialize};

/// Policy for a gateway-reported amount that differs from the cart total.
///
/// The observed upstream behavior was to log the anomaly and settle anyway
/// (trust the capture, reconcile offline). That stays the default, but the
/// choice is explicit configuration, not an accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AmountMismatchPolicy {
    /// Log the anomaly at warn level and settle.
    #[default]
    LogOnly,
    /// Reject the callback before any write.
    Reject,
}

/// Credentials and endpoints for the external payment gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Merchant identifier assigned by the gateway.
    pub merchant_id: String,
    /// Secret key prepended to the canonical string (`HashKey=...`).
    pub hash_key: String,
    /// Secret IV appended to the canonical string (`&HashIV=...`).
    pub hash_iv: String,
    /// The gateway endpoint the redirect payload is submitted to.
    pub service_url: String,
    /// Where the gateway sends the buyer's browser after payment.
    pub client_back_url: String,
    /// Where the gateway POSTs the server-to-server notification.
    pub notify_url: String,
    /// What to do when the paid amount disagrees with the cart total.
    pub amount_mismatch: AmountMismatchPolicy,
}

impl GatewayConfig {
    /// The gateway vendor's public sandbox credentials, for tests and demos.
    #[must_use]
    pub fn sandbox() -> Self {
        Self {
            merchant_id: "2000132".to_string(),
            hash_key: "5294y06JbISpM5x9".to_string(),
            hash_iv: "v77hoKGq4kWxNNIS".to_string(),
            service_url: "https://payment-stage.ecpay.com.tw/Cashier/AioCheckOut/V5".to_string(),
            client_back_url: "https://shop.example/return".to_string(),
            notify_url: "https://shop.example/notify".to_string(),
            amount_mismatch: AmountMismatchPolicy::LogOnly,
        }
    }
}
