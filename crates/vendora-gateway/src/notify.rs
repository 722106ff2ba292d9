//! Notification reconciliation — the gateway-initiated settlement path.
//!
//! The gateway POSTs a form-encoded callback after capturing payment. The
//! callback is untrusted: it can be replayed, delayed, or forged. The
//! reconciler is a state machine over one delivery:
//!
//! 1. **Verify** the checksum — reject on mismatch, no further action.
//! 2. **Check the result code** — a failed payment is acknowledged so the
//!    gateway stops retrying; nothing settles.
//! 3. **Extract the correlation** — the buyer id carried since initiation.
//! 4. **Settle** through the shared kernel without a buyer debit; the
//!    processed-reference ledger and the empty-cart signal make repeat
//!    deliveries no-ops.
//!
//! Every outcome maps to the literal acknowledgement body the gateway
//! expects: `1|OK` to stop retries, `0|<reason>` to permit them.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{error, info, warn};

use vendora_settlement::{CheckoutEngine, ExternalSettlement, MarketStore};
use vendora_types::{constants, GatewayConfig, Order, Principal, TradeRef, UserId, VendoraError};

use crate::signature::verify_checksum;

/// Decode a raw form-encoded callback body into the parameter map.
#[must_use]
pub fn parse_callback_body(body: &str) -> BTreeMap<String, String> {
    form_urlencoded::parse(body.as_bytes())
        .into_owned()
        .collect()
}

/// Why a callback was rejected (negative acknowledgement; gateway may retry).
#[derive(Debug)]
pub enum RejectReason {
    /// Checksum mismatch — likely a forged request.
    InvalidSignature,
    /// No buyer correlation field in the callback.
    MissingCorrelation,
    /// The correlation value did not resolve to a buyer account.
    UnknownBuyer,
    /// The reported amount disagreed with the cart total (Reject policy).
    AmountMismatch,
    /// Settlement failed after the money was captured — a reconciliation
    /// gap needing operator attention, surfaced so the gateway retries.
    SettlementFailed(String),
}

impl RejectReason {
    fn label(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "Error",
            Self::MissingCorrelation | Self::UnknownBuyer => "User Not Found",
            Self::AmountMismatch => "Amount Mismatch",
            Self::SettlementFailed(_) => "Exception",
        }
    }
}

/// Terminal state of one callback delivery.
#[derive(Debug)]
pub enum CallbackOutcome {
    /// Payment accepted and the cart settled into these orders.
    Settled { orders: Vec<Order> },
    /// The gateway reported a failed payment; nothing to do internally.
    PaymentFailed { rtn_code: String },
    /// A repeat delivery for an already-settled checkout; no-op.
    Duplicate,
    /// Rejected before or during settlement.
    Rejected(RejectReason),
}

impl CallbackOutcome {
    /// The literal response body for the gateway.
    #[must_use]
    pub fn ack_body(&self) -> String {
        match self {
            Self::Settled { .. } | Self::PaymentFailed { .. } | Self::Duplicate => {
                constants::ACK_OK.to_string()
            }
            Self::Rejected(reason) => format!("0|{}", reason.label()),
        }
    }
}

/// Drives one gateway callback through verification and settlement.
pub struct NotificationReconciler {
    engine: CheckoutEngine,
    store: Arc<MarketStore>,
    config: GatewayConfig,
}

impl NotificationReconciler {
    #[must_use]
    pub fn new(store: Arc<MarketStore>, config: GatewayConfig) -> Self {
        Self {
            engine: CheckoutEngine::new(Arc::clone(&store)),
            store,
            config,
        }
    }

    /// Process one callback delivery to a terminal [`CallbackOutcome`].
    pub fn process(&self, params: &BTreeMap<String, String>) -> CallbackOutcome {
        // 1. Signature gate. A mismatch means the parameters were not
        //    produced by the gateway's keys — take no further action.
        if !verify_checksum(params, &self.config.hash_key, &self.config.hash_iv) {
            error!("callback rejected: checksum invalid");
            return CallbackOutcome::Rejected(RejectReason::InvalidSignature);
        }

        // 2. Result code. A non-success code needs no internal action, but
        //    acknowledging stops the gateway from re-sending it.
        let rtn_code = params
            .get(constants::RTN_CODE_FIELD)
            .cloned()
            .unwrap_or_default();
        if rtn_code != constants::RTN_CODE_SUCCESS {
            warn!(rtn_code = %rtn_code, "gateway reported payment failure");
            return CallbackOutcome::PaymentFailed { rtn_code };
        }

        // 3. Correlation — who was paying?
        let Some(correlation) = params
            .get(constants::CORRELATION_FIELD)
            .filter(|v| !v.is_empty())
        else {
            error!("callback carries no buyer correlation field");
            return CallbackOutcome::Rejected(RejectReason::MissingCorrelation);
        };
        let Some(buyer_id) = UserId::parse(correlation) else {
            error!(correlation = %correlation, "correlation field is not a user id");
            return CallbackOutcome::Rejected(RejectReason::UnknownBuyer);
        };
        let Some(buyer) = self.store.user(buyer_id) else {
            error!(buyer = %buyer_id, "no account for correlated buyer");
            return CallbackOutcome::Rejected(RejectReason::UnknownBuyer);
        };

        // 4. Trade reference and paid amount.
        let Some(trade_no) = params.get(constants::TRADE_NO_FIELD) else {
            return CallbackOutcome::Rejected(RejectReason::SettlementFailed(
                "missing MerchantTradeNo".to_string(),
            ));
        };
        let trade_ref = TradeRef::new(trade_no.clone());
        let Some(paid_amount) = params
            .get(constants::TRADE_AMT_FIELD)
            .and_then(|v| Decimal::from_str(v).ok())
        else {
            return CallbackOutcome::Rejected(RejectReason::SettlementFailed(
                "malformed TradeAmt".to_string(),
            ));
        };

        // 5. Settle without a buyer debit. The kernel holds the amount
        //    policy check, the idempotency ledger, and the duplicate
        //    (empty-cart) signal inside one atomic unit.
        let principal = Principal::of(&buyer);
        match self.engine.settle_external(
            &principal,
            &trade_ref,
            paid_amount,
            self.config.amount_mismatch,
        ) {
            Ok(ExternalSettlement::Settled(orders)) => {
                info!(
                    buyer = %buyer_id,
                    trade_ref = %trade_ref,
                    orders = orders.len(),
                    "gateway settlement completed"
                );
                CallbackOutcome::Settled { orders }
            }
            Ok(ExternalSettlement::AlreadyProcessed) => {
                info!(trade_ref = %trade_ref, "duplicate callback; acknowledged as no-op");
                CallbackOutcome::Duplicate
            }
            Err(VendoraError::AmountMismatch { expected, reported }) => {
                error!(
                    %expected,
                    %reported,
                    trade_ref = %trade_ref,
                    "callback rejected: amount mismatch"
                );
                CallbackOutcome::Rejected(RejectReason::AmountMismatch)
            }
            Err(err) => {
                // Money was captured but goods are not fulfilled — answer
                // with a retryable code and leave a loud trail.
                error!(
                    trade_ref = %trade_ref,
                    error = %err,
                    "settlement failed after capture; reconciliation gap"
                );
                CallbackOutcome::Rejected(RejectReason::SettlementFailed(err.to_string()))
            }
        }
    }
}
