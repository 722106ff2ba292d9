//! # vendora-gateway
//!
//! The external payment-gateway boundary. Two directions:
//!
//! - **Outbound initiation**: build the signed redirect payload the buyer's
//!   browser auto-submits to the gateway (ordered parameters plus a
//!   checksum).
//! - **Inbound notification**: verify the gateway's server-to-server
//!   callback, then drive the settlement kernel **without** a buyer debit —
//!   the funds were captured by the gateway, not from the internal wallet.
//!
//! The checksum ([`signature`]) authenticates both directions. Its
//! canonicalization is bit-exact with the remote counterpart: any deviation
//! breaks interoperability.

pub mod initiation;
pub mod notify;
pub mod signature;

pub use initiation::{create_payment_redirect, PaymentRedirect};
pub use notify::{parse_callback_body, CallbackOutcome, NotificationReconciler, RejectReason};
pub use signature::{compute_checksum, verify_checksum};
