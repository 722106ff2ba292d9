//! System-wide constants for the Vendora settlement engine.

/// Gateway parameter carrying the tamper-evidence checksum.
pub const CHECKSUM_FIELD: &str = "CheckMacValue";

/// Gateway parameter carrying the payment result code.
pub const RTN_CODE_FIELD: &str = "RtnCode";

/// Result code value the gateway sends on successful payment.
pub const RTN_CODE_SUCCESS: &str = "1";

/// Gateway parameter carrying the amount actually paid.
pub const TRADE_AMT_FIELD: &str = "TradeAmt";

/// Gateway parameter carrying the merchant trade number.
pub const TRADE_NO_FIELD: &str = "MerchantTradeNo";

/// Merchant-defined parameter carrying the buyer correlation value.
pub const CORRELATION_FIELD: &str = "CustomField1";

/// Positive acknowledgement body: payment accepted, settlement completed.
pub const ACK_OK: &str = "1|OK";

/// Prefix for generated merchant trade numbers.
pub const TRADE_REF_PREFIX: &str = "TOSN";

/// Format for the trade date parameter sent at initiation.
pub const TRADE_DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Payment type parameter value required by the gateway.
pub const PAYMENT_TYPE_AIO: &str = "aio";

/// Payment method selector: let the buyer choose on the gateway page.
pub const CHOOSE_PAYMENT_ALL: &str = "ALL";

/// Trade description sent at initiation.
pub const TRADE_DESC: &str = "Vendora Shopping Cart";

/// Maximum length the gateway accepts for the item description.
pub const MAX_ITEM_DESC_LEN: usize = 200;

/// Fallback item description when the joined product names exceed the limit.
pub const FALLBACK_ITEM_DESC: &str = "Vendora combined checkout";

/// Processed trade-reference cache size (idempotency ledger).
pub const PROCESSED_REF_CAPACITY: usize = 100_000;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "Vendora";
