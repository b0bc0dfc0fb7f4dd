//! System-wide constants for the CreditMarket ledger.

use crate::ListingId;

/// First identifier issued by a freshly constructed engine.
pub const FIRST_LISTING_ID: ListingId = ListingId(1);

/// Default number of receipts retained in the journal before the oldest
/// are evicted.
pub const DEFAULT_JOURNAL_CAPACITY: usize = 10_000;

/// Domain separator for receipt event hashes.
pub const RECEIPT_HASH_DOMAIN: &[u8] = b"creditmarket:receipt:v1:";

/// Domain separator for ledger state digests.
pub const STATE_DIGEST_DOMAIN: &[u8] = b"creditmarket:state:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "CreditMarket";
