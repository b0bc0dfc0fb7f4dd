//! Identifiers used throughout CreditMarket.
//!
//! Participants are opaque string tokens supplied by the caller. Listings use
//! a dense, monotonically increasing integer sequence. Receipts use UUIDv7 for
//! time-ordered sorting.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ParticipantId
// ---------------------------------------------------------------------------

/// Opaque identity of a ledger participant.
///
/// The ledger never inspects the contents; it only compares and hashes them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Random participant for unit tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl ParticipantId {
    pub fn dummy() -> Self {
        Self(format!("participant-{}", Uuid::now_v7().simple()))
    }
}

// ---------------------------------------------------------------------------
// ListingId
// ---------------------------------------------------------------------------

/// Identifier of an escrowed listing.
///
/// Issued from a per-engine counter that starts at
/// [`constants::FIRST_LISTING_ID`](crate::constants::FIRST_LISTING_ID) and is
/// never rewound, so ids are never reused even after settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub u64);

impl ListingId {
    /// The identifier that follows this one, or `None` once the sequence is
    /// exhausted.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listing:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// ReceiptId
// ---------------------------------------------------------------------------

/// Unique identifier for a journal receipt. Uses UUIDv7 for time-ordered sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ReceiptId(pub Uuid);

impl ReceiptId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ReceiptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReceiptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rcpt:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_id_is_opaque_token() {
        let a = ParticipantId::from("user1");
        let b = ParticipantId::new(String::from("user1"));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "user1");
        assert_eq!(format!("{a}"), "user1");
    }

    #[test]
    fn dummy_participants_differ() {
        assert_ne!(ParticipantId::dummy(), ParticipantId::dummy());
    }

    #[test]
    fn listing_id_next() {
        assert_eq!(ListingId(5).next(), Some(ListingId(6)));
        assert_eq!(ListingId(u64::MAX).next(), None);
    }

    #[test]
    fn listing_id_display() {
        assert_eq!(ListingId(7).to_string(), "listing:7");
    }

    #[test]
    fn receipt_id_ordering() {
        let a = ReceiptId::new();
        let b = ReceiptId::new();
        assert!(a < b);
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&ParticipantId::from("user2")).unwrap();
        assert_eq!(json, "\"user2\"");
        let json = serde_json::to_string(&ListingId(3)).unwrap();
        assert_eq!(json, "3");
        let back: ListingId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ListingId(3));
    }
}
