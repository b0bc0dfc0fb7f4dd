//! Receipt types for the CreditMarket audit trail.
//!
//! Every successful mutation produces a [`Receipt`] carrying the
//! [`LedgerEvent`] it applied and a SHA-256 hash over that event's canonical
//! JSON, so the trail can be independently re-verified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{Credits, ListingId, ParticipantId, ReceiptId, Result, constants};

/// A state change applied by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Credits were minted into a participant's balance.
    Deposited {
        participant: ParticipantId,
        amount: Credits,
    },
    /// Credits moved from the seller's balance into escrow.
    ListingCreated {
        listing_id: ListingId,
        seller: ParticipantId,
        amount: Credits,
        price: Credits,
    },
    /// A listing was bought and removed from the registry.
    ListingSettled {
        listing_id: ListingId,
        buyer: ParticipantId,
        seller: ParticipantId,
        amount: Credits,
        price: Credits,
    },
}

impl LedgerEvent {
    /// Short label used in logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Deposited { .. } => "DEPOSITED",
            Self::ListingCreated { .. } => "LISTING_CREATED",
            Self::ListingSettled { .. } => "LISTING_SETTLED",
        }
    }

    /// SHA-256 over the domain tag followed by the event's JSON encoding.
    pub fn hash(&self) -> Result<[u8; 32]> {
        let mut hasher = Sha256::new();
        hasher.update(constants::RECEIPT_HASH_DOMAIN);
        hasher.update(serde_json::to_vec(self)?);
        Ok(hasher.finalize().into())
    }
}

impl std::fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An entry in the append-only audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub id: ReceiptId,
    /// Position in the journal. Strictly increasing, survives eviction.
    pub sequence: u64,
    pub event: LedgerEvent,
    /// SHA-256 of `event`, see [`LedgerEvent::hash`].
    pub event_hash: [u8; 32],
    pub issued_at: DateTime<Utc>,
}

impl Receipt {
    /// Build a receipt for `event`, hashing it.
    pub fn new(sequence: u64, event: LedgerEvent) -> Result<Self> {
        let event_hash = event.hash()?;
        Ok(Self {
            id: ReceiptId::new(),
            sequence,
            event,
            event_hash,
            issued_at: Utc::now(),
        })
    }

    /// Recompute the event hash and compare it to the stored one.
    #[must_use]
    pub fn verify_hash(&self) -> bool {
        self.event.hash().is_ok_and(|h| h == self.event_hash)
    }

    /// Hex rendering of the event hash.
    #[must_use]
    pub fn event_hash_hex(&self) -> String {
        hex::encode(self.event_hash)
    }
}
