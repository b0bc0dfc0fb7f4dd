//! Listing and credit types for the escrow model.
//!
//! A listing holds credits removed from its seller's spendable balance until
//! a buyer settles it.
//!
//! ```text
//!   ┌──────────────┐  create_listing  ┌────────┐  buy_listing  ┌─────────┐
//!   │ NON-EXISTENT ├─────────────────▶│ ACTIVE ├──────────────▶│ SETTLED │
//!   └──────────────┘                  └────────┘               └─────────┘
//! ```
//!
//! There is no other transition: an active listing is never edited in place.

use serde::{Deserialize, Serialize};

use crate::{ListingId, ParticipantId};

/// Fungible credit quantity. Unsigned, so a balance can never be negative.
pub type Credits = u64;

/// An active, escrowed listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Listing {
    /// Registry key.
    pub id: ListingId,
    /// Participant whose credits are escrowed and who receives the price.
    pub seller: ParticipantId,
    /// Escrowed credits delivered to the buyer on settlement. Always > 0.
    pub amount: Credits,
    /// Credits the buyer pays the seller.
    pub price: Credits,
}

impl Listing {
    /// Gross settlement legs on the buyer's balance, as `(debit, credit)`:
    /// the buyer pays `price` and receives `amount`.
    #[must_use]
    pub fn buyer_legs(&self) -> (Credits, Credits) {
        (self.price, self.amount)
    }
}
