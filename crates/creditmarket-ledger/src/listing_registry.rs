//! Listing registry — escrows credits into listings and settles purchases.
//!
//! Creating a listing atomically debits the seller and stores the escrow
//! record. Buying one atomically pays the seller, delivers the escrowed
//! credits to the buyer, and deletes the record.

use std::collections::BTreeMap;

use creditmarket_types::{
    Credits, Listing, ListingId, MarketError, ParticipantId, Result, constants,
};

use crate::balance_ledger::{BalanceLedger, Posting};

/// Owns every active listing and the identifier sequence.
pub struct ListingRegistry {
    /// Active listings keyed by id. Ordered so queries and digests are stable.
    listings: BTreeMap<ListingId, Listing>,
    /// Identifier the next successful creation receives.
    next_id: ListingId,
}

impl ListingRegistry {
    /// Create an empty registry whose first listing gets
    /// [`constants::FIRST_LISTING_ID`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            listings: BTreeMap::new(),
            next_id: constants::FIRST_LISTING_ID,
        }
    }

    /// Atomically escrow `amount` of the seller's credits into a new listing.
    ///
    /// 1. Reserve the next identifier
    /// 2. Debit `amount` from the seller
    /// 3. Store the listing and advance the counter
    ///
    /// If the debit fails, no listing is stored and the counter is unchanged.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount` is zero
    /// - `InsufficientBalance` if the seller's balance is below `amount`
    /// - `BalanceOverflow` if the identifier sequence is exhausted
    pub fn create(
        &mut self,
        ledger: &mut BalanceLedger,
        seller: &ParticipantId,
        amount: Credits,
        price: Credits,
    ) -> Result<ListingId> {
        if amount == 0 {
            return Err(MarketError::InvalidAmount {
                reason: "listing amount must be > 0".to_string(),
            });
        }

        // Step 1: Reserve the id (fails before any balance moves)
        let id = self.next_id;
        let following = id.next().ok_or(MarketError::BalanceOverflow)?;

        // Step 2: Escrow the seller's credits
        ledger.debit(seller, amount)?;

        // Step 3: Store and advance
        self.listings.insert(
            id,
            Listing {
                id,
                seller: seller.clone(),
                amount,
                price,
            },
        );
        self.next_id = following;
        Ok(id)
    }

    /// Settle a purchase of `listing_id` by `buyer`.
    ///
    /// Checked in order: the listing must exist, then the buyer must afford
    /// its price. On success the buyer pays `price` and receives `amount`,
    /// the seller receives `price`, and the listing is removed. Returns the
    /// removed listing.
    ///
    /// # Errors
    /// - `ListingNotFound` if no active listing has this id
    /// - `InsufficientBuyerBalance` if the buyer's balance is below the price
    /// - `BalanceOverflow` if a credit would overflow
    pub fn settle(
        &mut self,
        ledger: &mut BalanceLedger,
        buyer: &ParticipantId,
        listing_id: ListingId,
    ) -> Result<Listing> {
        let listing = self
            .listings
            .get(&listing_id)
            .ok_or(MarketError::ListingNotFound(listing_id))?;

        let (debit, credit) = listing.buyer_legs();
        let available = ledger.balance_of(buyer);
        if available < debit {
            return Err(MarketError::InsufficientBuyerBalance {
                listing: listing_id,
                needed: debit,
                available,
            });
        }

        ledger.post(&[
            Posting::Debit(buyer, debit),
            Posting::Credit(buyer, credit),
            Posting::Credit(&listing.seller, listing.price),
        ])?;

        self.listings
            .remove(&listing_id)
            .ok_or_else(|| MarketError::Internal(format!("{listing_id} vanished during settlement")))
    }

    /// Look up an active listing.
    #[must_use]
    pub fn get(&self, listing_id: ListingId) -> Option<&Listing> {
        self.listings.get(&listing_id)
    }

    /// Active listings in identifier order.
    pub fn active(&self) -> impl Iterator<Item = &Listing> {
        self.listings.values()
    }

    /// Active listings escrowed by `seller`, in identifier order.
    pub fn by_seller<'a>(&'a self, seller: &'a ParticipantId) -> impl Iterator<Item = &'a Listing> {
        self.listings.values().filter(move |l| &l.seller == seller)
    }

    /// Number of active listings.
    #[must_use]
    pub fn count(&self) -> usize {
        self.listings.len()
    }

    /// Credits currently held in escrow across all active listings.
    #[must_use]
    pub fn total_escrowed(&self) -> u128 {
        self.listings.values().map(|l| u128::from(l.amount)).sum()
    }

    /// Identifier the next successful creation will receive.
    #[must_use]
    pub fn next_id(&self) -> ListingId {
        self.next_id
    }
}

impl Default for ListingRegistry {
    fn default() -> Self {
        Self::new()
    }
}
