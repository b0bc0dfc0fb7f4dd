//! Thread-safe handle to a single [`MarketEngine`].
//!
//! One mutex guards the ledger, the registry and the id counter together, so
//! concurrent callers observe the same all-or-nothing behaviour as a
//! single-threaded caller.

use std::sync::{Arc, Mutex, MutexGuard};

use creditmarket_types::{Credits, Listing, ListingId, MarketError, ParticipantId, Result};

use crate::engine::MarketEngine;

/// Cloneable, shareable engine handle.
#[derive(Clone)]
pub struct SharedMarket {
    inner: Arc<Mutex<MarketEngine>>,
}

impl SharedMarket {
    /// Take ownership of `engine` and share it.
    #[must_use]
    pub fn new(engine: MarketEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MarketEngine>> {
        self.inner
            .lock()
            .map_err(|_| MarketError::Internal("market engine mutex poisoned".to_string()))
    }

    pub fn deposit(&self, participant: &ParticipantId, amount: Credits) -> Result<bool> {
        self.lock()?.deposit(participant, amount)
    }

    pub fn create_listing(
        &self,
        seller: &ParticipantId,
        amount: Credits,
        price: Credits,
    ) -> Result<ListingId> {
        self.lock()?.create_listing(seller, amount, price)
    }

    pub fn buy_listing(&self, buyer: &ParticipantId, listing_id: ListingId) -> Result<bool> {
        self.lock()?.buy_listing(buyer, listing_id)
    }

    pub fn balance_of(&self, participant: &ParticipantId) -> Result<Credits> {
        Ok(self.lock()?.balance_of(participant))
    }

    /// Cloned, since the record cannot outlive the lock.
    pub fn get_listing(&self, listing_id: ListingId) -> Result<Option<Listing>> {
        Ok(self.lock()?.get_listing(listing_id).cloned())
    }

    /// Run `f` against the engine under one lock acquisition, for reads that
    /// must see a consistent snapshot.
    pub fn with_engine<R>(&self, f: impl FnOnce(&MarketEngine) -> R) -> Result<R> {
        let engine = self.lock()?;
        Ok(f(&engine))
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn handle_mirrors_engine_operations() {
        let market = SharedMarket::new(MarketEngine::new());
        let seller = ParticipantId::from("user1");
        let buyer = ParticipantId::from("user2");

        market.deposit(&seller, 100).unwrap();
        market.deposit(&buyer, 20).unwrap();
        let id = market.create_listing(&seller, 50, 10).unwrap();
        assert_eq!(market.get_listing(id).unwrap().unwrap().amount, 50);
        assert_eq!(market.buy_listing(&buyer, id), Ok(true));
        assert_eq!(market.balance_of(&buyer).unwrap(), 60);
        assert_eq!(market.get_listing(id).unwrap(), None);
    }

    #[test]
    fn poisoned_lock_surfaces_as_internal() {
        let market = SharedMarket::new(MarketEngine::new());
        let user = ParticipantId::from("user1");
        market.deposit(&user, 10).unwrap();

        let poisoner = market.clone();
        let joined = thread::spawn(move || {
            poisoner
                .with_engine::<()>(|_| panic!("engine closure panicked"))
                .ok();
        })
        .join();
        assert!(joined.is_err());

        assert!(matches!(
            market.deposit(&user, 1),
            Err(MarketError::Internal(_))
        ));
        assert!(matches!(
            market.buy_listing(&user, ListingId(1)),
            Err(MarketError::Internal(_))
        ));
        assert!(matches!(
            market.balance_of(&user),
            Err(MarketError::Internal(_))
        ));
    }

    #[test]
    fn concurrent_buyers_settle_each_listing_once() {
        let market = SharedMarket::new(MarketEngine::new());
        let seller = ParticipantId::from("seller");
        market.deposit(&seller, 1_000).unwrap();
        let ids: Vec<ListingId> = (0..10)
            .map(|_| market.create_listing(&seller, 10, 5).unwrap())
            .collect();

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let market = market.clone();
                let ids = ids.clone();
                thread::spawn(move || {
                    let buyer = ParticipantId::new(format!("buyer-{n}"));
                    market.deposit(&buyer, 100).unwrap();
                    ids.iter()
                        .filter(|id| market.buy_listing(&buyer, **id).is_ok())
                        .count()
                })
            })
            .collect();

        let bought: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(bought, ids.len());

        market
            .with_engine(|engine| {
                assert_eq!(engine.listing_count(), 0);
                assert!(engine.verify_supply().is_ok());
                assert_eq!(engine.balance_of(&seller), 1_000 - 100 + 50);
            })
            .unwrap();
    }
}
