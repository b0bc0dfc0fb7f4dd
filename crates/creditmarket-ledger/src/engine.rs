//! Market engine — the public operation surface.
//!
//! Owns the balance ledger, the listing registry, the supply tracker and the
//! receipt journal. Every mutating operation validates first, then applies
//! all of its state changes in one step; a rejected call leaves the engine
//! exactly as it was.

use creditmarket_types::{
    Credits, LedgerEvent, Listing, ListingId, MarketConfig, MarketError, ParticipantId, Result,
    constants,
};
use sha2::{Digest, Sha256};

use crate::balance_ledger::BalanceLedger;
use crate::journal::Journal;
use crate::listing_registry::ListingRegistry;
use crate::supply_conservation::SupplyConservation;

/// Single-threaded accounting engine for the credit marketplace.
///
/// Mutations take `&mut self`; wrap the engine in a
/// [`SharedMarket`](crate::SharedMarket) to share it across threads.
pub struct MarketEngine {
    ledger: BalanceLedger,
    registry: ListingRegistry,
    supply: SupplyConservation,
    journal: Journal,
    config: MarketConfig,
}

impl MarketEngine {
    /// Create an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        let config = MarketConfig::default();
        Self {
            ledger: BalanceLedger::new(),
            registry: ListingRegistry::new(),
            supply: SupplyConservation::new(),
            journal: Journal::new(config.journal_capacity),
            config,
        }
    }

    /// Create an engine with a validated configuration.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` fails validation.
    pub fn with_config(config: MarketConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ledger: BalanceLedger::new(),
            registry: ListingRegistry::new(),
            supply: SupplyConservation::new(),
            journal: Journal::new(config.journal_capacity),
            config,
        })
    }

    // =================================================================
    // Mutating operations
    // =================================================================

    /// Add `amount` credits to `participant`'s balance. Returns `Ok(true)`.
    ///
    /// A zero deposit is a successful no-op unless
    /// [`MarketConfig::reject_zero_deposits`] is set.
    ///
    /// # Errors
    /// - `InvalidAmount` for a zero deposit when rejection is configured
    /// - `BalanceOverflow` if the balance would exceed `u64::MAX`
    /// - `SupplyInvariantViolation` if per-operation supply checking is
    ///   enabled and fails; the operation and its receipt stay committed
    pub fn deposit(&mut self, participant: &ParticipantId, amount: Credits) -> Result<bool> {
        if amount == 0 && self.config.reject_zero_deposits {
            return reject(
                "deposit",
                MarketError::InvalidAmount {
                    reason: "deposit amount must be > 0".to_string(),
                },
            );
        }

        let receipt = self.journal.prepare(LedgerEvent::Deposited {
            participant: participant.clone(),
            amount,
        })?;

        let balance = match self.ledger.deposit(participant, amount) {
            Ok(balance) => balance,
            Err(err) => return reject("deposit", err),
        };
        self.supply.record_deposit(amount);
        self.journal.commit(receipt);

        tracing::debug!(%participant, amount, balance, "Deposit applied");
        self.after_mutation()?;
        Ok(true)
    }

    /// Escrow `amount` of `seller`'s credits into a new listing priced at
    /// `price`. Returns the new listing's identifier.
    ///
    /// # Errors
    /// - `InvalidAmount` if `amount` is zero
    /// - `InsufficientBalance` if the seller cannot cover `amount`
    /// - `BalanceOverflow` if the identifier sequence is exhausted
    /// - `SupplyInvariantViolation` if per-operation supply checking is
    ///   enabled and fails; the operation and its receipt stay committed
    pub fn create_listing(
        &mut self,
        seller: &ParticipantId,
        amount: Credits,
        price: Credits,
    ) -> Result<ListingId> {
        let receipt = self.journal.prepare(LedgerEvent::ListingCreated {
            listing_id: self.registry.next_id(),
            seller: seller.clone(),
            amount,
            price,
        })?;

        let listing_id = match self.registry.create(&mut self.ledger, seller, amount, price) {
            Ok(id) => id,
            Err(err) => return reject("create_listing", err),
        };
        self.journal.commit(receipt);

        tracing::info!(
            listing = %listing_id,
            %seller,
            amount,
            price,
            "Listing created"
        );
        self.after_mutation()?;
        Ok(listing_id)
    }

    /// Buy `listing_id` on behalf of `buyer`. Returns `Ok(true)`.
    ///
    /// The listing's existence is checked before the buyer's balance, so a
    /// missing listing always reports `ListingNotFound`.
    ///
    /// # Errors
    /// - `ListingNotFound` if no active listing has this id
    /// - `InsufficientBuyerBalance` if the buyer cannot cover the price
    /// - `BalanceOverflow` if a credit would overflow
    /// - `SupplyInvariantViolation` if per-operation supply checking is
    ///   enabled and fails; the operation and its receipt stay committed
    pub fn buy_listing(&mut self, buyer: &ParticipantId, listing_id: ListingId) -> Result<bool> {
        let Some(listing) = self.registry.get(listing_id) else {
            return reject("buy_listing", MarketError::ListingNotFound(listing_id));
        };
        let receipt = self.journal.prepare(LedgerEvent::ListingSettled {
            listing_id,
            buyer: buyer.clone(),
            seller: listing.seller.clone(),
            amount: listing.amount,
            price: listing.price,
        })?;

        let settled = match self.registry.settle(&mut self.ledger, buyer, listing_id) {
            Ok(listing) => listing,
            Err(err) => return reject("buy_listing", err),
        };
        self.journal.commit(receipt);

        tracing::info!(
            listing = %listing_id,
            %buyer,
            seller = %settled.seller,
            amount = settled.amount,
            price = settled.price,
            "Listing settled"
        );
        self.after_mutation()?;
        Ok(true)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Current spendable balance, zero for an unknown participant.
    #[must_use]
    pub fn balance_of(&self, participant: &ParticipantId) -> Credits {
        self.ledger.balance_of(participant)
    }

    /// The active listing with this id, if any.
    #[must_use]
    pub fn get_listing(&self, listing_id: ListingId) -> Option<&Listing> {
        self.registry.get(listing_id)
    }

    /// Active listings in identifier order.
    pub fn active_listings(&self) -> impl Iterator<Item = &Listing> {
        self.registry.active()
    }

    /// Active listings escrowed by `seller`.
    pub fn listings_by_seller<'a>(
        &'a self,
        seller: &'a ParticipantId,
    ) -> impl Iterator<Item = &'a Listing> {
        self.registry.by_seller(seller)
    }

    #[must_use]
    pub fn listing_count(&self) -> usize {
        self.registry.count()
    }

    /// Identifier the next successful `create_listing` will return.
    #[must_use]
    pub fn next_listing_id(&self) -> ListingId {
        self.registry.next_id()
    }

    /// Sum of all spendable balances.
    #[must_use]
    pub fn total_supply(&self) -> u128 {
        self.ledger.total_supply()
    }

    /// Credits held in escrow by active listings.
    #[must_use]
    pub fn total_escrowed(&self) -> u128 {
        self.registry.total_escrowed()
    }

    /// Total credits ever deposited.
    #[must_use]
    pub fn total_deposited(&self) -> u128 {
        self.supply.expected_supply()
    }

    /// Check `balances + escrow == deposits`.
    ///
    /// # Errors
    /// Returns `SupplyInvariantViolation` if the ledger does not balance.
    pub fn verify_supply(&self) -> Result<()> {
        self.supply
            .verify(self.ledger.total_supply(), self.registry.total_escrowed())
    }

    /// Receipt journal for successful mutations.
    #[must_use]
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    #[must_use]
    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// SHA-256 over the canonical encoding of every non-zero balance, every
    /// active listing, and the next listing id.
    ///
    /// Two engines with the same observable state produce the same digest.
    #[must_use]
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(constants::STATE_DIGEST_DOMAIN);

        let balances = self.ledger.sorted_balances();
        hasher.update((balances.len() as u64).to_le_bytes());
        for (participant, balance) in balances {
            hash_token(&mut hasher, participant.as_str());
            hasher.update(balance.to_le_bytes());
        }

        hasher.update((self.registry.count() as u64).to_le_bytes());
        for listing in self.registry.active() {
            hasher.update(listing.id.0.to_le_bytes());
            hash_token(&mut hasher, listing.seller.as_str());
            hasher.update(listing.amount.to_le_bytes());
            hasher.update(listing.price.to_le_bytes());
        }

        hasher.update(self.registry.next_id().0.to_le_bytes());
        hasher.finalize().into()
    }

    /// Hex rendering of [`Self::state_digest`].
    #[must_use]
    pub fn state_digest_hex(&self) -> String {
        hex::encode(self.state_digest())
    }

    fn after_mutation(&self) -> Result<()> {
        if self.config.verify_supply_after_each_op {
            if let Err(err) = self.verify_supply() {
                tracing::error!(error = %err, "Supply conservation violated");
                return Err(err);
            }
        }
        Ok(())
    }
}

impl Default for MarketEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Length-prefixed so adjacent tokens cannot collide.
fn hash_token(hasher: &mut Sha256, token: &str) {
    hasher.update((token.len() as u64).to_le_bytes());
    hasher.update(token.as_bytes());
}

fn reject<T>(operation: &'static str, err: MarketError) -> Result<T> {
    tracing::warn!(operation, code = err.code(), error = %err, "Operation rejected");
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use creditmarket_types::ErrorKind;

    fn user(token: &str) -> ParticipantId {
        ParticipantId::from(token)
    }

    #[test]
    fn deposit_returns_true() {
        let mut engine = MarketEngine::new();
        assert_eq!(engine.deposit(&user("user1"), 100), Ok(true));
        assert_eq!(engine.balance_of(&user("user1")), 100);
        assert_eq!(engine.total_deposited(), 100);
    }

    #[test]
    fn zero_deposit_is_noop_by_default() {
        let mut engine = MarketEngine::new();
        let before = engine.state_digest();
        assert_eq!(engine.deposit(&user("user1"), 0), Ok(true));
        assert_eq!(engine.state_digest(), before);
        assert_eq!(engine.journal().len(), 1);
    }

    #[test]
    fn zero_deposit_rejected_when_configured() {
        let config = MarketConfig {
            reject_zero_deposits: true,
            ..MarketConfig::default()
        };
        let mut engine = MarketEngine::with_config(config).unwrap();
        let err = engine.deposit(&user("user1"), 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidAmount);
        assert!(engine.journal().is_empty());
    }

    #[test]
    fn invalid_config_rejected() {
        let config = MarketConfig {
            journal_capacity: 0,
            ..MarketConfig::default()
        };
        assert!(matches!(
            MarketEngine::with_config(config),
            Err(MarketError::Configuration(_))
        ));
    }

    #[test]
    fn overflowing_deposit_is_rejected_without_receipt() {
        let mut engine = MarketEngine::new();
        engine.deposit(&user("whale"), u64::MAX).unwrap();
        let before = engine.state_digest();
        let err = engine.deposit(&user("whale"), 1).unwrap_err();
        assert_eq!(err, MarketError::BalanceOverflow);
        assert_eq!(engine.state_digest(), before);
        assert_eq!(engine.journal().len(), 1);
        assert_eq!(engine.total_deposited(), u128::from(u64::MAX));
    }

    #[test]
    fn receipts_follow_successful_operations() {
        let mut engine = MarketEngine::new();
        engine.deposit(&user("user1"), 100).unwrap();
        engine.deposit(&user("user2"), 20).unwrap();
        let id = engine.create_listing(&user("user1"), 50, 10).unwrap();
        engine.buy_listing(&user("user2"), id).unwrap();
        // Rejected: listing is gone
        engine.buy_listing(&user("user2"), id).unwrap_err();

        let labels: Vec<&str> = engine.journal().iter().map(|r| r.event.label()).collect();
        assert_eq!(
            labels,
            vec!["DEPOSITED", "DEPOSITED", "LISTING_CREATED", "LISTING_SETTLED"]
        );
        assert!(engine.journal().iter().all(|r| r.verify_hash()));
        match &engine.journal().latest().unwrap().event {
            LedgerEvent::ListingSettled {
                listing_id,
                buyer,
                seller,
                ..
            } => {
                assert_eq!(*listing_id, id);
                assert_eq!(buyer, &user("user2"));
                assert_eq!(seller, &user("user1"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn created_receipt_carries_issued_id() {
        let mut engine = MarketEngine::new();
        engine.deposit(&user("user1"), 100).unwrap();
        engine.create_listing(&user("user1"), 500, 1).unwrap_err();
        let id = engine.create_listing(&user("user1"), 50, 1).unwrap();
        match &engine.journal().latest().unwrap().event {
            LedgerEvent::ListingCreated { listing_id, .. } => assert_eq!(*listing_id, id),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn verify_supply_after_each_op_passes_on_healthy_ledger() {
        let config = MarketConfig {
            verify_supply_after_each_op: true,
            ..MarketConfig::default()
        };
        let mut engine = MarketEngine::with_config(config).unwrap();
        engine.deposit(&user("user1"), 100).unwrap();
        engine.deposit(&user("user2"), 20).unwrap();
        let id = engine.create_listing(&user("user1"), 50, 10).unwrap();
        engine.buy_listing(&user("user2"), id).unwrap();
        assert!(engine.verify_supply().is_ok());
    }

    #[test]
    fn supply_violation_reports_but_keeps_mutation() {
        let config = MarketConfig {
            verify_supply_after_each_op: true,
            ..MarketConfig::default()
        };
        let mut engine = MarketEngine::with_config(config).unwrap();
        engine.deposit(&user("user1"), 100).unwrap();
        // Books claim credits that no balance holds.
        engine.supply.record_deposit(7);

        let err = engine.deposit(&user("user1"), 5).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SupplyInvariantViolation);
        assert_eq!(engine.balance_of(&user("user1")), 105);
        assert_eq!(engine.journal().len(), 2);
    }

    #[test]
    fn digest_reflects_state_not_history() {
        let mut a = MarketEngine::new();
        a.deposit(&user("x"), 10).unwrap();
        a.deposit(&user("y"), 5).unwrap();

        let mut b = MarketEngine::new();
        b.deposit(&user("y"), 2).unwrap();
        b.deposit(&user("x"), 10).unwrap();
        b.deposit(&user("y"), 3).unwrap();

        assert_eq!(a.state_digest(), b.state_digest());
        assert_eq!(a.state_digest_hex().len(), 64);

        b.deposit(&user("y"), 1).unwrap();
        assert_ne!(a.state_digest(), b.state_digest());
    }

    #[test]
    fn digest_covers_listing_counter() {
        let mut a = MarketEngine::new();
        let mut b = MarketEngine::new();
        for engine in [&mut a, &mut b] {
            engine.deposit(&user("s"), 10).unwrap();
        }
        let id = b.create_listing(&user("s"), 5, 0).unwrap();
        b.buy_listing(&user("s"), id).unwrap();

        // Same balances, no active listings, but b consumed an id.
        assert_eq!(a.balance_of(&user("s")), b.balance_of(&user("s")));
        assert_ne!(a.state_digest(), b.state_digest());
    }
}
