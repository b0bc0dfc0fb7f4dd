//! Balance ledger: participant → spendable credits.
//!
//! All mutations are atomic: either the full operation succeeds or every
//! balance is unchanged. Multi-leg moves go through [`BalanceLedger::post`],
//! which stages every leg before committing any of them.

use std::collections::{BTreeMap, HashMap};

use creditmarket_types::{Credits, MarketError, ParticipantId, Result};

/// One leg of an atomic multi-party balance move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Posting<'a> {
    /// Remove credits. Fails if the staged balance is too small.
    Debit(&'a ParticipantId, Credits),
    /// Add credits. Fails on overflow.
    Credit(&'a ParticipantId, Credits),
}

/// Owns every participant's spendable balance.
///
/// Escrowed credits are not held here: once a listing is created its amount
/// lives in the [`ListingRegistry`](crate::ListingRegistry) until settlement.
pub struct BalanceLedger {
    balances: HashMap<ParticipantId, Credits>,
}

impl BalanceLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Add `amount` to `participant`'s balance. An unknown participant starts
    /// at zero. Returns the new balance.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the balance would exceed `u64::MAX`;
    /// the balance is left unchanged.
    pub fn deposit(&mut self, participant: &ParticipantId, amount: Credits) -> Result<Credits> {
        self.credit(participant, amount)
    }

    /// Current balance, or zero for a participant never seen.
    #[must_use]
    pub fn balance_of(&self, participant: &ParticipantId) -> Credits {
        self.balances.get(participant).copied().unwrap_or(0)
    }

    /// Remove `amount` from `participant`'s balance. Returns the new balance.
    ///
    /// # Errors
    /// Returns `InsufficientBalance` if the balance is below `amount`.
    pub fn debit(&mut self, participant: &ParticipantId, amount: Credits) -> Result<Credits> {
        let available = self.balance_of(participant);
        let updated = available
            .checked_sub(amount)
            .ok_or(MarketError::InsufficientBalance {
                needed: amount,
                available,
            })?;
        self.balances.insert(participant.clone(), updated);
        tracing::debug!(%participant, amount, balance = updated, "Debited");
        Ok(updated)
    }

    /// Add `amount` to `participant`'s balance. Returns the new balance.
    ///
    /// # Errors
    /// Returns `BalanceOverflow` if the balance would exceed `u64::MAX`.
    pub fn credit(&mut self, participant: &ParticipantId, amount: Credits) -> Result<Credits> {
        let updated = self
            .balance_of(participant)
            .checked_add(amount)
            .ok_or(MarketError::BalanceOverflow)?;
        self.balances.insert(participant.clone(), updated);
        tracing::debug!(%participant, amount, balance = updated, "Credited");
        Ok(updated)
    }

    /// Apply every posting in order as one atomic step.
    ///
    /// Legs are evaluated against balances staged by the earlier legs, so the
    /// same participant may appear more than once. Nothing is written unless
    /// all legs succeed.
    ///
    /// # Errors
    /// - `InsufficientBalance` if a debit exceeds the staged balance
    /// - `BalanceOverflow` if a credit overflows the staged balance
    pub fn post(&mut self, postings: &[Posting<'_>]) -> Result<()> {
        let mut staged: BTreeMap<&ParticipantId, Credits> = BTreeMap::new();

        for posting in postings {
            match *posting {
                Posting::Debit(participant, amount) => {
                    let available = *staged
                        .entry(participant)
                        .or_insert_with(|| self.balance_of(participant));
                    let updated =
                        available
                            .checked_sub(amount)
                            .ok_or(MarketError::InsufficientBalance {
                                needed: amount,
                                available,
                            })?;
                    staged.insert(participant, updated);
                }
                Posting::Credit(participant, amount) => {
                    let current = *staged
                        .entry(participant)
                        .or_insert_with(|| self.balance_of(participant));
                    let updated = current
                        .checked_add(amount)
                        .ok_or(MarketError::BalanceOverflow)?;
                    staged.insert(participant, updated);
                }
            }
        }

        for (participant, balance) in staged {
            tracing::debug!(%participant, balance, "Posted");
            self.balances.insert(participant.clone(), balance);
        }
        Ok(())
    }

    /// Sum of all spendable balances. Widened so the total cannot overflow.
    #[must_use]
    pub fn total_supply(&self) -> u128 {
        self.balances.values().map(|b| u128::from(*b)).sum()
    }

    /// Non-zero balances sorted by participant.
    #[must_use]
    pub fn sorted_balances(&self) -> Vec<(&ParticipantId, Credits)> {
        let mut entries: Vec<_> = self
            .balances
            .iter()
            .filter(|(_, balance)| **balance > 0)
            .map(|(participant, balance)| (participant, *balance))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Number of participants the ledger has seen.
    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.balances.len()
    }
}

impl Default for BalanceLedger {
    fn default() -> Self {
        Self::new()
    }
}
