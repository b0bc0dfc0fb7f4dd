//! Supply conservation invariant checker.
//!
//! ```text
//! Σ(balances) + Σ(escrowed listing amounts) == Σ(deposits)
//! ```
//!
//! Listing creation and settlement only move credits between balances and
//! escrow; deposits are the sole source of new credits. If the equation ever
//! breaks, the ledger is corrupt.

use creditmarket_types::{Credits, MarketError, Result};

/// Tracks cumulative deposits and validates conservation against the
/// ledger's actual holdings.
pub struct SupplyConservation {
    /// Total credits deposited since construction.
    deposited: u128,
}

impl SupplyConservation {
    /// Create a tracker with nothing deposited.
    #[must_use]
    pub fn new() -> Self {
        Self { deposited: 0 }
    }

    /// Record a deposit.
    pub fn record_deposit(&mut self, amount: Credits) {
        self.deposited += u128::from(amount);
    }

    /// Expected total holdings: everything ever deposited.
    #[must_use]
    pub fn expected_supply(&self) -> u128 {
        self.deposited
    }

    /// Verify that balances plus escrow equal total deposits.
    ///
    /// # Errors
    /// Returns [`MarketError::SupplyInvariantViolation`] if they differ.
    pub fn verify(&self, balances: u128, escrowed: u128) -> Result<()> {
        let actual = balances + escrowed;
        if actual != self.deposited {
            return Err(MarketError::SupplyInvariantViolation {
                reason: format!(
                    "actual supply {actual} (balances={balances}, escrowed={escrowed}) \
                     != deposited {}",
                    self.deposited
                ),
            });
        }
        Ok(())
    }
}

impl Default for SupplyConservation {
    fn default() -> Self {
        Self::new()
    }
}
