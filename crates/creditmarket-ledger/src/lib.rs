//! # creditmarket-ledger
//!
//! **Accounting engine** for an escrow-backed credit marketplace.
//!
//! ## Architecture
//!
//! 1. **BalanceLedger**: spendable credits per participant
//! 2. **ListingRegistry**: escrowed listings, creation and settlement
//! 3. **SupplyConservation**: `balances + escrow == deposits`
//! 4. **Journal**: bounded receipt trail of successful mutations
//! 5. **MarketEngine**: the public operation surface tying them together
//! 6. **SharedMarket**: one mutex around one engine, for threaded hosts
//!
//! ## Operation Flow
//!
//! ```text
//! deposit        → BalanceLedger.deposit()                      → Journal
//! create_listing → ListingRegistry.create() → BalanceLedger.debit() → Journal
//! buy_listing    → ListingRegistry.settle() → BalanceLedger.post()  → Journal
//! ```
//!
//! Every operation either applies all of its changes or none of them.

pub mod balance_ledger;
pub mod engine;
pub mod journal;
pub mod listing_registry;
pub mod shared;
pub mod supply_conservation;

pub use balance_ledger::{BalanceLedger, Posting};
pub use engine::MarketEngine;
pub use journal::Journal;
pub use listing_registry::ListingRegistry;
pub use shared::SharedMarket;
pub use supply_conservation::SupplyConservation;
