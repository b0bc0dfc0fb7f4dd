//! # creditmarket-types
//!
//! Shared types, errors, and configuration for the **CreditMarket** ledger.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`ParticipantId`], [`ListingId`], [`ReceiptId`]
//! - **Listing model**: [`Listing`], [`Credits`]
//! - **Receipt model**: [`Receipt`], [`LedgerEvent`]
//! - **Configuration**: [`MarketConfig`]
//! - **Errors**: [`MarketError`] with `CM_ERR_` prefix codes, [`ErrorKind`]
//! - **Constants**: system-wide defaults

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod listing;
pub mod receipt;

pub use config::*;
pub use error::*;
pub use ids::*;
pub use listing::*;
pub use receipt::*;

// Constants are accessed via `creditmarket_types::constants::FOO`.
