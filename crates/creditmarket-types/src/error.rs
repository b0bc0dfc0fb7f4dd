//! Error types for the CreditMarket ledger.
//!
//! All errors use the `CM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Ledger and listing errors (100-102 mirror the contract's constants)
//! - 8xx: Safety invariant errors
//! - 9xx: General / internal errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Credits, ListingId};

/// Symbolic error kind callers branch on, independent of the numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InsufficientBalance,
    ListingNotFound,
    InvalidAmount,
    BalanceOverflow,
    SupplyInvariantViolation,
    Internal,
}

/// Central error enum for all CreditMarket operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarketError {
    // =================================================================
    // Ledger / Listing Errors (1xx)
    // =================================================================
    /// The seller cannot cover the amount they tried to escrow.
    #[error("CM_ERR_100: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Credits, available: Credits },

    /// No active listing has this identifier.
    #[error("CM_ERR_101: Listing not found: {0}")]
    ListingNotFound(ListingId),

    /// The buyer cannot cover the listing's price.
    #[error("CM_ERR_102: Insufficient balance to buy {listing}: need {needed}, have {available}")]
    InsufficientBuyerBalance {
        listing: ListingId,
        needed: Credits,
        available: Credits,
    },

    /// An amount violated an operation's precondition (e.g. a zero-sized listing).
    #[error("CM_ERR_103: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// Applying the operation would overflow a balance or the id sequence.
    #[error("CM_ERR_104: Balance or identifier overflow")]
    BalanceOverflow,

    // =================================================================
    // Safety Errors (8xx)
    // =================================================================
    /// Supply conservation invariant violated — critical safety alert.
    #[error("CM_ERR_801: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("CM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("CM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, bad values, etc.).
    #[error("CM_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("CM_ERR_903: I/O error: {0}")]
    Io(String),
}

impl MarketError {
    /// Stable numeric code. 100-102 match the on-chain contract's error
    /// constants (`u100`, `u101`, `u102`).
    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            Self::InsufficientBalance { .. } => 100,
            Self::ListingNotFound(_) => 101,
            Self::InsufficientBuyerBalance { .. } => 102,
            Self::InvalidAmount { .. } => 103,
            Self::BalanceOverflow => 104,
            Self::SupplyInvariantViolation { .. } => 801,
            Self::Internal(_) => 900,
            Self::Serialization(_) => 901,
            Self::Configuration(_) => 902,
            Self::Io(_) => 903,
        }
    }

    /// Symbolic kind. Both seller- and buyer-side shortfalls report
    /// [`ErrorKind::InsufficientBalance`].
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InsufficientBalance { .. } | Self::InsufficientBuyerBalance { .. } => {
                ErrorKind::InsufficientBalance
            }
            Self::ListingNotFound(_) => ErrorKind::ListingNotFound,
            Self::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            Self::BalanceOverflow => ErrorKind::BalanceOverflow,
            Self::SupplyInvariantViolation { .. } => ErrorKind::SupplyInvariantViolation,
            Self::Internal(_) | Self::Serialization(_) | Self::Configuration(_) | Self::Io(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<std::io::Error> for MarketError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
