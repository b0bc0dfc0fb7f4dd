//! Operation scripts: a JSON array of commands replayed against one engine.
//!
//! ```json
//! [
//!   { "op": "deposit", "participant": "user1", "amount": 100 },
//!   { "op": "create_listing", "seller": "user1", "amount": 50, "price": 10 },
//!   { "op": "buy_listing", "buyer": "user2", "listing_id": 1 },
//!   { "op": "balance", "participant": "user1" },
//!   { "op": "listing", "listing_id": 1 }
//! ]
//! ```

use std::path::Path;

use anyhow::Context;
use creditmarket_ledger::MarketEngine;
use creditmarket_types::{Credits, ErrorKind, Listing, ListingId, MarketError, ParticipantId};
use serde::{Deserialize, Serialize};

/// One scripted call against the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Deposit {
        participant: ParticipantId,
        amount: Credits,
    },
    CreateListing {
        seller: ParticipantId,
        amount: Credits,
        price: Credits,
    },
    BuyListing {
        buyer: ParticipantId,
        listing_id: ListingId,
    },
    Balance {
        participant: ParticipantId,
    },
    Listing {
        listing_id: ListingId,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "deposit",
            Self::CreateListing { .. } => "create_listing",
            Self::BuyListing { .. } => "buy_listing",
            Self::Balance { .. } => "balance",
            Self::Listing { .. } => "listing",
        }
    }
}

/// Value returned by a successful command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Flag(bool),
    ListingId(ListingId),
    Credits(Credits),
    Listing(Option<Listing>),
}

/// Result of one command, printed as a JSON line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok {
        step: usize,
        op: &'static str,
        value: Value,
    },
    Err {
        step: usize,
        op: &'static str,
        code: u32,
        kind: ErrorKind,
        message: String,
    },
}

/// End-of-run totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub steps: usize,
    pub failed: usize,
    pub total_supply: u128,
    pub total_escrowed: u128,
    pub total_deposited: u128,
    pub active_listings: usize,
    pub receipts: u64,
    pub state_digest: String,
}

/// Parse a script from JSON text.
pub fn parse(json: &str) -> anyhow::Result<Vec<Command>> {
    serde_json::from_str(json).context("script must be a JSON array of commands")
}

/// Read and parse a script file.
pub fn load(path: &Path) -> anyhow::Result<Vec<Command>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    parse(&raw)
}

/// Execute one command. Engine rejections become `Outcome::Err`.
pub fn execute(engine: &mut MarketEngine, step: usize, command: &Command) -> Outcome {
    let op = command.name();
    let result: Result<Value, MarketError> = match command {
        Command::Deposit {
            participant,
            amount,
        } => engine.deposit(participant, *amount).map(Value::Flag),
        Command::CreateListing {
            seller,
            amount,
            price,
        } => engine
            .create_listing(seller, *amount, *price)
            .map(Value::ListingId),
        Command::BuyListing { buyer, listing_id } => {
            engine.buy_listing(buyer, *listing_id).map(Value::Flag)
        }
        Command::Balance { participant } => Ok(Value::Credits(engine.balance_of(participant))),
        Command::Listing { listing_id } => {
            Ok(Value::Listing(engine.get_listing(*listing_id).cloned()))
        }
    };

    match result {
        Ok(value) => Outcome::Ok { step, op, value },
        Err(err) => Outcome::Err {
            step,
            op,
            code: err.code(),
            kind: err.kind(),
            message: err.to_string(),
        },
    }
}

/// Run every command in order, then summarize the engine.
pub fn run(engine: &mut MarketEngine, commands: &[Command]) -> (Vec<Outcome>, Summary) {
    let outcomes: Vec<Outcome> = commands
        .iter()
        .enumerate()
        .map(|(step, command)| execute(engine, step, command))
        .collect();

    let failed = outcomes
        .iter()
        .filter(|o| matches!(o, Outcome::Err { .. }))
        .count();

    let summary = Summary {
        steps: outcomes.len(),
        failed,
        total_supply: engine.total_supply(),
        total_escrowed: engine.total_escrowed(),
        total_deposited: engine.total_deposited(),
        active_listings: engine.listing_count(),
        receipts: engine.journal().total_committed(),
        state_digest: engine.state_digest_hex(),
    };
    (outcomes, summary)
}
