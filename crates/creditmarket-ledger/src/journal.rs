//! Receipt journal — bounded, append-only audit trail.
//!
//! Receipts are built before the state change they describe and committed
//! only after it succeeds, so a rejected operation never leaves a trace.
//! When the journal reaches capacity the oldest receipt is evicted; sequence
//! numbers keep increasing regardless.

use std::collections::VecDeque;

use creditmarket_types::{LedgerEvent, Receipt, Result};

/// Bounded journal of receipts in sequence order.
pub struct Journal {
    /// Retained receipts (front = oldest).
    receipts: VecDeque<Receipt>,
    /// Maximum number of receipts before eviction kicks in.
    capacity: usize,
    /// Sequence number the next committed receipt receives.
    next_sequence: u64,
}

impl Journal {
    /// Create a journal retaining at most `capacity` receipts.
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Journal capacity must be > 0");
        Self {
            receipts: VecDeque::new(),
            capacity,
            next_sequence: 0,
        }
    }

    /// Build the receipt the next commit would append, without appending it.
    pub fn prepare(&self, event: LedgerEvent) -> Result<Receipt> {
        Receipt::new(self.next_sequence, event)
    }

    /// Append a prepared receipt, evicting the oldest if at capacity.
    pub fn commit(&mut self, receipt: Receipt) {
        debug_assert_eq!(receipt.sequence, self.next_sequence);
        if self.receipts.len() >= self.capacity {
            self.receipts.pop_front();
        }
        self.next_sequence = receipt.sequence + 1;
        self.receipts.push_back(receipt);
    }

    /// Retained receipts, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Receipt> {
        self.receipts.iter()
    }

    /// Most recently committed receipt.
    #[must_use]
    pub fn latest(&self) -> Option<&Receipt> {
        self.receipts.back()
    }

    /// Total receipts ever committed, including evicted ones.
    #[must_use]
    pub fn total_committed(&self) -> u64 {
        self.next_sequence
    }

    pub fn len(&self) -> usize {
        self.receipts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receipts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use creditmarket_types::ParticipantId;

    fn deposit(amount: u64) -> LedgerEvent {
        LedgerEvent::Deposited {
            participant: ParticipantId::from("user1"),
            amount,
        }
    }

    #[test]
    fn prepare_does_not_append() {
        let journal = Journal::new(10);
        let receipt = journal.prepare(deposit(1)).unwrap();
        assert_eq!(receipt.sequence, 0);
        assert!(journal.is_empty());
        assert_eq!(journal.total_committed(), 0);
    }

    #[test]
    fn commit_assigns_increasing_sequences() {
        let mut journal = Journal::new(10);
        for amount in 1..=3 {
            let receipt = journal.prepare(deposit(amount)).unwrap();
            journal.commit(receipt);
        }
        let seqs: Vec<u64> = journal.iter().map(|r| r.sequence).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(journal.latest().unwrap().event, deposit(3));
    }

    #[test]
    fn evicts_oldest() {
        let mut journal = Journal::new(2);
        for amount in 1..=3 {
            let receipt = journal.prepare(deposit(amount)).unwrap();
            journal.commit(receipt);
        }
        assert_eq!(journal.len(), 2);
        assert_eq!(journal.total_committed(), 3);
        let seqs: Vec<u64> = journal.iter().map(|r| r.sequence).collect();
        assert_eq!(seqs, vec![1, 2], "sequence 0 should have been evicted");
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = Journal::new(0);
    }
}
