// 🔁 Transaction Sequence - evenly spaced series of similar transactions

use crate::transaction::{SequenceId, Transaction};
use serde::Serialize;
use std::collections::HashSet;

// ============================================================================
// TRANSACTION SEQUENCE
// ============================================================================

/// Ordered, deduplicated run of transactions.
///
/// Each member after the first was accepted because its date lies
/// `interval ± margin` days after the member added just before it.
/// Insertion order is kept and is chronological when built by the parser.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionSequence {
    /// Expected distance between members, in days
    pub interval: i64,

    transactions: Vec<Transaction>,

    #[serde(skip)]
    ids: HashSet<String>,
}

impl TransactionSequence {
    pub fn new(interval: i64) -> Self {
        TransactionSequence {
            interval,
            transactions: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Add a transaction, enforcing the interval rule against the last member.
    ///
    /// The first transaction is always accepted. Returns `true` only when the
    /// transaction was newly inserted; an identity already present is a no-op.
    pub fn add_transaction(&mut self, transaction: &Transaction, margin: i64) -> bool {
        if let Some(last) = self.last_transaction() {
            let diff = last.days_until(transaction);
            let lowest = self.interval.saturating_sub(margin);
            let highest = self.interval.saturating_add(margin);
            if diff < lowest || diff > highest {
                return false;
            }
        }

        if !self.ids.insert(transaction.id().to_string()) {
            return false;
        }

        self.transactions.push(transaction.clone());
        true
    }

    /// Add transactions in order; returns how many were accepted
    pub fn add_transactions<'a, I>(&mut self, transactions: I, margin: i64) -> usize
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        transactions
            .into_iter()
            .filter(|tx| self.add_transaction(tx, margin))
            .count()
    }

    /// Point every member's back-reference at this sequence.
    /// Members already owned elsewhere keep their owner.
    pub fn set_ownership(&mut self) {
        let Some(id) = self.id() else {
            return;
        };

        for transaction in &mut self.transactions {
            transaction.set_sequence(id.clone());
        }
    }

    /// Sequence identity, named after the anchor member
    pub fn id(&self) -> Option<SequenceId> {
        self.first_transaction().map(|tx| SequenceId::new(tx.id()))
    }

    pub fn first_transaction(&self) -> Option<&Transaction> {
        self.transactions.first()
    }

    pub fn last_transaction(&self) -> Option<&Transaction> {
        self.transactions.last()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Membership by identity
    pub fn contains(&self, transaction: &Transaction) -> bool {
        self.ids.contains(transaction.id())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}

impl PartialEq for TransactionSequence {
    fn eq(&self, other: &Self) -> bool {
        self.interval == other.interval && self.transactions == other.transactions
    }
}

impl Eq for TransactionSequence {}

impl<'a> IntoIterator for &'a TransactionSequence {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

// ============================================================================
// TESTS
// ============================================================================
