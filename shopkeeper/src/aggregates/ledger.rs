//! Ledger aggregate: append-only per-actor transaction books.
//!
//! Each actor owns a book with its own sequential transaction ids, so two
//! actors both legitimately hold a transaction 1. Queries take a
//! [`LedgerScope`]: an actor sees their own book, oversight merges every book
//! with no filtering. The ledger is only ever mutated by checkout commit
//! events; there is no ledger reducer.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{ActorId, Money, Transaction, TransactionId};

/// Whose records a ledger query sees
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerScope {
    /// One actor's own book
    Actor(ActorId),
    /// Every book, merged in actor id order
    Oversight,
}

/// Aggregate numbers over a set of transactions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSummary {
    /// Number of transactions
    pub count: usize,
    /// Sum of final totals
    pub total: Money,
    /// Mean final total, truncated to whole cents; zero when `count` is zero
    pub average: Money,
}

// ============================================================================
// Books
// ============================================================================

/// One actor's append-only transaction book
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerBook {
    /// Next transaction id to assign within this book
    next_id: u32,
    /// Committed transactions in append order
    records: Vec<Transaction>,
}

impl Default for LedgerBook {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerBook {
    /// Creates an empty book; ids start at 1
    #[must_use]
    pub const fn new() -> Self {
        Self { next_id: 1, records: Vec::new() }
    }

    /// Rebuilds a book from persisted parts.
    ///
    /// The id counter is cross-checked against the highest record id, so a
    /// stale header can never cause an id to be assigned twice.
    #[must_use]
    pub fn from_parts(next_id: u32, mut records: Vec<Transaction>) -> Self {
        records.sort_by_key(|tx| tx.id);
        let highest = records.last().map_or(0, |tx| tx.id.value());
        Self { next_id: next_id.max(highest + 1), records }
    }

    /// The id the next committed transaction will receive
    #[must_use]
    pub const fn next_id(&self) -> TransactionId {
        TransactionId::new(self.next_id)
    }

    /// The committed transactions in id order
    #[must_use]
    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    /// A copy of this book with one more transaction, for persisting ahead of
    /// the in-memory append
    #[must_use]
    pub fn staged(&self, transaction: &Transaction) -> Self {
        let mut book = self.clone();
        book.append(transaction.clone());
        book
    }

    fn append(&mut self, transaction: Transaction) {
        self.next_id = self.next_id.max(transaction.id.value() + 1);
        self.records.push(transaction);
    }
}

// ============================================================================
// State
// ============================================================================

/// Ledger state: every actor's book
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LedgerState {
    books: BTreeMap<ActorId, LedgerBook>,
}

impl LedgerState {
    /// Creates an empty ledger
    #[must_use]
    pub const fn new() -> Self {
        Self { books: BTreeMap::new() }
    }

    /// Rebuilds the ledger from persisted books
    #[must_use]
    pub const fn from_books(books: BTreeMap<ActorId, LedgerBook>) -> Self {
        Self { books }
    }

    /// One actor's book, if they have committed anything
    #[must_use]
    pub fn book(&self, actor_id: ActorId) -> Option<&LedgerBook> {
        self.books.get(&actor_id)
    }

    /// The id the actor's next transaction will receive
    #[must_use]
    pub fn next_id(&self, actor_id: ActorId) -> TransactionId {
        self.books.get(&actor_id).map_or(TransactionId::new(1), LedgerBook::next_id)
    }

    /// The actor's book with one more transaction, for the persist step
    #[must_use]
    pub fn staged_book(&self, actor_id: ActorId, transaction: &Transaction) -> LedgerBook {
        self.books
            .get(&actor_id)
            .map_or_else(|| LedgerBook::new().staged(transaction), |book| book.staged(transaction))
    }

    /// Appends a committed transaction to the owning actor's book
    pub(crate) fn append(&mut self, transaction: Transaction) {
        self.books
            .entry(transaction.actor_id)
            .or_default()
            .append(transaction);
    }

    /// Records visible to a scope, actor id order then id order
    #[must_use]
    pub fn records(&self, scope: LedgerScope) -> Vec<&Transaction> {
        match scope {
            LedgerScope::Actor(actor_id) => self
                .books
                .get(&actor_id)
                .map_or_else(Vec::new, |book| book.records().iter().collect()),
            LedgerScope::Oversight => self
                .books
                .values()
                .flat_map(|book| book.records().iter())
                .collect(),
        }
    }

    /// Finds a transaction by id within a scope.
    ///
    /// Under oversight, ids repeat across actors; the match from the lowest
    /// actor id wins.
    #[must_use]
    pub fn find(&self, scope: LedgerScope, id: TransactionId) -> Option<&Transaction> {
        self.records(scope).into_iter().find(|tx| tx.id == id)
    }

    /// Transactions whose calendar date falls inside the inclusive range
    #[must_use]
    pub fn filter_by_date_range(
        &self,
        scope: LedgerScope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<&Transaction> {
        self.records(scope)
            .into_iter()
            .filter(|tx| {
                let date = tx.timestamp.date_naive();
                date >= start && date <= end
            })
            .collect()
    }

    /// Transactions whose final total falls inside the inclusive range
    #[must_use]
    pub fn filter_by_amount_range(
        &self,
        scope: LedgerScope,
        min: Money,
        max: Money,
    ) -> Vec<&Transaction> {
        self.records(scope)
            .into_iter()
            .filter(|tx| tx.final_total >= min && tx.final_total <= max)
            .collect()
    }

    /// Count, total, and mean of the final totals visible to a scope
    #[must_use]
    pub fn summary(&self, scope: LedgerScope) -> LedgerSummary {
        let records = self.records(scope);
        let count = records.len();
        let total = records.iter().fold(Money::ZERO, |sum, tx| {
            sum.checked_add(tx.final_total).unwrap_or(Money::from_cents(u64::MAX))
        });
        let average = if count == 0 {
            Money::ZERO
        } else {
            Money::from_cents(total.cents() / count as u64)
        };
        LedgerSummary { count, total, average }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::types::{DiscountRate, Tier};

    fn transaction(actor: u32, id: u32, final_dollars: u64, day: u32) -> Transaction {
        let final_total = Money::from_dollars(final_dollars);
        Transaction {
            id: TransactionId::new(id),
            actor_id: ActorId::new(actor),
            items: Vec::new(),
            raw_total: final_total,
            discount_rate: DiscountRate::FULL,
            final_total,
            timestamp: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
            tier: Tier::Silver,
        }
    }

    fn seeded() -> LedgerState {
        let mut state = LedgerState::new();
        state.append(transaction(1, 1, 100, 1));
        state.append(transaction(1, 2, 300, 5));
        state.append(transaction(2, 1, 50, 3));
        state
    }

    #[test]
    fn each_actor_numbers_independently() {
        let state = seeded();
        assert_eq!(state.next_id(ActorId::new(1)), TransactionId::new(3));
        assert_eq!(state.next_id(ActorId::new(2)), TransactionId::new(2));
        assert_eq!(state.next_id(ActorId::new(9)), TransactionId::new(1));
    }

    #[test]
    fn oversight_merges_books_in_actor_order() {
        let state = seeded();
        let actors: Vec<u32> = state
            .records(LedgerScope::Oversight)
            .iter()
            .map(|tx| tx.actor_id.value())
            .collect();
        assert_eq!(actors, vec![1, 1, 2]);
        assert_eq!(state.records(LedgerScope::Actor(ActorId::new(2))).len(), 1);
    }

    #[test]
    fn find_prefers_lowest_actor_under_oversight() {
        let state = seeded();
        let found = state.find(LedgerScope::Oversight, TransactionId::new(1)).unwrap();
        assert_eq!(found.actor_id, ActorId::new(1));
        let scoped = state
            .find(LedgerScope::Actor(ActorId::new(2)), TransactionId::new(1))
            .unwrap();
        assert_eq!(scoped.actor_id, ActorId::new(2));
        assert!(state.find(LedgerScope::Actor(ActorId::new(2)), TransactionId::new(2)).is_none());
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let state = seeded();
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let hits = state.filter_by_date_range(LedgerScope::Oversight, start, end);
        assert_eq!(hits.len(), 2);
        let empty = state.filter_by_date_range(
            LedgerScope::Oversight,
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 4, 30).unwrap(),
        );
        assert!(empty.is_empty());
    }

    #[test]
    fn amount_range_is_inclusive_on_both_ends() {
        let state = seeded();
        let hits = state.filter_by_amount_range(
            LedgerScope::Oversight,
            Money::from_dollars(50),
            Money::from_dollars(100),
        );
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn summary_truncates_the_average() {
        let state = seeded();
        let summary = state.summary(LedgerScope::Oversight);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total, Money::from_dollars(450));
        assert_eq!(summary.average, Money::from_dollars(150));

        let empty = LedgerState::new().summary(LedgerScope::Oversight);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.average, Money::ZERO);

        let mut odd = LedgerState::new();
        odd.append(transaction(1, 1, 1, 1));
        odd.append(transaction(1, 2, 2, 1));
        // 300 cents / 2... here 3 dollars over 2 -> 150 cents each, exact;
        // use cents that do not divide evenly
        odd.append(transaction(1, 3, 1, 1));
        let summary = odd.summary(LedgerScope::Actor(ActorId::new(1)));
        assert_eq!(summary.average, Money::from_cents(133));
    }

    #[test]
    fn staged_book_does_not_mutate_state() {
        let state = seeded();
        let incoming = transaction(1, 3, 75, 9);
        let staged = state.staged_book(ActorId::new(1), &incoming);
        assert_eq!(staged.records().len(), 3);
        assert_eq!(staged.next_id(), TransactionId::new(4));
        assert_eq!(state.records(LedgerScope::Actor(ActorId::new(1))).len(), 2);
    }

    #[test]
    fn stale_header_cannot_reissue_ids() {
        let book =
            LedgerBook::from_parts(1, vec![transaction(1, 5, 10, 1), transaction(1, 2, 10, 1)]);
        assert_eq!(book.next_id(), TransactionId::new(6));
        assert_eq!(book.records()[0].id, TransactionId::new(2), "records sorted by id");
    }
}
