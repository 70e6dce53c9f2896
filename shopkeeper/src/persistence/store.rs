//! Ledger stores: where per-actor transaction books are persisted.
//!
//! Checkout commits gate on a successful [`LedgerStore::persist`], so the
//! store is a trait: production writes one text file per actor, tests swap in
//! [`MemoryLedgerStore`] and flip its failure switch to exercise the rollback
//! path.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::aggregates::ledger::LedgerBook;
use crate::persistence::files::write_text;
use crate::persistence::{PersistError, codec};
use crate::types::ActorId;

/// Persists and loads per-actor ledger books
pub trait LedgerStore: Send + Sync {
    /// Writes one actor's whole book, replacing what was there.
    ///
    /// # Errors
    ///
    /// Fails when the book cannot be written; the caller treats the commit as
    /// failed.
    fn persist(&self, actor_id: ActorId, book: &LedgerBook) -> Result<(), PersistError>;

    /// Loads one actor's book, or an empty book if none was persisted.
    ///
    /// # Errors
    ///
    /// Fails when the book exists but cannot be read.
    fn load(&self, actor_id: ActorId) -> Result<LedgerBook, PersistError>;

    /// Loads every persisted book.
    ///
    /// # Errors
    ///
    /// Fails when the store cannot be enumerated or a book cannot be read.
    fn load_all(&self) -> Result<BTreeMap<ActorId, LedgerBook>, PersistError>;
}

// ============================================================================
// File store
// ============================================================================

const LEDGER_FILE_PREFIX: &str = "transactions_user_";
const LEDGER_FILE_SUFFIX: &str = ".txt";

/// Ledger store writing one `transactions_user_{id}.txt` per actor
#[derive(Clone, Debug)]
pub struct FileLedgerStore {
    dir: PathBuf,
}

impl FileLedgerStore {
    /// Creates a store rooted at the data directory
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn book_path(&self, actor_id: ActorId) -> PathBuf {
        self.dir.join(format!("{LEDGER_FILE_PREFIX}{}{LEDGER_FILE_SUFFIX}", actor_id.value()))
    }

    fn actor_from_file_name(name: &str) -> Option<ActorId> {
        let id = name
            .strip_prefix(LEDGER_FILE_PREFIX)?
            .strip_suffix(LEDGER_FILE_SUFFIX)?
            .parse()
            .ok()?;
        Some(ActorId::new(id))
    }
}

impl LedgerStore for FileLedgerStore {
    fn persist(&self, actor_id: ActorId, book: &LedgerBook) -> Result<(), PersistError> {
        write_text(&self.book_path(actor_id), &codec::encode_ledger_book(book))
    }

    fn load(&self, actor_id: ActorId) -> Result<LedgerBook, PersistError> {
        let path = self.book_path(actor_id);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(codec::decode_ledger_book(&text)),
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => Ok(LedgerBook::new()),
            Err(source) => Err(PersistError::Io { path, source }),
        }
    }

    fn load_all(&self) -> Result<BTreeMap<ActorId, LedgerBook>, PersistError> {
        let mut books = BTreeMap::new();
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(books),
            Err(source) => {
                return Err(PersistError::Io { path: self.dir.clone(), source });
            },
        };
        for entry in entries {
            let entry = entry.map_err(|source| PersistError::Io {
                path: self.dir.clone(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(actor_id) = file_name.to_str().and_then(Self::actor_from_file_name) else {
                continue;
            };
            books.insert(actor_id, self.load(actor_id)?);
        }
        Ok(books)
    }
}

// ============================================================================
// Memory store
// ============================================================================

/// In-memory ledger store with an injectable write failure
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    books: Mutex<BTreeMap<ActorId, LedgerBook>>,
    fail_writes: AtomicBool,
}

impl MemoryLedgerStore {
    /// Creates an empty store that accepts writes
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `persist` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// A snapshot of everything persisted so far.
    ///
    /// # Errors
    ///
    /// Fails when the lock was poisoned.
    pub fn books(&self) -> Result<BTreeMap<ActorId, LedgerBook>, PersistError> {
        Ok(self.books.lock().map_err(|_| PersistError::Poisoned)?.clone())
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn persist(&self, actor_id: ActorId, book: &LedgerBook) -> Result<(), PersistError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistError::Refused("write failure injected".to_string()));
        }
        self.books
            .lock()
            .map_err(|_| PersistError::Poisoned)?
            .insert(actor_id, book.clone());
        Ok(())
    }

    fn load(&self, actor_id: ActorId) -> Result<LedgerBook, PersistError> {
        Ok(self
            .books
            .lock()
            .map_err(|_| PersistError::Poisoned)?
            .get(&actor_id)
            .cloned()
            .unwrap_or_default())
    }

    fn load_all(&self) -> Result<BTreeMap<ActorId, LedgerBook>, PersistError> {
        self.books()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;
    use crate::types::{DiscountRate, Money, Tier, Transaction, TransactionId};

    fn book_with_one_tx(actor: u32) -> LedgerBook {
        LedgerBook::from_parts(1, vec![Transaction {
            id: TransactionId::new(1),
            actor_id: ActorId::new(actor),
            items: Vec::new(),
            raw_total: Money::from_dollars(10),
            discount_rate: DiscountRate::FULL,
            final_total: Money::from_dollars(10),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap(),
            tier: Tier::Silver,
        }])
    }

    #[test]
    fn file_store_round_trips_books() {
        let dir = TempDir::new().unwrap();
        let store = FileLedgerStore::new(dir.path().to_path_buf());
        let book = book_with_one_tx(3);
        store.persist(ActorId::new(3), &book).unwrap();
        assert_eq!(store.load(ActorId::new(3)).unwrap(), book);
        assert_eq!(store.load(ActorId::new(9)).unwrap(), LedgerBook::new());
    }

    #[test]
    fn file_store_scans_the_directory() {
        let dir = TempDir::new().unwrap();
        let store = FileLedgerStore::new(dir.path().to_path_buf());
        store.persist(ActorId::new(1), &book_with_one_tx(1)).unwrap();
        store.persist(ActorId::new(5), &book_with_one_tx(5)).unwrap();
        std::fs::write(dir.path().join("products.txt"), "1\n").unwrap();
        let books = store.load_all().unwrap();
        let actors: Vec<u32> = books.keys().map(|id| id.value()).collect();
        assert_eq!(actors, vec![1, 5], "only ledger files are picked up");
    }

    #[test]
    fn load_all_of_a_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileLedgerStore::new(dir.path().join("not-created-yet"));
        assert!(store.load_all().unwrap().is_empty());
    }

    #[test]
    fn memory_store_failure_switch() {
        let store = MemoryLedgerStore::new();
        let book = book_with_one_tx(1);
        store.set_fail_writes(true);
        assert!(store.persist(ActorId::new(1), &book).is_err());
        assert!(store.books().unwrap().is_empty());

        store.set_fail_writes(false);
        store.persist(ActorId::new(1), &book).unwrap();
        assert_eq!(store.load(ActorId::new(1)).unwrap(), book);
    }
}
