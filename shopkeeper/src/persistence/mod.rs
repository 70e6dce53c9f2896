//! Persistence: line-oriented text formats, file stores, and the ledger
//! store trait.
//!
//! All state survives restarts through plain text files. The codecs are pure
//! string transforms and tolerate damaged lines; the file helpers map a
//! missing file to an empty value so a fresh data directory just works. The
//! one write that gates domain behavior, the ledger append, goes through the
//! [`LedgerStore`] trait so checkout can be exercised against an in-memory
//! store with injectable failures.

use std::path::PathBuf;

use thiserror::Error;

pub mod codec;
pub mod files;
pub mod store;

pub use store::{FileLedgerStore, LedgerStore, MemoryLedgerStore};

/// Errors raised while loading or saving state
#[derive(Debug, Error)]
pub enum PersistError {
    /// The underlying file operation failed
    #[error("could not access {}: {source}", path.display())]
    Io {
        /// The file involved
        path: PathBuf,
        /// The operating system error
        #[source]
        source: std::io::Error,
    },
    /// A store lock was poisoned by a panicking writer
    #[error("ledger store lock poisoned")]
    Poisoned,
    /// The store refused the write
    #[error("ledger write refused: {0}")]
    Refused(String),
}
