//! The transactional key-value contract this index is built on: opaque
//! `put`/`get`/`del`/`cursor` over byte keys and values, with a
//! `NOOVERWRITE` put flag and a distinguished `NotFound` error. This
//! module pins that contract down as a trait so both index variants are
//! generic over it, instead of hard-wired to one engine.

use crate::Result;

mod mem_store;
#[cfg(feature = "lmdb-backend")]
mod lmdb_store;

pub use mem_store::{MemStore, MemTxn};
#[cfg(feature = "lmdb-backend")]
pub use lmdb_store::{LmdbStore, LmdbTxn};

/// Flags accepted by [Store::put]. Only `NO_OVERWRITE` is defined, which
/// is the only flag any caller in this crate actually uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PutFlags(u32);

impl PutFlags {
    pub const NONE: PutFlags = PutFlags(0x00);
    pub const NO_OVERWRITE: PutFlags = PutFlags(0x01);

    pub fn contains(&self, other: PutFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// A cursor over the whole table, in the KV engine's natural key order.
/// Used once, at hierarchical-index startup, to stream every row.
pub trait Cursor {
    /// Return the next `(key, value)` pair, or `None` at end of table.
    fn next(&mut self) -> Result<Option<(Vec<u8>, Vec<u8>)>>;
}

/// One transaction handle, as threaded through every public DN-index
/// operation. `None` anywhere a `Txn` is expected means "use an implicit
/// read snapshot" for read-only operations.
pub trait Store {
    type Txn: ?Sized;
    type Cur: Cursor;

    /// Insert or overwrite `key => value`. When `flags` contains
    /// `NO_OVERWRITE`, an existing `key` causes `Error::Exists` instead
    /// of being overwritten.
    fn put(&self, txn: &mut Self::Txn, key: &[u8], value: &[u8], flags: PutFlags) -> Result<()>;

    /// Fetch the value stored at `key`, or `Error::NotFound`.
    fn get(&self, txn: &Self::Txn, key: &[u8]) -> Result<Vec<u8>>;

    /// Remove `key`, or `Error::NotFound` if absent.
    fn del(&self, txn: &mut Self::Txn, key: &[u8]) -> Result<()>;

    /// `true` iff `key` is present, without materializing its value.
    fn has_key(&self, txn: &Self::Txn, key: &[u8]) -> Result<bool> {
        match self.get(txn, key) {
            Ok(_) => Ok(true),
            Err(crate::Error::NotFound(_, _)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Cursor over the whole table in natural key order.
    fn open_cursor(&self, txn: &Self::Txn) -> Result<Self::Cur>;
}
