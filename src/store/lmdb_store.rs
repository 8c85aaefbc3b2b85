//! [Store] implementation over the `lmdb` crate: the concrete
//! transactional-KV engine behind the [Store] contract.

use lmdb::{Cursor as LmdbCursorTrait, Transaction, WriteFlags};

use std::path::Path;

use crate::{
    err_at,
    store::{Cursor, PutFlags, Store},
    Result,
};

/// An LMDB environment plus a single named database, opened for the
/// lifetime of a backend instance.
pub struct LmdbStore {
    env: lmdb::Environment,
    db: lmdb::Database,
}

/// Either side of an LMDB transaction. Read-only callers pass
/// `LmdbTxn::Ro`; mutation operations require `LmdbTxn::Rw`.
pub enum LmdbTxn<'env> {
    Ro(lmdb::RoTransaction<'env>),
    Rw(lmdb::RwTransaction<'env>),
}

impl<'env> LmdbTxn<'env> {
    pub fn commit(self) -> Result<()> {
        match self {
            LmdbTxn::Ro(txn) => err_at!(Storage, txn.commit()),
            LmdbTxn::Rw(txn) => err_at!(Storage, txn.commit()),
        }
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, LmdbTxn::Rw(_))
    }
}

impl LmdbStore {
    /// Open (creating if necessary) an LMDB environment rooted at
    /// `path`, with a single anonymous database and `map_size` bytes of
    /// address-space reservation.
    pub fn open<P: AsRef<Path>>(path: P, map_size: usize) -> Result<LmdbStore> {
        let env = err_at!(
            IoError,
            lmdb::Environment::new()
                .set_map_size(map_size)
                .set_max_dbs(1)
                .open(path.as_ref())
        )?;
        let db = err_at!(Storage, env.open_db(None))?;
        Ok(LmdbStore { env, db })
    }

    pub fn begin_ro(&self) -> Result<LmdbTxn> {
        Ok(LmdbTxn::Ro(err_at!(Storage, self.env.begin_ro_txn())?))
    }

    pub fn begin_rw(&self) -> Result<LmdbTxn> {
        Ok(LmdbTxn::Rw(err_at!(Storage, self.env.begin_rw_txn())?))
    }
}

pub struct LmdbCursor<'txn> {
    iter: lmdb::Iter<'txn>,
}

impl<'txn> Cursor for LmdbCursor<'txn> {
    fn next(&mut self) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        match self.iter.next() {
            Some(Ok((k, v))) => Ok(Some((k.to_vec(), v.to_vec()))),
            Some(Err(err)) => Err(err.into()),
            None => Ok(None),
        }
    }
}

// `Store` is implemented for `&'env LmdbStore` rather than `LmdbStore`
// itself: this ties the associated `Txn`/`Cur` lifetimes to the borrow
// of the environment without needing generic associated types, which
// this crate's edition (2018) does not have.
impl<'env> Store for &'env LmdbStore {
    type Txn = LmdbTxn<'env>;
    type Cur = LmdbCursor<'env>;

    fn put(&self, txn: &mut Self::Txn, key: &[u8], value: &[u8], flags: PutFlags) -> Result<()> {
        let wflags = if flags.contains(PutFlags::NO_OVERWRITE) {
            WriteFlags::NO_OVERWRITE
        } else {
            WriteFlags::empty()
        };
        match txn {
            LmdbTxn::Rw(rw) => Ok(rw.put(self.db, &key, &value, wflags)?),
            LmdbTxn::Ro(_) => err_at!(Invalid, msg: "put requires a writable transaction"),
        }
    }

    fn get(&self, txn: &Self::Txn, key: &[u8]) -> Result<Vec<u8>> {
        let got = match txn {
            LmdbTxn::Ro(ro) => ro.get(self.db, &key),
            LmdbTxn::Rw(rw) => rw.get(self.db, &key),
        };
        Ok(got?.to_vec())
    }

    fn del(&self, txn: &mut Self::Txn, key: &[u8]) -> Result<()> {
        match txn {
            LmdbTxn::Rw(rw) => Ok(rw.del(self.db, &key, None)?),
            LmdbTxn::Ro(_) => err_at!(Invalid, msg: "del requires a writable transaction"),
        }
    }

    fn open_cursor(&self, txn: &Self::Txn) -> Result<Self::Cur> {
        let iter = match txn {
            LmdbTxn::Ro(ro) => err_at!(Storage, ro.open_ro_cursor(self.db))?.iter_start(),
            LmdbTxn::Rw(rw) => err_at!(Storage, rw.open_ro_cursor(self.db))?.iter_start(),
        };
        Ok(LmdbCursor { iter })
    }
}
