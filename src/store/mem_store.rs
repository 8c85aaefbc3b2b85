//! In-memory [Store] used by tests in place of a file-backed LMDB
//! environment.

use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
};

use crate::{
    err_at,
    store::{Cursor, PutFlags, Store},
    Result,
};

/// A `Store` backed by a single `Mutex<BTreeMap>`. Transactions are not
/// isolated from each other beyond the mutex itself: writes take effect
/// immediately and there is no rollback. This is adequate for unit tests
/// that exercise the index logic but do not exercise crash-consistency,
/// which is the underlying KV engine's own responsibility.
#[derive(Default)]
pub struct MemStore {
    table: Mutex<BTreeMap<Vec<u8>, Vec<u8>>>,
}

/// Placeholder transaction handle; `MemStore` has no real transaction
/// machinery, so this only exists to satisfy the `Store::Txn` contract.
pub struct MemTxn;

impl MemStore {
    pub fn new() -> MemStore {
        MemStore {
            table: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn begin(&self) -> MemTxn {
        MemTxn
    }

    fn lock(&self) -> MutexGuard<BTreeMap<Vec<u8>, Vec<u8>>> {
        self.table.lock().expect("mem-store mutex poisoned")
    }
}

pub struct MemCursor {
    rows: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
}

impl Cursor for MemCursor {
    fn next(&mut self) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        Ok(self.rows.next())
    }
}

impl Store for MemStore {
    type Txn = MemTxn;
    type Cur = MemCursor;

    fn put(&self, _txn: &mut MemTxn, key: &[u8], value: &[u8], flags: PutFlags) -> Result<()> {
        let mut table = self.lock();
        if flags.contains(PutFlags::NO_OVERWRITE) && table.contains_key(key) {
            return err_at!(Exists, msg: "key {:?} already present", key);
        }
        table.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn get(&self, _txn: &MemTxn, key: &[u8]) -> Result<Vec<u8>> {
        match self.lock().get(key) {
            Some(v) => Ok(v.clone()),
            None => err_at!(NotFound, msg: "key {:?} absent", key),
        }
    }

    fn del(&self, _txn: &mut MemTxn, key: &[u8]) -> Result<()> {
        match self.lock().remove(key) {
            Some(_) => Ok(()),
            None => err_at!(NotFound, msg: "key {:?} absent", key),
        }
    }

    fn open_cursor(&self, _txn: &MemTxn) -> Result<MemCursor> {
        let rows: Vec<(Vec<u8>, Vec<u8>)> = self
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(MemCursor {
            rows: rows.into_iter(),
        })
    }
}

#[cfg(test)]
#[path = "mem_store_test.rs"]
mod mem_store_test;
