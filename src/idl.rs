//! IDL: a compact sorted set of IDs, stored as a single KV value.
//!
//! Backed by [croaring::Bitmap], which gives compact range encoding for
//! dense sets for free, instead of a hand-rolled run-length codec.

use croaring::Bitmap;

use crate::{
    err_at,
    store::{PutFlags, Store},
    types::Id,
    Result,
};

/// An ID list: either an explicit (possibly empty) set of ids, or the
/// `ALL` sentinel meaning "every ID known to the backend", used to
/// short-circuit a full-subtree enumeration rooted at the suffix.
#[derive(Debug, Clone)]
pub enum Idl {
    Ids(Bitmap),
    All,
}

impl Idl {
    pub fn empty() -> Idl {
        Idl::Ids(Bitmap::create())
    }

    pub fn all() -> Idl {
        Idl::All
    }

    pub fn from_ids<I: IntoIterator<Item = Id>>(ids: I) -> Idl {
        let mut bm = Bitmap::create();
        for id in ids {
            bm.add(id);
        }
        Idl::Ids(bm)
    }

    pub fn contains(&self, id: Id) -> bool {
        match self {
            Idl::All => true,
            Idl::Ids(bm) => bm.contains(id),
        }
    }

    pub fn len(&self) -> Option<u64> {
        match self {
            Idl::All => None,
            Idl::Ids(bm) => Some(bm.cardinality()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Idl::Ids(bm) if bm.cardinality() == 0)
    }

    /// Materialize as a sorted `Vec<Id>`. Panics if called on `All` —
    /// callers enumerating descendants must special-case the sentinel
    /// instead of expecting an explicit id list.
    pub fn to_vec(&self) -> Vec<Id> {
        match self {
            Idl::All => panic!("to_vec called on IDL::All sentinel"),
            Idl::Ids(bm) => bm.to_vec(),
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        match self {
            Idl::All => vec![0xff],
            Idl::Ids(bm) => {
                let mut out = vec![0x00];
                out.extend(bm.serialize());
                out
            }
        }
    }

    fn from_bytes(buf: &[u8]) -> Result<Idl> {
        match buf.first() {
            Some(0xff) => Ok(Idl::All),
            Some(0x00) => Ok(Idl::Ids(Bitmap::deserialize(&buf[1..]))),
            _ => err_at!(Corrupt, msg: "malformed idl value, len {}", buf.len()),
        }
    }
}

/// Insert `id` into the IDL stored at `key`, creating the row if it did
/// not already exist. Idempotent: inserting an already-present id is a
/// no-op.
pub fn insert_key<S>(store: &S, txn: &mut S::Txn, key: &[u8], id: Id) -> Result<()>
where
    S: Store,
{
    let mut idl = match store.get(txn, key) {
        Ok(buf) => Idl::from_bytes(&buf)?,
        Err(crate::Error::NotFound(_, _)) => Idl::empty(),
        Err(err) => return Err(err),
    };
    match &mut idl {
        Idl::All => (),
        Idl::Ids(bm) => {
            bm.add(id);
        }
    }
    store.put(txn, key, &idl.to_bytes(), PutFlags::NONE)
}

/// Remove `id` from the IDL stored at `key`. Deleting a member that is
/// not present is treated as corruption: a correct caller never asks to
/// remove an id that was never inserted.
pub fn delete_key<S>(store: &S, txn: &mut S::Txn, key: &[u8], id: Id) -> Result<()>
where
    S: Store,
{
    let buf = store.get(txn, key)?;
    let mut idl = Idl::from_bytes(&buf)?;
    match &mut idl {
        Idl::All => (),
        Idl::Ids(bm) => {
            if !bm.contains(id) {
                return err_at!(Corrupt, msg: "delete_key: id {} absent from idl at {:?}", id, key);
            }
            bm.remove(id);
        }
    }
    if idl.is_empty() {
        store.del(txn, key)
    } else {
        store.put(txn, key, &idl.to_bytes(), PutFlags::NONE)
    }
}

/// Fetch the IDL stored at `key`, or an empty IDL if the row is absent.
/// Matches `bdb_idl_fetch_key`'s behavior of returning an all-zero IDL
/// for an unpopulated key rather than erroring.
pub fn fetch_key<S>(store: &S, txn: &S::Txn, key: &[u8]) -> Result<Idl>
where
    S: Store,
{
    match store.get(txn, key) {
        Ok(buf) => Idl::from_bytes(&buf),
        Err(crate::Error::NotFound(_, _)) => Ok(Idl::empty()),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[path = "idl_test.rs"]
mod idl_test;
