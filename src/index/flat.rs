//! The flat DN index. One physical KV table, one byte prefix per
//! logical sub-table: `BASE` for the authoritative DN→ID mapping, `ONE`
//! for direct-children IDLs, `SUBTREE` for full-descendant IDLs.

use log::{trace, warn};

use crate::{
    dn::{self, Dn},
    err_at,
    idl::{self, Idl},
    index::{DnIndex, Matched, NewEntry},
    store::{PutFlags, Store},
    types::{Id, Prefix, NOID, ROOT_ID},
    Result,
};

const BASE_PREFIX: u8 = 0x01;
const ONE_PREFIX: u8 = 0x02;
const SUBTREE_PREFIX: u8 = 0x03;

fn key(prefix: u8, dn: &Dn) -> Vec<u8> {
    let mut k = Vec::with_capacity(dn.as_bytes().len() + 2);
    k.push(prefix);
    k.extend_from_slice(dn.as_bytes());
    k.push(0); // terminating NUL keeps prefixes of one dn from colliding with another
    k
}

/// The flat DN index, generic over the [Store] it's backed by so the
/// same logic runs against `LmdbStore` in production and `MemStore` in
/// tests.
pub struct FlatIndex<'s, S: Store> {
    store: &'s S,
    suffix: Dn,
}

impl<'s, S: Store> FlatIndex<'s, S> {
    pub fn new(store: &'s S, suffix: Dn) -> FlatIndex<'s, S> {
        FlatIndex { store, suffix }
    }

    fn is_suffix(&self, dn: &Dn) -> bool {
        dn::is_suffix(&self.suffix, dn)
    }
}

impl<'s, S: Store> DnIndex<S::Txn> for FlatIndex<'s, S> {
    fn add(&self, txn: &mut S::Txn, pdn: Option<&Dn>, entry: &NewEntry) -> Result<()> {
        if entry.id == NOID {
            return err_at!(Invalid, msg: "add: entry carries NOID");
        }
        // `id == 1` is reserved for the backend root/suffix entry; the
        // KV layer has no notion of this, so pin it down here rather
        // than leaving a wrong-id root silently accepted.
        if pdn.is_none() && entry.id != ROOT_ID {
            return err_at!(Invalid, msg: "add: root entry must use id {}, got {}", ROOT_ID, entry.id);
        }
        if pdn.is_some() && entry.id == ROOT_ID {
            return err_at!(Invalid, msg: "add: id {} is reserved for the root entry", ROOT_ID);
        }
        trace!("dn2id_add {} id={}", entry.ndn, entry.id);

        let base = key(BASE_PREFIX, &entry.ndn);
        let id_bytes = entry.id.to_be_bytes();
        self.store.put(txn, &base, &id_bytes, PutFlags::NO_OVERWRITE)?;

        if let Some(pdn) = pdn {
            let k = key(ONE_PREFIX, pdn);
            idl::insert_key(self.store, txn, &k, entry.id)?;
        }

        for ancestor in dn::ancestors_of(&entry.ndn) {
            // ancestors_of walks past the suffix for multi-RDN suffixes
            // (e.g. "dc=com" above "dc=example,dc=com"); those ancestors
            // are outside this backend and must not be indexed, and the
            // suffix itself relies on the descendants() suffix
            // short-circuit rather than a maintained SUBTREE row, so
            // stop the walk here.
            if self.is_suffix(&ancestor) {
                break;
            }
            let k = key(SUBTREE_PREFIX, &ancestor);
            idl::insert_key(self.store, txn, &k, entry.id)?;
        }

        Ok(())
    }

    fn delete(&self, txn: &mut S::Txn, pdn: Option<&Dn>, dn: &Dn, id: Id) -> Result<()> {
        trace!("dn2id_delete {} id={}", dn, id);

        let base = key(BASE_PREFIX, dn);
        self.store.del(txn, &base)?;

        if let Some(pdn) = pdn {
            let k = key(ONE_PREFIX, pdn);
            idl::delete_key(self.store, txn, &k, id)?;
        }

        for ancestor in dn::ancestors_of(dn) {
            if self.is_suffix(&ancestor) {
                break;
            }
            let k = key(SUBTREE_PREFIX, &ancestor);
            idl::delete_key(self.store, txn, &k, id)?;
        }

        Ok(())
    }

    fn lookup(&self, txn: &S::Txn, dn: &Dn) -> Result<Id> {
        let base = key(BASE_PREFIX, dn);
        let buf = self.store.get(txn, &base)?;
        decode_id(&buf)
    }

    fn lookup_matched(&self, txn: &S::Txn, dn: &Dn) -> Result<Matched> {
        if dn.is_empty() {
            return err_at!(NotFound, msg: "lookup_matched: empty dn");
        }

        let mut cur = dn.clone();
        let mut steps = 0usize;
        loop {
            let base = key(BASE_PREFIX, &cur);
            match self.store.get(txn, &base) {
                Ok(buf) => {
                    let id = match decode_id(&buf) {
                        Ok(id) => id,
                        Err(err) => {
                            warn!("lookup_matched: value size mismatch at {}", cur);
                            return Err(err);
                        }
                    };
                    let matched = if steps > 0 { Some(cur) } else { None };
                    return Ok(Matched { id, matched });
                }
                Err(crate::Error::NotFound(_, _)) => match dn::parent_of(&cur) {
                    Some(p) if !p.is_empty() => {
                        cur = p;
                        steps += 1;
                    }
                    _ => return err_at!(NotFound, msg: "lookup_matched: no ancestor of {} exists", dn),
                },
                Err(err) => return Err(err),
            }
        }
    }

    fn has_children(&self, txn: &S::Txn, dn: &Dn) -> Result<bool> {
        let k = key(ONE_PREFIX, dn);
        self.store.has_key(txn, &k)
    }

    fn descendants(&self, txn: &S::Txn, dn: &Dn, prefix: Prefix) -> Result<Idl> {
        if prefix == Prefix::Subtree && self.is_suffix(dn) {
            return Ok(Idl::all());
        }
        let raw_prefix = match prefix {
            Prefix::One => ONE_PREFIX,
            Prefix::Subtree => SUBTREE_PREFIX,
        };
        let k = key(raw_prefix, dn);
        idl::fetch_key(self.store, txn, &k)
    }
}

fn decode_id(buf: &[u8]) -> Result<Id> {
    if buf.len() != 4 {
        return err_at!(Corrupt, msg: "base row has wrong width: {} bytes", buf.len());
    }
    let mut arr = [0u8; 4];
    arr.copy_from_slice(buf);
    Ok(Id::from_be_bytes(arr))
}

/// Convenience wrapper for adding the configured suffix itself: fills in
/// the suffix's own `ndn` and calls `add` with no parent. `add` itself
/// rejects any id other than `ROOT_ID` for a parentless entry, so this
/// does not need to re-check.
pub fn add_suffix<S: Store>(index: &FlatIndex<S>, txn: &mut S::Txn, id: Id) -> Result<()> {
    let entry = NewEntry {
        ndn: index.suffix.clone(),
        id,
        rdn: String::new(),
    };
    index.add(txn, None, &entry)
}

#[cfg(test)]
#[path = "flat_test.rs"]
mod flat_test;
