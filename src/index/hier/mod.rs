//! The hierarchical DN index. One physical id→diskNode relation on
//! disk; the in-memory [tree::Tree] it is reconstructed into at startup
//! answers every hierarchical question without a further store
//! round-trip, falling back to the KV layer only on `add`/`delete`.

pub mod node;
pub mod tree;

use log::trace;

use node::DiskNode;
use tree::Tree;

use crate::{
    dn::{self, Dn},
    err_at,
    idl::Idl,
    index::{DnIndex, Matched, NewEntry},
    store::{PutFlags, Store},
    types::{Id, Prefix, NOID, NO_PARENT},
    Result,
};

/// The hierarchical DN index, generic over its backing [Store] the same
/// way [super::flat::FlatIndex] is.
pub struct HierIndex<'s, S: Store> {
    store: &'s S,
    tree: Tree,
}

impl<'s, S: Store> HierIndex<'s, S> {
    /// Reconstruct the tree from the id→diskNode relation and wire it to
    /// `store`. Run once at startup; every lookup afterward is served
    /// from the in-memory tree.
    pub fn open(store: &'s S, txn: &S::Txn, suffix: Dn) -> Result<HierIndex<'s, S>> {
        let tree = Tree::build(store, txn, suffix)?;
        Ok(HierIndex { store, tree })
    }

    fn parent_id(&self, pdn: Option<&Dn>) -> Result<Id> {
        match pdn {
            Some(pdn) => self.tree.lookup(pdn),
            None => Ok(NO_PARENT),
        }
    }

    /// Rebuild the display DN and normalized DN of `id` by walking
    /// parent links in the in-memory tree and appending the suffix.
    pub fn reconstruct_dn(&self, id: Id) -> Result<(Dn, Dn)> {
        self.tree.reconstruct_dn(id)
    }
}

impl<'s, S: Store> DnIndex<S::Txn> for HierIndex<'s, S> {
    fn add(&self, txn: &mut S::Txn, pdn: Option<&Dn>, entry: &NewEntry) -> Result<()> {
        if entry.id == NOID {
            return err_at!(Invalid, msg: "add: entry carries NOID");
        }
        // The on-disk row is keyed by id, not by dn, so NOOVERWRITE below
        // only catches a reused id — a fresh id against an already-mapped
        // dn would otherwise sail through and leave two kids with the
        // same nrdn under one parent. Check the dn side explicitly.
        if self.tree.lookup(&entry.ndn).is_ok() {
            return err_at!(Exists, msg: "add: dn {} already mapped", entry.ndn);
        }
        trace!("hier add {} id={}", entry.ndn, entry.id);

        let parent = self.parent_id(pdn)?;
        // The KV layer has no notion of a reserved root id, so pin it
        // down here rather than leaving a wrong-id root silently
        // unreachable by dn.
        if parent == NO_PARENT && entry.id != crate::types::ROOT_ID {
            return err_at!(Invalid, msg: "add: root entry must use id {}, got {}", crate::types::ROOT_ID, entry.id);
        }
        if parent != NO_PARENT && entry.id == crate::types::ROOT_ID {
            return err_at!(Invalid, msg: "add: id {} is reserved for the root entry", crate::types::ROOT_ID);
        }
        // The root/suffix entry (no parent) contributes no RDN of its
        // own: reconstruct_dn always appends the configured suffix once,
        // unconditionally, after walking every parent link, so storing
        // the suffix's own leaf RDN here too would duplicate it.
        let (rdn, nrdn) = if parent == NO_PARENT {
            (String::new(), String::new())
        } else {
            (entry.rdn.clone(), dn::rdn_of(&entry.ndn).unwrap_or_default())
        };
        let disk = DiskNode {
            parent,
            rdn,
            nrdn,
        };
        let key = entry.id.to_be_bytes();
        self.store.put(txn, &key, &disk.encode(), PutFlags::NO_OVERWRITE)?;
        self.tree.add_node(entry.id, disk)
    }

    /// `pdn` is unused here: the row at `id` already names its parent,
    /// and the tree removes `id` from that parent's `kids` directly.
    /// Deleting a non-leaf is a caller precondition this variant does
    /// not itself enforce, so a non-leaf delete succeeds here and leaves
    /// the children's on-disk `parent` field orphaned.
    fn delete(&self, txn: &mut S::Txn, _pdn: Option<&Dn>, _dn: &Dn, id: Id) -> Result<()> {
        trace!("hier delete id={}", id);
        let key = id.to_be_bytes();
        self.store.del(txn, &key)?;
        self.tree.delete_node(id)
    }

    fn lookup(&self, _txn: &S::Txn, dn: &Dn) -> Result<Id> {
        self.tree.lookup(dn)
    }

    fn lookup_matched(&self, _txn: &S::Txn, dn: &Dn) -> Result<Matched> {
        self.tree.lookup_matched(dn)
    }

    fn has_children(&self, _txn: &S::Txn, dn: &Dn) -> Result<bool> {
        let id = self.tree.lookup(dn)?;
        self.tree.has_children(id)
    }

    fn descendants(&self, _txn: &S::Txn, dn: &Dn, prefix: Prefix) -> Result<Idl> {
        if prefix == Prefix::Subtree && dn::is_suffix(&self.tree.suffix, dn) {
            return Ok(Idl::all());
        }
        let id = self.tree.lookup(dn)?;
        let ids = match prefix {
            Prefix::One => self.tree.one_level(id)?,
            Prefix::Subtree => {
                let mut ids = self.tree.subtree(id)?;
                ids.retain(|&x| x != id);
                ids
            }
        };
        Ok(Idl::from_ids(ids))
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod hier_test;
