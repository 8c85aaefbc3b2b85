//! The in-memory tree a [super::HierIndex] reconstructs from the
//! id→diskNode KV relation.
//!
//! Locking discipline: `tree_lock` guards the slot arena, the `by_id`
//! index and `root`; each node's own `kids` are guarded by that node's
//! `kids_lock`, acquired parent-before-child.

use std::{
    collections::HashMap,
    sync::RwLock,
};

use log::warn;

use crate::{
    dn::{self, Dn},
    err_at,
    index::hier::node::{DiskNode, IdNode},
    store::{Cursor, Store},
    types::{Id, ROOT_ID},
    Result,
};

struct Inner {
    slots: Vec<Option<IdNode>>,
    by_id: HashMap<Id, usize>,
    root: Option<usize>,
}

impl Inner {
    fn slot(&self, idx: usize) -> &IdNode {
        self.slots[idx].as_ref().expect("dangling arena slot")
    }
}

/// The hierarchical tree cache. One instance per backend suffix;
/// multiple suffixes under one backend each get their own `Tree`.
pub struct Tree {
    inner: RwLock<Inner>,
    pub suffix: Dn,
    pub sufflen: usize,
    pub nsufflen: usize,
    pub nrdns: usize,
}

impl Tree {
    /// An empty tree for `suffix`, before any rows exist.
    pub fn new(suffix: Dn) -> Tree {
        let nrdns = dn::rdn_count(&suffix);
        let sufflen = suffix.as_str().len();
        Tree {
            inner: RwLock::new(Inner {
                slots: Vec::new(),
                by_id: HashMap::new(),
                root: None,
            }),
            nsufflen: sufflen,
            sufflen,
            nrdns,
            suffix,
        }
    }

    /// Build the tree at startup by cursoring the entire id→diskNode
    /// table in natural order (first pass), then linking each node to
    /// its parent's `kids` (second pass). A single pass cannot guarantee
    /// a parent row is visited before its children under natural
    /// ID-cursor order, so two passes are required, not an optimization.
    pub fn build<S: Store>(store: &S, txn: &S::Txn, suffix: Dn) -> Result<Tree> {
        let tree = Tree::new(suffix);
        let mut inner = tree.inner.write().expect("tree_lock poisoned");

        let mut cur = err_at!(Storage, store.open_cursor(txn))?;
        while let Some((key, value)) = cur.next()? {
            if key.len() != 4 {
                return err_at!(Corrupt, msg: "id2parent key has wrong width: {} bytes", key.len());
            }
            let id = Id::from_be_bytes([key[0], key[1], key[2], key[3]]);
            let disk = DiskNode::decode(&value)?;
            let idx = inner.slots.len();
            inner.slots.push(Some(IdNode::new(id, None, disk)));
            inner.by_id.insert(id, idx);
            if id == ROOT_ID {
                inner.root = Some(idx);
            }
        }

        let ids: Vec<Id> = inner.by_id.keys().copied().collect();
        for id in ids {
            let idx = inner.by_id[&id];
            let parent_id = inner.slot(idx).disk.parent;
            if parent_id == 0 {
                continue;
            }
            let parent_idx = match inner.by_id.get(&parent_id) {
                Some(idx) => *idx,
                None => {
                    return err_at!(
                        Corrupt,
                        msg: "id {} names parent {} which does not exist",
                        id,
                        parent_id
                    )
                }
            };
            inner.slots[idx].as_mut().expect("dangling arena slot").parent = Some(parent_idx);
            insert_kid_sorted(&inner, parent_idx, idx);
        }

        drop(inner);
        Ok(tree)
    }

    /// Insert a freshly-added node into the arena (structural mutation:
    /// `tree_lock` write), then — if it has a parent — link it into the
    /// parent's `kids` under a `tree_lock` read + `parent.kids_lock`
    /// write.
    pub fn add_node(&self, id: Id, disk: DiskNode) -> Result<()> {
        let parent_id = disk.parent;

        {
            let mut inner = self.inner.write().expect("tree_lock poisoned");
            let idx = inner.slots.len();
            inner.slots.push(Some(IdNode::new(id, None, disk)));
            inner.by_id.insert(id, idx);
            if id == ROOT_ID {
                inner.root = Some(idx);
            }
        }

        if parent_id != 0 {
            let inner = self.inner.read().expect("tree_lock poisoned");
            let idx = inner.by_id[&id];
            let parent_idx = match inner.by_id.get(&parent_id) {
                Some(idx) => *idx,
                None => return err_at!(Corrupt, msg: "parent {} does not exist", parent_id),
            };
            // Slots never shrink or move once pushed, so holding a
            // tree_lock read is enough to dereference both indices
            // while we take the parent's kids_lock.
            insert_kid_sorted(&inner, parent_idx, idx);
        }
        Ok(())
    }

    /// Remove `id`'s row from the arena and, if it had a parent, from
    /// that parent's `kids` — all under a single `tree_lock` write, so a
    /// concurrent reader never observes the node detached from its
    /// parent but still present in the arena, or vice versa.
    pub fn delete_node(&self, id: Id) -> Result<()> {
        let mut inner = self.inner.write().expect("tree_lock poisoned");
        let idx = match inner.by_id.remove(&id) {
            Some(idx) => idx,
            None => return err_at!(NotFound, msg: "id {} not present in tree", id),
        };
        let parent_idx = inner.slot(idx).parent;
        let nrdn = inner.slot(idx).disk.nrdn.clone();
        if let Some(parent_idx) = parent_idx {
            let mut kids = inner.slots[parent_idx]
                .as_ref()
                .expect("dangling arena slot")
                .kids
                .write()
                .expect("kids_lock poisoned");
            kids.retain(|&kid_idx| kid_idx != idx);
        }
        inner.slots[idx] = None;
        if inner.root == Some(idx) {
            inner.root = None;
        }
        Ok(())
    }

    /// Walk from `root` downward, consuming `dn`'s RDNs innermost-first.
    /// Returns the id of the deepest node actually reached and how many
    /// RDNs were consumed.
    fn walk(&self, dn: &Dn) -> Result<(Id, usize, usize)> {
        let inner = self.inner.read().expect("tree_lock poisoned");
        let root_idx = match inner.root {
            Some(idx) => idx,
            None => return err_at!(NotFound, msg: "tree has no root"),
        };

        if dn::is_suffix(&self.suffix, dn) {
            return Ok((inner.slot(root_idx).id, 0, 0));
        }

        let total = dn::rdn_count(dn);
        if total < self.nrdns {
            return err_at!(NotFound, msg: "dn {} is shorter than the configured suffix", dn);
        }
        let depth = total - self.nrdns;
        let rdns = dn::explode_dn(dn);

        let mut cur_idx = root_idx;
        let mut consumed = 0usize;
        // rdns[depth-1] is the immediate child of the suffix; walk from
        // there down to rdns[0] (the leaf).
        for i in (0..depth).rev() {
            let nrdn = &rdns[i];
            let kid_idx = {
                let kids = inner.slot(cur_idx).kids.read().expect("kids_lock poisoned");
                find_kid(&inner, &kids, nrdn)
            };
            match kid_idx {
                Some(idx) => {
                    cur_idx = idx;
                    consumed += 1;
                }
                None => break,
            }
        }

        Ok((inner.slot(cur_idx).id, consumed, depth))
    }

    /// Exact-match lookup.
    pub fn lookup(&self, dn: &Dn) -> Result<Id> {
        let (id, consumed, depth) = self.walk(dn)?;
        if consumed == depth {
            Ok(id)
        } else {
            err_at!(NotFound, msg: "dn {} not mapped", dn)
        }
    }

    /// Longest-prefix lookup: on a partial walk, the matched DN is built
    /// from the RDNs actually consumed, nearest-suffix end first.
    pub fn lookup_matched(&self, dn: &Dn) -> Result<crate::index::Matched> {
        let (id, consumed, depth) = self.walk(dn)?;
        if consumed == depth {
            return Ok(crate::index::Matched { id, matched: None });
        }
        // `rdns` explodes the full requested dn, so its tail already
        // carries the suffix's own RDNs; the matched DN is simply the
        // suffix-ward slice starting at the deepest node we reached —
        // no separate suffix append needed (mirrors bdb_dn2id_matched,
        // which slices `in`'s own rdns array rather than rebuilding a
        // DN from scratch).
        let rdns = dn::explode_dn(dn);
        let matched_dn = Dn::new(rdns[depth - consumed..].join(","));
        Ok(crate::index::Matched {
            id,
            matched: Some(matched_dn),
        })
    }

    /// `true` iff the node named by `id` has at least one child.
    pub fn has_children(&self, id: Id) -> Result<bool> {
        let inner = self.inner.read().expect("tree_lock poisoned");
        let idx = match inner.by_id.get(&id) {
            Some(idx) => *idx,
            None => return err_at!(NotFound, msg: "id {} not present", id),
        };
        let kids = inner.slot(idx).kids.read().expect("kids_lock poisoned");
        Ok(!kids.is_empty())
    }

    /// Direct children of `id`, in `nrdn` order.
    pub fn one_level(&self, id: Id) -> Result<Vec<Id>> {
        let inner = self.inner.read().expect("tree_lock poisoned");
        let idx = match inner.by_id.get(&id) {
            Some(idx) => *idx,
            None => return err_at!(NotFound, msg: "id {} not present", id),
        };
        let kids = inner.slot(idx).kids.read().expect("kids_lock poisoned");
        Ok(kids.iter().map(|&kid_idx| inner.slot(kid_idx).id).collect())
    }

    /// Every descendant of `id`, depth-first, each node's own
    /// `kids_lock` acquired only while it is the current frame.
    pub fn subtree(&self, id: Id) -> Result<Vec<Id>> {
        let inner = self.inner.read().expect("tree_lock poisoned");
        let idx = match inner.by_id.get(&id) {
            Some(idx) => *idx,
            None => return err_at!(NotFound, msg: "id {} not present", id),
        };
        let mut out = Vec::new();
        collect_subtree(&inner, idx, &mut out);
        Ok(out)
    }

    /// Reconstruct the full display DN and normalized DN of `id` by
    /// walking `parent` links and appending the configured suffix.
    pub fn reconstruct_dn(&self, id: Id) -> Result<(Dn, Dn)> {
        let inner = self.inner.read().expect("tree_lock poisoned");
        let mut idx = match inner.by_id.get(&id) {
            Some(idx) => *idx,
            None => return err_at!(NotFound, msg: "id {} not present", id),
        };

        let mut rdns = Vec::new();
        let mut nrdns = Vec::new();
        loop {
            let node = inner.slot(idx);
            if !node.disk.rdn.is_empty() {
                rdns.push(node.disk.rdn.clone());
            }
            if !node.disk.nrdn.is_empty() {
                nrdns.push(node.disk.nrdn.clone());
            }
            match node.parent {
                Some(p) => idx = p,
                None => break,
            }
        }

        let dn = dn::join_with_suffix(&rdns, &self.suffix);
        let ndn = dn::join_with_suffix(&nrdns, &self.suffix);
        Ok((dn, ndn))
    }
}

fn find_kid(inner: &Inner, kids: &[usize], nrdn: &str) -> Option<usize> {
    kids.binary_search_by(|&idx| inner.slot(idx).disk.nrdn.as_str().cmp(nrdn))
        .ok()
        .map(|pos| kids[pos])
}

/// Insert `child_idx` into `parent_idx`'s `kids`, keeping the list
/// sorted by `nrdn` so sibling lookups can binary-search instead of
/// scanning.
fn insert_kid_sorted(inner: &Inner, parent_idx: usize, child_idx: usize) {
    let child_nrdn = inner.slot(child_idx).disk.nrdn.clone();
    let parent = inner.slot(parent_idx);
    let mut kids = parent.kids.write().expect("kids_lock poisoned");
    if kids.iter().any(|&k| k == child_idx) {
        warn!("insert_kid_sorted: child already present under parent");
        return;
    }
    let pos = kids.partition_point(|&idx| inner.slot(idx).disk.nrdn.as_str() < child_nrdn.as_str());
    kids.insert(pos, child_idx);
}

fn collect_subtree(inner: &Inner, idx: usize, out: &mut Vec<Id>) {
    out.push(inner.slot(idx).id);
    let kids = inner.slot(idx).kids.read().expect("kids_lock poisoned");
    for &kid_idx in kids.iter() {
        collect_subtree(inner, kid_idx, out);
    }
}

#[cfg(test)]
#[path = "tree_test.rs"]
mod tree_test;
