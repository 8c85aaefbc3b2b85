//! The shared public contract both DN-index variants implement.

pub mod flat;
pub mod hier;

use crate::{dn::Dn, types::Id};

/// What the index knows about one entry it's asked to add: its
/// normalized DN and assigned ID. The index itself only ever consumes
/// `ndn` and `id`.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub ndn: Dn,
    pub id: Id,
    /// Display-form RDN of this entry, used only by the hierarchical
    /// variant to reconstruct a display DN later. The flat variant
    /// ignores it; it stores nothing but normalized DNs.
    pub rdn: String,
}

/// The outcome of [DnIndex::lookup_matched]: either the exact DN was
/// found (`matched = None`), or the deepest existing ancestor was found
/// and `matched` names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    pub id: Id,
    pub matched: Option<Dn>,
}

/// Capability set implemented by both the flat and hierarchical DN
/// index variants. `Txn` is the caller-supplied transaction handle
/// threaded through every operation; mutation operations require a
/// writable one.
pub trait DnIndex<Txn> {
    /// Map `entry.ndn => entry.id`, linking `entry` under `pdn` (its
    /// parent's normalized DN, or `None` for a root/suffix entry).
    /// `Error::Exists` if `entry.ndn` is already mapped.
    fn add(&self, txn: &mut Txn, pdn: Option<&Dn>, entry: &NewEntry) -> crate::Result<()>;

    /// Remove the mapping for `dn => id`. `Error::NotFound` if absent.
    fn delete(&self, txn: &mut Txn, pdn: Option<&Dn>, dn: &Dn, id: Id) -> crate::Result<()>;

    /// Exact-match lookup. `Error::NotFound` if `dn` is unmapped.
    fn lookup(&self, txn: &Txn, dn: &Dn) -> crate::Result<Id>;

    /// Longest-prefix lookup: the deepest existing ancestor of `dn`, with
    /// the remainder of `dn` named in the result when `dn` itself isn't
    /// mapped.
    fn lookup_matched(&self, txn: &Txn, dn: &Dn) -> crate::Result<Matched>;

    /// `true` iff `dn` has at least one direct child.
    fn has_children(&self, txn: &Txn, dn: &Dn) -> crate::Result<bool>;

    /// Enumerate the one-level or full-subtree descendants of `dn`.
    /// Returns the `ALL` sentinel when `prefix = SUBTREE` and `dn` is
    /// the configured suffix.
    fn descendants(
        &self,
        txn: &Txn,
        dn: &Dn,
        prefix: crate::types::Prefix,
    ) -> crate::Result<crate::idl::Idl>;
}

#[cfg(test)]
#[path = "scenarios_test.rs"]
mod scenarios_test;
