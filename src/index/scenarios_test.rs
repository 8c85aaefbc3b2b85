//! End-to-end coverage of the DN-index contract against both variants,
//! run over `MemStore` so no on-disk environment is needed.

use super::{flat::FlatIndex, hier::HierIndex, DnIndex, NewEntry};
use crate::{
    dn::Dn,
    store::MemStore,
    types::{Id, Prefix, ROOT_ID},
};

const SUFFIX: &str = "dc=example,dc=com";

fn entry(ndn: &str, id: Id) -> NewEntry {
    NewEntry {
        ndn: Dn::new(ndn),
        id,
        rdn: String::new(),
    }
}

/// Drives the same sequence of operations, and the same assertions,
/// against whichever `DnIndex` it's handed — so the flat and
/// hierarchical variants are proven equivalent on the contract they
/// both claim to implement.
fn run_scenarios<Txn>(idx: &dyn DnIndex<Txn>, txn: &mut Txn) {
    let suffix = Dn::new(SUFFIX);
    let people = Dn::new("ou=people,dc=example,dc=com");
    let alice = Dn::new("cn=alice,ou=people,dc=example,dc=com");
    let bob = Dn::new("cn=bob,ou=people,dc=example,dc=com");

    // Add/lookup.
    idx.add(txn, None, &entry(SUFFIX, ROOT_ID)).unwrap();
    idx.add(txn, Some(&suffix), &entry(people.as_str(), 2)).unwrap();
    assert_eq!(idx.lookup(txn, &people).unwrap(), 2);
    assert_eq!(idx.descendants(txn, &suffix, Prefix::One).unwrap().to_vec(), vec![2]);
    assert_eq!(idx.descendants(txn, &suffix, Prefix::Subtree).unwrap().len(), None);

    // Matched-DN.
    let m = idx.lookup_matched(txn, &alice).unwrap();
    assert_eq!(m.id, 2);
    assert_eq!(m.matched, Some(people.clone()));

    // Subtree enumeration.
    idx.add(txn, Some(&people), &entry(alice.as_str(), 3)).unwrap();
    idx.add(txn, Some(&people), &entry(bob.as_str(), 4)).unwrap();
    let mut one = idx.descendants(txn, &people, Prefix::One).unwrap().to_vec();
    one.sort_unstable();
    assert_eq!(one, vec![3, 4]);
    let mut sub = idx.descendants(txn, &people, Prefix::Subtree).unwrap().to_vec();
    sub.sort_unstable();
    assert_eq!(sub, vec![3, 4]);

    // Has_children.
    assert!(idx.has_children(txn, &people).unwrap());
    assert!(!idx.has_children(txn, &alice).unwrap());

    // Delete.
    idx.delete(txn, Some(&people), &alice, 3).unwrap();
    assert!(idx.lookup(txn, &alice).is_err());
    assert_eq!(idx.descendants(txn, &people, Prefix::One).unwrap().to_vec(), vec![4]);

    // Conflict.
    let err = idx.add(txn, Some(&people), &entry(bob.as_str(), 5)).unwrap_err();
    assert!(matches!(err, crate::Error::Exists(_, _)));
    assert_eq!(idx.lookup(txn, &bob).unwrap(), 4);
}

#[test]
fn test_flat_variant_end_to_end() {
    let store = MemStore::new();
    let mut txn = store.begin();
    let idx = FlatIndex::new(&store, Dn::new(SUFFIX));
    run_scenarios(&idx, &mut txn);
}

#[test]
fn test_hierarchical_variant_end_to_end() {
    let store = MemStore::new();
    let txn0 = store.begin();
    let idx = HierIndex::open(&store, &txn0, Dn::new(SUFFIX)).unwrap();
    let mut txn = store.begin();
    run_scenarios(&idx, &mut txn);
}

#[test]
fn test_empty_dn_lookup_matched_is_not_found() {
    let store = MemStore::new();
    let mut txn = store.begin();
    let idx = FlatIndex::new(&store, Dn::new(SUFFIX));
    idx.add(&mut txn, None, &entry(SUFFIX, ROOT_ID)).unwrap();

    let err = idx.lookup_matched(&txn, &Dn::new("")).unwrap_err();
    assert!(matches!(err, crate::Error::NotFound(_, _)));
}
