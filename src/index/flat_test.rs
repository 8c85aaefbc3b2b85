use super::*;
use crate::store::MemStore;

fn setup() -> (MemStore, Dn) {
    (MemStore::new(), Dn::new("dc=example,dc=com"))
}

fn entry(ndn: &str, id: Id) -> NewEntry {
    NewEntry {
        ndn: Dn::new(ndn),
        id,
        rdn: String::new(),
    }
}

#[test]
fn test_add_lookup_suffix() {
    let (store, suffix) = setup();
    let idx = FlatIndex::new(&store, suffix.clone());
    let mut txn = store.begin();

    add_suffix(&idx, &mut txn, ROOT_ID).unwrap();
    assert_eq!(idx.lookup(&txn, &suffix).unwrap(), ROOT_ID);
    assert_eq!(
        idx.descendants(&txn, &suffix, Prefix::Subtree).unwrap().len(),
        None // ALL sentinel regardless of population
    );
}

#[test]
fn test_scenario_add_lookup_children() {
    let (store, suffix) = setup();
    let idx = FlatIndex::new(&store, suffix.clone());
    let mut txn = store.begin();

    add_suffix(&idx, &mut txn, 1).unwrap();
    idx.add(
        &mut txn,
        Some(&suffix),
        &entry("ou=people,dc=example,dc=com", 2),
    )
    .unwrap();

    assert_eq!(
        idx.lookup(&txn, &Dn::new("ou=people,dc=example,dc=com")).unwrap(),
        2
    );
    let one = idx.descendants(&txn, &suffix, Prefix::One).unwrap();
    assert_eq!(one.to_vec(), vec![2]);
}

#[test]
fn test_scenario_matched_dn() {
    let (store, suffix) = setup();
    let idx = FlatIndex::new(&store, suffix.clone());
    let mut txn = store.begin();

    add_suffix(&idx, &mut txn, 1).unwrap();
    idx.add(
        &mut txn,
        Some(&suffix),
        &entry("ou=people,dc=example,dc=com", 2),
    )
    .unwrap();

    let m = idx
        .lookup_matched(&txn, &Dn::new("cn=alice,ou=people,dc=example,dc=com"))
        .unwrap();
    assert_eq!(m.id, 2);
    assert_eq!(m.matched, Some(Dn::new("ou=people,dc=example,dc=com")));
}

#[test]
fn test_scenario_subtree_and_onelevel() {
    let (store, suffix) = setup();
    let idx = FlatIndex::new(&store, suffix.clone());
    let mut txn = store.begin();
    let people = Dn::new("ou=people,dc=example,dc=com");

    add_suffix(&idx, &mut txn, 1).unwrap();
    idx.add(&mut txn, Some(&suffix), &entry("ou=people,dc=example,dc=com", 2))
        .unwrap();
    idx.add(&mut txn, Some(&people), &entry("cn=alice,ou=people,dc=example,dc=com", 3))
        .unwrap();
    idx.add(&mut txn, Some(&people), &entry("cn=bob,ou=people,dc=example,dc=com", 4))
        .unwrap();

    let mut one = idx.descendants(&txn, &people, Prefix::One).unwrap().to_vec();
    one.sort_unstable();
    assert_eq!(one, vec![3, 4]);

    let mut sub = idx.descendants(&txn, &people, Prefix::Subtree).unwrap().to_vec();
    sub.sort_unstable();
    assert_eq!(sub, vec![3, 4]);
}

#[test]
fn test_scenario_has_children() {
    let (store, suffix) = setup();
    let idx = FlatIndex::new(&store, suffix.clone());
    let mut txn = store.begin();
    let people = Dn::new("ou=people,dc=example,dc=com");

    add_suffix(&idx, &mut txn, 1).unwrap();
    idx.add(&mut txn, Some(&suffix), &entry("ou=people,dc=example,dc=com", 2))
        .unwrap();
    idx.add(&mut txn, Some(&people), &entry("cn=alice,ou=people,dc=example,dc=com", 3))
        .unwrap();

    assert!(idx.has_children(&txn, &people).unwrap());
    assert!(!idx
        .has_children(&txn, &Dn::new("cn=alice,ou=people,dc=example,dc=com"))
        .unwrap());
}

#[test]
fn test_scenario_delete() {
    let (store, suffix) = setup();
    let idx = FlatIndex::new(&store, suffix.clone());
    let mut txn = store.begin();
    let people = Dn::new("ou=people,dc=example,dc=com");
    let alice = Dn::new("cn=alice,ou=people,dc=example,dc=com");

    add_suffix(&idx, &mut txn, 1).unwrap();
    idx.add(&mut txn, Some(&suffix), &entry("ou=people,dc=example,dc=com", 2))
        .unwrap();
    idx.add(&mut txn, Some(&people), &entry("cn=alice,ou=people,dc=example,dc=com", 3))
        .unwrap();
    idx.add(&mut txn, Some(&people), &entry("cn=bob,ou=people,dc=example,dc=com", 4))
        .unwrap();

    idx.delete(&mut txn, Some(&people), &alice, 3).unwrap();
    assert!(idx.lookup(&txn, &alice).is_err());
    assert_eq!(idx.descendants(&txn, &people, Prefix::One).unwrap().to_vec(), vec![4]);
}

#[test]
fn test_scenario_add_conflict_leaves_index_unchanged() {
    let (store, suffix) = setup();
    let idx = FlatIndex::new(&store, suffix.clone());
    let mut txn = store.begin();
    let people = Dn::new("ou=people,dc=example,dc=com");
    let bob = Dn::new("cn=bob,ou=people,dc=example,dc=com");

    add_suffix(&idx, &mut txn, 1).unwrap();
    idx.add(&mut txn, Some(&suffix), &entry("ou=people,dc=example,dc=com", 2))
        .unwrap();
    idx.add(&mut txn, Some(&people), &entry("cn=bob,ou=people,dc=example,dc=com", 4))
        .unwrap();

    let err = idx
        .add(&mut txn, Some(&people), &entry("cn=bob,ou=people,dc=example,dc=com", 5))
        .unwrap_err();
    assert!(matches!(err, crate::Error::Exists(_, _)));
    assert_eq!(idx.lookup(&txn, &bob).unwrap(), 4);
}

#[test]
fn test_add_rejects_noid() {
    let (store, suffix) = setup();
    let idx = FlatIndex::new(&store, suffix);
    let mut txn = store.begin();
    let err = idx
        .add(&mut txn, None, &entry("dc=example,dc=com", NOID))
        .unwrap_err();
    assert!(matches!(err, crate::Error::Invalid(_, _)));
}

#[test]
fn test_lookup_matched_on_empty_dn() {
    let (store, suffix) = setup();
    let idx = FlatIndex::new(&store, suffix);
    let txn = store.begin();
    let err = idx.lookup_matched(&txn, &Dn::new("")).unwrap_err();
    assert!(matches!(err, crate::Error::NotFound(_, _)));
}
