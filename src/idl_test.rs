use super::*;
use crate::store::MemStore;

#[test]
fn test_insert_fetch_delete() {
    let store = MemStore::new();
    let mut txn = store.begin();

    insert_key(&store, &mut txn, b"k", 3).unwrap();
    insert_key(&store, &mut txn, b"k", 4).unwrap();
    insert_key(&store, &mut txn, b"k", 3).unwrap(); // idempotent

    let idl = fetch_key(&store, &txn, b"k").unwrap();
    let mut ids = idl.to_vec();
    ids.sort_unstable();
    assert_eq!(ids, vec![3, 4]);

    delete_key(&store, &mut txn, b"k", 3).unwrap();
    let idl = fetch_key(&store, &txn, b"k").unwrap();
    assert_eq!(idl.to_vec(), vec![4]);
}

#[test]
fn test_delete_absent_member_is_corrupt() {
    let store = MemStore::new();
    let mut txn = store.begin();
    insert_key(&store, &mut txn, b"k", 4).unwrap();

    let err = delete_key(&store, &mut txn, b"k", 99).unwrap_err();
    assert!(matches!(err, crate::Error::Corrupt(_, _)));
}

#[test]
fn test_fetch_missing_key_is_empty() {
    let store = MemStore::new();
    let txn = store.begin();
    let idl = fetch_key(&store, &txn, b"missing").unwrap();
    assert!(idl.is_empty());
}

#[test]
fn test_all_sentinel() {
    let idl = Idl::all();
    assert!(idl.contains(1));
    assert!(idl.contains(u32::MAX));
    assert_eq!(idl.len(), None);
}

#[test]
fn test_delete_last_member_removes_row() {
    let store = MemStore::new();
    let mut txn = store.begin();
    insert_key(&store, &mut txn, b"k", 7).unwrap();
    delete_key(&store, &mut txn, b"k", 7).unwrap();
    assert!(!store.has_key(&txn, b"k").unwrap());
}
