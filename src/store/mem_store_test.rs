use super::*;

#[test]
fn test_put_get_del() {
    let store = MemStore::new();
    let mut txn = store.begin();

    store.put(&mut txn, b"k1", b"v1", PutFlags::NONE).unwrap();
    assert_eq!(store.get(&txn, b"k1").unwrap(), b"v1".to_vec());

    store.del(&mut txn, b"k1").unwrap();
    assert!(store.get(&txn, b"k1").is_err());
}

#[test]
fn test_no_overwrite() {
    let store = MemStore::new();
    let mut txn = store.begin();

    store.put(&mut txn, b"k1", b"v1", PutFlags::NO_OVERWRITE).unwrap();
    let err = store
        .put(&mut txn, b"k1", b"v2", PutFlags::NO_OVERWRITE)
        .unwrap_err();
    assert!(matches!(err, crate::Error::Exists(_, _)));
}

#[test]
fn test_has_key() {
    let store = MemStore::new();
    let mut txn = store.begin();
    assert!(!store.has_key(&txn, b"k1").unwrap());
    store.put(&mut txn, b"k1", b"v1", PutFlags::NONE).unwrap();
    assert!(store.has_key(&txn, b"k1").unwrap());
}

#[test]
fn test_cursor_sees_all_rows() {
    let store = MemStore::new();
    let mut txn = store.begin();
    store.put(&mut txn, b"a", b"1", PutFlags::NONE).unwrap();
    store.put(&mut txn, b"b", b"2", PutFlags::NONE).unwrap();

    let mut cur = store.open_cursor(&txn).unwrap();
    let mut rows = Vec::new();
    while let Some(row) = cur.next().unwrap() {
        rows.push(row);
    }
    assert_eq!(rows.len(), 2);
}
