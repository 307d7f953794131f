mod common;
use common::*;

use clover_db::{DbError, Value};

#[test]
fn insert_then_find_by_id_round_trips() {
    let db = temp_db();
    create_collection(&db, "c");
    let id = db
        .insert_one("c", obj(&[("hello", Value::String("clover".into()))]))
        .unwrap();

    let parsed = uuid::Uuid::parse_str(&id).expect("id must be a UUID");
    assert_eq!(parsed.get_version(), Some(uuid::Version::Random));

    let found = db.find_by_id("c", &id).unwrap().unwrap();
    assert_eq!(
        found.as_object().unwrap().get("hello"),
        Some(&Value::String("clover".into()))
    );
}

#[test]
fn duplicate_id_insert_is_rejected() {
    let db = temp_db();
    create_collection(&db, "c");
    let id = db.insert_one("c", obj(&[])).unwrap();
    let with_explicit_id = obj(&[("_id", Value::String(id))]);
    let err = db.insert_one("c", with_explicit_id).unwrap_err();
    assert!(matches!(err, DbError::DuplicateKey(_, _)));
}
