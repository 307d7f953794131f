mod common;
use common::*;

use std::collections::BTreeMap;

use clover_db::{field, Query, SortOption, Value};

/// A deterministic, valid UUIDv4 derived from `i` — so two independently
/// seeded databases can be compared doc-for-doc by id.
fn fake_id(i: u32) -> String {
    let mut bytes = [0u8; 16];
    bytes[12..16].copy_from_slice(&i.to_be_bytes());
    uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
}

fn seed_200_todos(db: &clover_db::Database<clover_store::MemoryStore>) {
    create_collection(db, "todos");
    let mut docs = Vec::with_capacity(200);
    for i in 0..200 {
        let user_id = (i % 10) + 1;
        let mut m = BTreeMap::new();
        m.insert("_id".to_string(), Value::String(fake_id(i)));
        m.insert("seq".to_string(), Value::Number(i as f64));
        m.insert("userId".to_string(), Value::Number(user_id as f64));
        docs.push(Value::Object(m));
    }
    db.insert("todos", docs).unwrap();
}

fn ids_and_user_ids(docs: &[Value]) -> Vec<(String, f64)> {
    docs.iter()
        .map(|d| {
            let o = d.as_object().unwrap();
            let id = o.get("_id").unwrap().as_str().unwrap().to_string();
            let uid = match o.get("userId").unwrap() {
                Value::Number(n) => *n,
                _ => panic!("userId must be a number"),
            };
            (id, uid)
        })
        .collect()
}

#[test]
fn range_query_returns_identical_sets_with_and_without_index() {
    let without_index = temp_db();
    seed_200_todos(&without_index);
    let q = Query::new("todos").where_(field("userId").gt(5.0).and(field("userId").le(10.0)));
    let mut plain = ids_and_user_ids(&without_index.find_all(&q).unwrap());
    plain.sort_by(|a, b| a.0.cmp(&b.0));

    let with_index = temp_db();
    seed_200_todos(&with_index);
    with_index.create_index("todos", "userId").unwrap();
    let mut indexed = ids_and_user_ids(&with_index.find_all(&q).unwrap());
    indexed.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(plain, indexed);
    assert!(plain.iter().all(|(_, uid)| *uid > 5.0 && *uid <= 10.0));
}

#[test]
fn sort_by_indexed_field_agrees_with_and_without_the_index_including_ties() {
    let without_index = temp_db();
    seed_200_todos(&without_index);
    let q = Query::new("todos").sort(vec![SortOption::desc("userId")]);
    let plain = ids_and_user_ids(&without_index.find_all(&q).unwrap());

    let with_index = temp_db();
    seed_200_todos(&with_index);
    with_index.create_index("todos", "userId").unwrap();
    let indexed = ids_and_user_ids(&with_index.find_all(&q).unwrap());

    // Same order entirely, including which doc-id comes first within a
    // group of 20 documents sharing one userId (invariant: index faithfulness).
    assert_eq!(plain, indexed);

    let user_ids: Vec<f64> = plain.iter().map(|(_, u)| *u).collect();
    let mut sorted_desc = user_ids.clone();
    sorted_desc.sort_by(|a, b| b.partial_cmp(a).unwrap());
    assert_eq!(user_ids, sorted_desc);
}

#[test]
fn create_drop_recreate_index_does_not_change_query_results() {
    let db = temp_db();
    seed_200_todos(&db);
    let q = Query::new("todos").where_(field("userId").gt(5.0).and(field("userId").le(10.0)));

    let mut before = ids_and_user_ids(&db.find_all(&q).unwrap());
    before.sort_by(|a, b| a.0.cmp(&b.0));

    db.create_index("todos", "userId").unwrap();
    db.drop_index("todos", "userId").unwrap();
    db.create_index("todos", "userId").unwrap();

    let mut after = ids_and_user_ids(&db.find_all(&q).unwrap());
    after.sort_by(|a, b| a.0.cmp(&b.0));

    assert_eq!(before, after);
}
