use std::collections::BTreeMap;

use clover_db::{Database, Options, Value};
use clover_store::MemoryStore;

pub fn temp_db() -> Database<MemoryStore> {
    Database::open(MemoryStore::new(), Options::no_sweep())
}

// Each integration test file is compiled as its own crate over this shared
// module, so a helper unused by one file still trips `dead_code` there.
#[allow(dead_code)]
pub fn obj(pairs: &[(&str, Value)]) -> Value {
    let mut m = BTreeMap::new();
    for (k, v) in pairs {
        m.insert(k.to_string(), v.clone());
    }
    Value::Object(m)
}

pub fn create_collection(db: &Database<MemoryStore>, name: &str) {
    db.create_collection(name).unwrap();
}
