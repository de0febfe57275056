//! Zero-value merge: which fields of a partial record a patch writes.

use crate::error::StoreError;
use crate::schema::Record;
use serde::Serialize;
use serde_json::{Map, Value};

pub fn to_object<T: Serialize>(value: &T) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Encode(serde::ser::Error::custom(format!(
            "record must serialize to an object, got {}",
            other
        )))),
    }
}

/// Column values of `partial` that differ from the record's zero value.
///
/// Fields left at their zero value (as given by `R::default()`), nulls, fields
/// that are not columns of the table, and `excluded` fields are dropped. A
/// field deliberately set to its zero value is therefore indistinguishable
/// from an absent one.
pub fn changeset<R: Record>(partial: &R, excluded: &[&str]) -> Result<Map<String, Value>, StoreError> {
    let table = R::table();
    let zero = to_object(&R::default())?;
    let mut out = Map::new();
    for (name, value) in to_object(partial)? {
        if excluded.contains(&name.as_str()) || table.column(&name).is_none() {
            continue;
        }
        if value.is_null() || zero.get(&name) == Some(&value) {
            continue;
        }
        out.insert(name, value);
    }
    Ok(out)
}
