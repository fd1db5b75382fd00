//! Conversion between [`Value`] and `serde_json::Value`.
//!
//! JSON has no absence sentinel and no opaque objects, so conversion out of
//! the value model is lossy in two places: record keys holding
//! [`Leaf::Absent`] are omitted, and `Absent` anywhere else becomes `null`.
//! Opaque leaves and non-finite floats are rejected.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Error as _, Serialize, Serializer};
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::{TypeError, TypeResult};
use crate::path::KeyPath;
use crate::record::Record;
use crate::value::{Leaf, Value};

impl Value {
    /// Convert a JSON document. Objects become records, arrays become lists,
    /// and numbers become `Int` when they fit in an `i64`.
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::null(),
            JsonValue::Bool(b) => Value::from(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::from(i),
                None => Value::from(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::from(s),
            JsonValue::Array(items) => Value::list(items.into_iter().map(Value::from_json)),
            JsonValue::Object(map) => Value::Record(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect::<Record>(),
            ),
        }
    }

    /// Convert to a JSON document.
    pub fn to_json(&self) -> TypeResult<JsonValue> {
        let mut path = KeyPath::root();
        to_json_at(self, &mut path)
    }
}

fn to_json_at(value: &Value, path: &mut KeyPath) -> TypeResult<JsonValue> {
    match value {
        Value::Record(record) => {
            let mut map = Map::with_capacity(record.len());
            for (key, child) in record {
                if child.is_absent() {
                    continue;
                }
                path.push(key.clone());
                let json = to_json_at(child, path)?;
                path.pop();
                map.insert(key.clone(), json);
            }
            Ok(JsonValue::Object(map))
        }
        Value::Leaf(leaf) => match leaf {
            Leaf::Absent | Leaf::Null => Ok(JsonValue::Null),
            Leaf::Bool(b) => Ok(JsonValue::Bool(*b)),
            Leaf::Int(n) => Ok(JsonValue::from(*n)),
            Leaf::Float(f) => Number::from_f64(*f)
                .map(JsonValue::Number)
                .ok_or_else(|| TypeError::NonFiniteFloat {
                    path: path.clone(),
                    value: *f,
                }),
            Leaf::String(s) => Ok(JsonValue::String(s.to_string())),
            Leaf::List(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path.push(index.to_string());
                    out.push(to_json_at(item, path)?);
                    path.pop();
                }
                Ok(JsonValue::Array(out))
            }
            Leaf::Opaque(_) => Err(TypeError::Unrepresentable { path: path.clone() }),
        },
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::from_json(json)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(Value::from_json)
    }
}
