use crate::DisposeError;
use crate::core::{FieldKey, Record, Value};
use crate::engine::is_disposed_ref;

impl From<serde_json::Value> for Value {
    fn from(json_value: serde_json::Value) -> Self {
        match json_value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) => Value::Number(f),
                None => Value::Undefined,
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

impl Record {
    pub fn from_json(json_value: serde_json::Value) -> Result<Record, DisposeError> {
        match Value::from(json_value) {
            Value::Object(record) => Ok(record),
            other => Err(DisposeError::Custom(format!("expected a JSON object, got {}", other.type_name()))),
        }
    }
}

impl Value {
    /// Snapshot for inspection. Symbol-keyed and non-enumerable fields are
    /// skipped; a disposable shows only its disposed flag.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(record) => {
                let mut map = serde_json::Map::new();
                for (key, value) in record.iter() {
                    if let FieldKey::Name(name) = key
                        && record.is_enumerable(key)
                    {
                        map.insert(name.clone(), value.to_json());
                    }
                }
                serde_json::Value::Object(map)
            }
            Value::Disposable(d) => serde_json::json!({ "disposed": is_disposed_ref(d) }),
        }
    }
}
