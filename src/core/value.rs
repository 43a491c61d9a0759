use crate::core::FieldKey;
use crate::disposable::{Disposable, DisposableRef, Fields};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

/// Slot that full-field disposal never touches.
pub const CONSTRUCTOR_KEY: &str = "constructor";

#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Record),
    Disposable(DisposableRef),
}

impl Value {
    pub fn disposable<D: Disposable + 'static>(d: D) -> Value {
        Value::Disposable(Rc::new(RefCell::new(d)))
    }

    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Object(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut Record> {
        match self {
            Value::Object(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_disposable(&self) -> Option<&DisposableRef> {
        match self {
            Value::Disposable(d) => Some(d),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Disposable(_) => "disposable",
        }
    }
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(items) => f.debug_list().entries(items).finish(),
            Value::Object(record) => std::fmt::Debug::fmt(record, f),
            // A disposable being disposed right now is mutably borrowed.
            Value::Disposable(d) => match d.try_borrow() {
                Ok(inner) => write!(f, "[Disposable disposed={}]", inner.is_disposed()),
                Err(_) => write!(f, "[Disposable <in use>]"),
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Disposable(a), Value::Disposable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Object(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<DisposableRef> for Value {
    fn from(d: DisposableRef) -> Self {
        Value::Disposable(d)
    }
}

/// Insertion-ordered field store with per-key enumerability.
#[derive(Clone, Default, PartialEq)]
pub struct Record {
    properties: IndexMap<FieldKey, Value>,
    non_enumerable: HashSet<FieldKey>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: impl Into<FieldKey>) -> Option<&Value> {
        self.properties.get(&key.into())
    }

    pub fn get_mut(&mut self, key: impl Into<FieldKey>) -> Option<&mut Value> {
        self.properties.get_mut(&key.into())
    }

    pub fn set(&mut self, key: impl Into<FieldKey>, value: impl Into<Value>) {
        self.properties.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<FieldKey>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn contains_key(&self, key: impl Into<FieldKey>) -> bool {
        self.properties.contains_key(&key.into())
    }

    pub fn set_non_enumerable(&mut self, key: impl Into<FieldKey>) {
        self.non_enumerable.insert(key.into());
    }

    pub fn is_enumerable(&self, key: &FieldKey) -> bool {
        !self.non_enumerable.contains(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &Value)> {
        self.properties.iter()
    }

    /// Keys that full-field disposal visits, in insertion order.
    pub fn own_enumerable_keys(&self) -> Vec<FieldKey> {
        self.properties
            .keys()
            .filter(|k| self.is_enumerable(k) && k.as_name() != Some(CONSTRUCTOR_KEY))
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.properties.iter().map(|(k, v)| (k.to_string(), v))).finish()
    }
}

impl<K: Into<FieldKey>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.set(k, v);
        }
        record
    }
}

impl Fields for Record {
    fn own_field_keys(&self) -> Vec<FieldKey> {
        self.own_enumerable_keys()
    }

    fn field(&self, key: &FieldKey) -> Option<&Value> {
        self.properties.get(key)
    }

    fn set_field(&mut self, key: &FieldKey, value: Value) {
        self.properties.insert(key.clone(), value);
    }
}

fn array_index(key: &FieldKey) -> Option<usize> {
    key.as_name().and_then(|s| s.parse::<usize>().ok())
}

// Arrays expose their element indices as fields; scalars expose none.
// Assigning an index outside an array, or any key on a scalar, is a no-op,
// so a missing key is not created the way `Record` creates it.
impl Fields for Value {
    fn own_field_keys(&self) -> Vec<FieldKey> {
        match self {
            Value::Object(record) => record.own_enumerable_keys(),
            Value::Array(items) => (0..items.len()).map(|i| FieldKey::Name(i.to_string())).collect(),
            _ => Vec::new(),
        }
    }

    fn field(&self, key: &FieldKey) -> Option<&Value> {
        match self {
            Value::Object(record) => record.field(key),
            Value::Array(items) => array_index(key).and_then(|i| items.get(i)),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &FieldKey, value: Value) {
        match self {
            Value::Object(record) => record.set_field(key, value),
            // Unlike a record, an array never grows here: keys past the end are skipped.
            Value::Array(items) => match array_index(key).and_then(|i| items.get_mut(i)) {
                Some(slot) => *slot = value,
                None => log::trace!("set_field on array ignored: '{}' is not an existing index", key),
            },
            _ => log::trace!("set_field on {} ignored (key={})", self.type_name(), key),
        }
    }
}
