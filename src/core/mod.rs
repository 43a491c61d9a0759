mod field_key;
mod value;

pub use field_key::{FieldKey, Symbol, SymbolData};
pub use value::{CONSTRUCTOR_KEY, Record, Value};
