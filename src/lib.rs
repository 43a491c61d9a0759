pub(crate) mod capability;
pub(crate) mod core;
pub(crate) mod disposable;
pub mod engine;
pub(crate) mod error;
pub(crate) mod json;

pub use capability::{Capability, DisposableObject, FinalizeHook};
pub use crate::core::{CONSTRUCTOR_KEY, FieldKey, Record, Symbol, SymbolData, Value};
pub use disposable::{Disposable, DisposableRef, DisposableState, Fields, Host, into_ref};
pub use engine::{dispose_instance, dispose_resources_of, is_capability_bearing, is_disposed_of, is_disposed_ref};
pub use error::DisposeError;
