use crate::DisposeError;
use crate::core::{FieldKey, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Anything that holds resources which can be released exactly once.
pub trait Disposable {
    fn is_disposed(&self) -> bool;

    /// Release held resources. Calling this on an already disposed value must be a no-op.
    fn dispose(&mut self) -> Result<(), DisposeError>;
}

/// Shared handle to a nested disposable stored in a field.
pub type DisposableRef = Rc<RefCell<dyn Disposable>>;

pub fn into_ref<D: Disposable + 'static>(d: D) -> DisposableRef {
    Rc::new(RefCell::new(d))
}

/// Field read/write access used by field disposal.
///
/// `own_field_keys` is what "dispose every field" visits when no resource set
/// was declared. Statically typed hosts return a fixed list here.
pub trait Fields {
    fn own_field_keys(&self) -> Vec<FieldKey>;

    fn field(&self, key: &FieldKey) -> Option<&Value>;

    /// Assigning a key the target does not have yet may create it.
    fn set_field(&mut self, key: &FieldKey, value: Value);
}

/// Per-instance disposed flag. Only a `Capability` can create or flip it.
#[derive(Debug)]
pub struct DisposableState {
    disposed: bool,
}

impl DisposableState {
    pub(crate) fn new() -> Self {
        DisposableState { disposed: false }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.disposed = true;
    }
}

/// A type that carries the disposal capability.
///
/// The host creates its state with `Capability::initialize` while it is
/// being constructed and hands it back through these accessors.
pub trait Host: Fields {
    fn disposable_state(&self) -> &DisposableState;

    fn disposable_state_mut(&mut self) -> &mut DisposableState;
}
