use crate::DisposeError;
use crate::core::{FieldKey, Value};
use crate::disposable::{DisposableRef, Fields};
use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    /// Addresses of values whose disposal is running on this thread. A value
    /// that is mutably borrowed and listed here is mid-disposal further up the
    /// stack; one that is borrowed but not listed is merely in use.
    static DISPOSING: RefCell<Vec<*const ()>> = const { RefCell::new(Vec::new()) };
}

/// Keeps `addr` registered as disposing until dropped.
pub(crate) struct DisposingGuard {
    addr: *const (),
}

impl DisposingGuard {
    pub(crate) fn enter(addr: *const ()) -> Self {
        DISPOSING.with(|d| d.borrow_mut().push(addr));
        DisposingGuard { addr }
    }
}

impl Drop for DisposingGuard {
    fn drop(&mut self) {
        DISPOSING.with(|d| {
            let mut d = d.borrow_mut();
            if let Some(pos) = d.iter().rposition(|a| *a == self.addr) {
                d.remove(pos);
            }
        });
    }
}

fn value_addr(d: &DisposableRef) -> *const () {
    d.as_ptr() as *const ()
}

fn is_disposing(addr: *const ()) -> bool {
    DISPOSING.with(|d| d.borrow().contains(&addr))
}

/// True for values that expose both the disposed-check and dispose operations.
pub fn is_capability_bearing(value: &Value) -> bool {
    matches!(value, Value::Disposable(_))
}

/// `null` and `undefined` count as disposed. Anything else that is not a
/// disposable reports `false`.
pub fn is_disposed_of(value: &Value) -> bool {
    match value {
        Value::Null | Value::Undefined => true,
        Value::Disposable(d) => is_disposed_ref(d),
        _ => false,
    }
}

/// A disposable that cannot be read because its own disposal is running
/// further up the stack already has its flag set. Any other outstanding
/// mutable borrow says nothing about its state, so it reads as not disposed.
pub fn is_disposed_ref(d: &DisposableRef) -> bool {
    match d.try_borrow() {
        Ok(inner) => inner.is_disposed(),
        Err(_) => is_disposing(value_addr(d)),
    }
}

/// Dispose a value whatever its shape.
///
/// Disposables are disposed unless they already are. Any other value is
/// treated as a plain container and all of its own enumerable fields are
/// released; there is no flag, a second pass simply finds every field null.
pub fn dispose_instance(value: &mut Value) -> Result<(), DisposeError> {
    if let Value::Disposable(d) = value {
        return dispose_nested(d);
    }
    let keys = value.own_field_keys();
    dispose_resources_of(value, &keys)
}

/// Release the listed fields of `target`, in order.
///
/// A field holding a disposable that is not yet disposed gets disposed first.
/// Every listed field is set to null afterwards, whatever it held and whether
/// or not its disposal failed. Failures are collected and returned once all
/// fields have been released.
pub fn dispose_resources_of<T: Fields + ?Sized>(target: &mut T, resources: &[FieldKey]) -> Result<(), DisposeError> {
    let mut completion_error: Option<DisposeError> = None;

    for key in resources {
        let nested = match target.field(key) {
            Some(Value::Disposable(d)) => Some(Rc::clone(d)),
            _ => None,
        };
        if let Some(d) = nested
            && let Err(e) = dispose_nested(&d)
        {
            log::warn!("disposing field '{}' failed: {}", key, e);
            let err = DisposeError::Resource {
                key: key.clone(),
                source: Box::new(e),
            };
            completion_error = Some(DisposeError::suppress(completion_error, err));
        }
        log::trace!("release field '{}'", key);
        target.set_field(key, Value::Null);
    }

    match completion_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn dispose_nested(d: &DisposableRef) -> Result<(), DisposeError> {
    let addr = value_addr(d);
    let Ok(mut inner) = d.try_borrow_mut() else {
        if is_disposing(addr) {
            log::trace!("skip nested disposable: disposal already in progress");
            return Ok(());
        }
        return Err(DisposeError::Custom("disposable is borrowed elsewhere".to_string()));
    };
    if inner.is_disposed() {
        return Ok(());
    }
    let _guard = DisposingGuard::enter(addr);
    inner.dispose()
}
