use crate::DisposeError;
use crate::core::{FieldKey, Record, Value};
use crate::disposable::{Disposable, DisposableRef, DisposableState, Fields, Host};
use crate::engine::{DisposingGuard, dispose_resources_of};
use std::rc::Rc;

/// Pre-disposal callback, handed the host before any field is released.
pub type FinalizeHook<H> = Rc<dyn Fn(&mut H) -> Result<(), DisposeError>>;

/// Disposal configuration shared by every instance of a host type.
pub struct Capability<H> {
    resources: Vec<FieldKey>,
    finalize: Option<FinalizeHook<H>>,
}

impl<H: Host> Capability<H> {
    /// No resource set and no hook: every own enumerable field is released.
    pub fn new() -> Self {
        Capability {
            resources: Vec::new(),
            finalize: None,
        }
    }

    /// Keys are not validated; they need not exist on the host yet.
    pub fn attach<K, I>(resources: I, finalize: Option<FinalizeHook<H>>) -> Self
    where
        K: Into<FieldKey>,
        I: IntoIterator<Item = K>,
    {
        Capability {
            resources: resources.into_iter().map(Into::into).collect(),
            finalize,
        }
    }

    pub fn with_resources<K, I>(mut self, resources: I) -> Self
    where
        K: Into<FieldKey>,
        I: IntoIterator<Item = K>,
    {
        self.resources = resources.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_finalize<F>(mut self, finalize: F) -> Self
    where
        F: Fn(&mut H) -> Result<(), DisposeError> + 'static,
    {
        self.finalize = Some(Rc::new(finalize));
        self
    }

    pub fn resources(&self) -> &[FieldKey] {
        &self.resources
    }

    pub fn has_finalize(&self) -> bool {
        self.finalize.is_some()
    }

    /// Per-instance initializer; run once while constructing the host.
    pub fn initialize(&self) -> DisposableState {
        DisposableState::new()
    }

    pub fn is_disposed(&self, host: &H) -> bool {
        host.disposable_state().is_disposed()
    }

    /// The declared resource set, or the host's own enumerable keys right now.
    pub fn resolve_resources(&self, host: &H) -> Vec<FieldKey> {
        if self.resources.is_empty() {
            host.own_field_keys()
        } else {
            self.resources.clone()
        }
    }

    /// Release the host's resources once.
    ///
    /// The flag is set before the hook and the cascade run, so a nested value
    /// that reaches back into this host sees it as disposed. Failures from the
    /// hook or from nested disposals do not stop the remaining fields from being
    /// released; they are reported together once every field is null.
    pub fn dispose(&self, host: &mut H) -> Result<(), DisposeError> {
        if host.disposable_state().is_disposed() {
            log::trace!("dispose: already disposed, nothing to do");
            return Ok(());
        }
        host.disposable_state_mut().mark_disposed();
        let _guard = DisposingGuard::enter(&*host as *const H as *const ());

        let mut completion_error: Option<DisposeError> = None;

        if let Some(finalize) = &self.finalize
            && let Err(e) = finalize(&mut *host)
        {
            log::warn!("finalize hook failed: {}", e);
            completion_error = Some(e);
        }

        let resources = self.resolve_resources(host);
        log::debug!("dispose: releasing {} field(s)", resources.len());
        if let Err(e) = dispose_resources_of(host, &resources) {
            completion_error = Some(DisposeError::suppress(completion_error, e));
        }

        match completion_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl<H: Host> Default for Capability<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> std::fmt::Debug for Capability<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capability")
            .field("resources", &self.resources)
            .field("finalize", &self.finalize.is_some())
            .finish()
    }
}

/// Dynamic host: an ordered record of fields plus the disposal capability.
#[derive(Debug)]
pub struct DisposableObject {
    fields: Record,
    state: DisposableState,
    capability: Rc<Capability<DisposableObject>>,
}

impl DisposableObject {
    pub fn new(capability: &Rc<Capability<DisposableObject>>) -> Self {
        Self::with_fields(capability, Record::new())
    }

    pub fn with_fields(capability: &Rc<Capability<DisposableObject>>, fields: Record) -> Self {
        DisposableObject {
            fields,
            state: capability.initialize(),
            capability: Rc::clone(capability),
        }
    }

    pub fn get(&self, key: impl Into<FieldKey>) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<FieldKey>, value: impl Into<Value>) {
        self.fields.set(key, value);
    }

    pub fn set_non_enumerable(&mut self, key: impl Into<FieldKey>) {
        self.fields.set_non_enumerable(key);
    }

    pub fn fields(&self) -> &Record {
        &self.fields
    }

    pub fn capability(&self) -> &Rc<Capability<DisposableObject>> {
        &self.capability
    }

    pub fn is_disposed(&self) -> bool {
        self.capability.is_disposed(self)
    }

    /// Returns `self` so calls can be chained, on the first call and every later one.
    pub fn dispose(&mut self) -> Result<&mut Self, DisposeError> {
        let capability = Rc::clone(&self.capability);
        capability.dispose(self)?;
        Ok(self)
    }

    pub fn into_ref(self) -> DisposableRef {
        crate::disposable::into_ref(self)
    }
}

impl Fields for DisposableObject {
    fn own_field_keys(&self) -> Vec<FieldKey> {
        self.fields.own_field_keys()
    }

    fn field(&self, key: &FieldKey) -> Option<&Value> {
        self.fields.field(key)
    }

    fn set_field(&mut self, key: &FieldKey, value: Value) {
        self.fields.set_field(key, value);
    }
}

impl Host for DisposableObject {
    fn disposable_state(&self) -> &DisposableState {
        &self.state
    }

    fn disposable_state_mut(&mut self) -> &mut DisposableState {
        &mut self.state
    }
}

impl Disposable for DisposableObject {
    fn is_disposed(&self) -> bool {
        DisposableObject::is_disposed(self)
    }

    fn dispose(&mut self) -> Result<(), DisposeError> {
        DisposableObject::dispose(self).map(|_| ())
    }
}
