//! Long-lived observation handles.
//!
//! An `Observation` is shared between the application, zero or more
//! `Observe` operations, and the session's observation registry. Rather
//! than track that weak-reference graph by hand, it is modelled directly in
//! Rust's ownership system: `Observation` is a cheap-clone handle around an
//! `Rc<RefCell<..>>`; the session's registry holds only a `Weak` reference,
//! so the last strong handle being dropped — by the application, by an
//! `Observe` operation, or both — is what actually frees it. A dispatch
//! that finds a dead `Weak` simply skips that entry without error.

use crate::changeset::ChangeSet;
use crate::path::Path;
use std::cell::RefCell;
use std::rc::Rc;

pub(crate) struct ObservationInner {
    client_id: String,
    path: Path,
    callback: Box<dyn FnMut(&ChangeSet)>,
}

/// A registered (or about-to-be-registered) subscription to changes at
/// `(clientId, path)` on one client.
#[derive(Clone)]
pub struct Observation {
    pub(crate) inner: Rc<RefCell<ObservationInner>>,
}

impl Observation {
    /// Builds a new, as-yet-unregistered observation. Pass it to
    /// `ObserveOperation::add_observation` and `Perform` to register it
    /// with the daemon and the owning session.
    pub fn new(client_id: impl Into<String>, path: Path, callback: impl FnMut(&ChangeSet) + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservationInner {
                client_id: client_id.into(),
                path,
                callback: Box::new(callback),
            })),
        }
    }

    pub fn client_id(&self) -> String {
        self.inner.borrow().client_id.clone()
    }

    pub fn path(&self) -> Path {
        self.inner.borrow().path
    }

    /// The `(clientId, canonical path)` key used by the session's
    /// observation registry.
    pub(crate) fn registry_key(&self) -> (String, String) {
        let inner = self.inner.borrow();
        (inner.client_id.clone(), inner.path.to_string())
    }

    pub(crate) fn invoke(&self, changes: &ChangeSet) {
        (self.inner.borrow_mut().callback)(changes);
    }

    pub(crate) fn downgrade(&self) -> std::rc::Weak<RefCell<ObservationInner>> {
        Rc::downgrade(&self.inner)
    }
}
