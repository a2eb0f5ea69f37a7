use parking_lot::RwLock;

use crate::error::{Error, Result};

/// Owns one native resource and releases it at most once.
///
/// The resource is released by the first call to [`Handle::finalize`] or,
/// failing that, when the handle is dropped. Releasing means dropping the
/// inner value, so `T`'s own `Drop` runs exactly once. Access after release
/// fails with [`Error::Finalized`].
pub struct Handle<T> {
    label: &'static str,
    slot: RwLock<Option<T>>,
}

impl<T> Handle<T> {
    pub fn new(label: &'static str, resource: T) -> Self {
        Handle { label, slot: RwLock::new(Some(resource)) }
    }

    /// Release the resource. Returns `true` if this call released it.
    pub fn finalize(&self) -> bool {
        // Drop outside the lock so a slow free never blocks readers.
        let taken = self.slot.write().take();
        match taken {
            Some(resource) => {
                drop(resource);
                log::trace!("released {}", self.label);
                true
            }
            None => false,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.slot.read().is_none()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R> {
        let guard = self.slot.read();
        guard.as_ref().map(f).ok_or(Error::Finalized(self.label))
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R> {
        let mut guard = self.slot.write();
        guard.as_mut().map(f).ok_or(Error::Finalized(self.label))
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl<T> Drop for Handle<T> {
    fn drop(&mut self) {
        if self.slot.get_mut().take().is_some() {
            log::trace!("released {} on drop", self.label);
        }
    }
}
