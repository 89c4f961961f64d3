use crate::*;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// A descriptor whose device-dependent part is realized against a render target
/// on demand and can be dropped at any time without losing its
/// device-independent description.
pub trait DeviceResource<B: Backend> {
    /// Realizes the device-dependent part against `target`. Idempotent for the
    /// same target; a realization made against another target is replaced.
    fn acquire(&self, target: &B::RenderTarget) -> Result<()>;
    fn release(&self);
    /// The target the current realization belongs to.
    fn realized_for(&self) -> Option<TargetId>;

    /// Releases only if the realization belongs to `target`.
    #[inline]
    fn release_for(&self, target: TargetId) -> bool {
        if self.realized_for() == Some(target) {
            self.release();
            true
        } else {
            false
        }
    }
}

/// One device-dependent slot, tagged with the target it was realized against.
pub(crate) struct Slot<T>(RefCell<Option<(TargetId, T)>>);

impl<T: Clone> Slot<T> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self(RefCell::new(None))
    }

    #[inline]
    pub(crate) fn with(target: TargetId, value: T) -> Self {
        Self(RefCell::new(Some((target, value))))
    }

    /// Runs `create` unless the slot already holds a realization for `target`.
    pub(crate) fn ensure(&self, target: TargetId, create: impl FnOnce() -> Result<T>) -> Result<()> {
        if self.owner() == Some(target) {
            return Ok(());
        }
        let value = create()?;
        *self.0.borrow_mut() = Some((target, value));
        Ok(())
    }

    #[inline]
    pub(crate) fn get(&self, target: TargetId) -> Option<T> {
        match &*self.0.borrow() {
            Some((owner, value)) if *owner == target => Some(value.clone()),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn current(&self) -> Option<(TargetId, T)> {
        self.0.borrow().clone()
    }

    #[inline]
    pub(crate) fn owner(&self) -> Option<TargetId> {
        self.0.borrow().as_ref().map(|(owner, _)| *owner)
    }

    #[inline]
    pub(crate) fn clear(&self) {
        self.0.borrow_mut().take();
    }
}

/// Back-references to every descriptor realized through a context. They do not
/// keep the descriptors alive.
pub(crate) struct Holders<B: Backend> {
    entries: Vec<Weak<dyn DeviceResource<B>>>,
}

impl<B: Backend> Holders<B> {
    #[inline]
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn track(&mut self, holder: Rc<dyn DeviceResource<B>>) {
        self.entries.retain(|entry| entry.strong_count() > 0);
        let weak = Rc::downgrade(&holder);
        if !self.entries.iter().any(|entry| entry.ptr_eq(&weak)) {
            self.entries.push(weak);
        }
    }

    /// Drops every tracked realization made against `target` and forgets all
    /// entries. Returns how many realizations were dropped.
    pub(crate) fn release_all(&mut self, target: TargetId) -> usize {
        self.entries
            .drain(..)
            .filter_map(|entry| entry.upgrade())
            .filter(|holder| holder.release_for(target))
            .count()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.strong_count() > 0)
            .count()
    }
}
