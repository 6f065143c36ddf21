use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Registry of observers. Notification runs over a copy of the registry, so
/// a listener may register or remove listeners while it is being called.
pub struct Listeners<L: ?Sized> {
    handlers: Mutex<Vec<Arc<L>>>,
}

impl<L: ?Sized> Listeners<L> {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
        }
    }

    pub fn add(&self, listener: Arc<L>) {
        self.handlers.lock().push(listener);
    }

    /// Removes the first registration of this exact listener.
    pub fn remove(&self, listener: &Arc<L>) -> bool {
        let mut handlers = self.handlers.lock();
        match handlers.iter().position(|h| Arc::ptr_eq(h, listener)) {
            Some(pos) => {
                handlers.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Arc<L>> {
        self.handlers.lock().clone()
    }

    pub fn notify(&self, mut f: impl FnMut(&L)) {
        for listener in self.snapshot() {
            f(listener.as_ref());
        }
    }
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> fmt::Debug for Listeners<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("len", &self.len()).finish()
    }
}
