use crate::action::Action;
use crate::error::{Error, Result};
use crate::store::{Listener, Store, Unsubscribe};
use std::sync::{Arc, PoisonError, RwLock};

/// Per-request context threaded through the `before` and `after` hooks.
///
/// Holds the request's store once `before` has created it. Until then every
/// store access fails with [`Error::StoreNotCreated`].
#[derive(Default)]
pub struct RequestCycle {
    store: RwLock<Option<Arc<dyn Store>>>,
}

impl RequestCycle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn install(&self, store: Arc<dyn Store>) {
        *self.store.write().unwrap_or_else(PoisonError::into_inner) = Some(store);
    }

    /// The store, once the before-hook has created it.
    pub fn store(&self) -> Option<Arc<dyn Store>> {
        self.store
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn require(&self, operation: &'static str) -> Result<Arc<dyn Store>> {
        self.store().ok_or(Error::StoreNotCreated { operation })
    }

    pub fn dispatch(&self, action: Action) -> Result<()> {
        self.require("dispatch")?.dispatch(action);
        Ok(())
    }

    pub fn subscribe(&self, listener: Listener) -> Result<Unsubscribe> {
        Ok(self.require("subscribe")?.subscribe(listener))
    }
}
