use super::options::StateContainerOptions;
use super::state_container::state_container;
use crate::error::{Error, Result};
use crate::host::RequestHandler;
use crate::render::Renderable;
use crate::store::{listener, Reducer, Store, StoreFactory, Unsubscribe};
use serde_json::Value;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::debug;

/// Holds at most one unsubscribe handle.
///
/// Single-page navigation keeps one process alive across route changes; the
/// slot keeps the previous route's render subscription so it can be detached
/// when the next route's store is created.
#[derive(Debug, Default)]
pub struct SubscriptionSlot {
    held: Mutex<Option<Unsubscribe>>,
}

impl SubscriptionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `handle`, detaching any different handle held before.
    pub fn retain(&self, handle: Unsubscribe) {
        let previous = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle.clone());
        if let Some(previous) = previous {
            if !previous.same_handle(&handle) {
                previous.call();
            }
        }
    }

    /// Detach and forget the held handle. Returns `true` if one was held.
    pub fn release(&self) -> bool {
        let held = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match held {
            Some(handle) => {
                handle.call();
                true
            }
            None => false,
        }
    }

    pub fn held(&self) -> Option<Unsubscribe> {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.held().is_none()
    }
}

/// Store factory that cleans up after the previous route.
///
/// Creating a store first detaches the render subscription of the last
/// route change. Each new store then watches for its own route-change action
/// and remembers that action's unsubscribe handle.
pub struct RouteScopedStoreFactory {
    inner: Arc<dyn StoreFactory>,
    route_change_action: String,
    slot: Arc<SubscriptionSlot>,
}

impl RouteScopedStoreFactory {
    pub fn new(
        inner: Arc<dyn StoreFactory>,
        route_change_action: impl Into<String>,
        slot: Arc<SubscriptionSlot>,
    ) -> Self {
        Self {
            inner,
            route_change_action: route_change_action.into(),
            slot,
        }
    }
}

impl StoreFactory for RouteScopedStoreFactory {
    fn create_store(&self, reducer: Reducer, initial_state: Value) -> Arc<dyn Store> {
        if self.slot.release() {
            debug!("detached render subscription of the previous route");
        }

        let store = self.inner.create_store(reducer, initial_state);

        let own: Arc<OnceLock<Unsubscribe>> = Arc::new(OnceLock::new());
        let own_ref = Arc::clone(&own);
        let slot = Arc::clone(&self.slot);
        let route_change_action = self.route_change_action.clone();
        let handle = store.subscribe(listener(move |change| {
            if change.action.kind() != route_change_action {
                return;
            }
            if let Some(unsubscribe) = change.action.unsubscribe() {
                slot.retain(unsubscribe.clone());
            }
            if let Some(own) = own_ref.get() {
                own.call();
            }
        }));
        let _ = own.set(handle);

        store
    }
}

/// Builds state-container middlewares that share one subscription slot.
#[derive(Clone)]
pub struct MiddlewareFactory {
    options: StateContainerOptions,
    slot: Arc<SubscriptionSlot>,
}

impl MiddlewareFactory {
    /// A state-container middleware for `renderable`.
    pub fn middleware<R>(&self, renderable: R) -> Result<RequestHandler>
    where
        R: Renderable + 'static,
    {
        state_container(renderable, self.options.clone())
    }

    /// The slot holding the current route's render subscription.
    pub fn slot(&self) -> &SubscriptionSlot {
        &self.slot
    }
}

/// Wrap the configured store factory with route-change cleanup.
///
/// Only the store factory is checked here; a missing render middleware
/// factory is reported by [`MiddlewareFactory::middleware`].
pub fn create_factory(mut options: StateContainerOptions) -> Result<MiddlewareFactory> {
    let inner = options
        .store_factory
        .take()
        .ok_or(Error::MissingCollaborator("createStore"))?;
    let slot = Arc::new(SubscriptionSlot::new());

    options.store_factory = Some(Arc::new(RouteScopedStoreFactory::new(
        inner,
        options.config.route_change_action.clone(),
        Arc::clone(&slot),
    )));

    Ok(MiddlewareFactory { options, slot })
}
