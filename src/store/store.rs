use super::contract::{Listener, Reducer, StateChange, Store, StoreFactory, Unsubscribe};
use crate::action::Action;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

type Subscribers = Vec<(usize, Listener)>;

/// A thread-safe, reducer-driven store.
///
/// State only changes through [`Store::dispatch`]. Listeners are notified
/// after every dispatch with the new and previous state.
pub struct ReducerStore {
    state: Arc<RwLock<Value>>,
    reducer: Reducer,
    subscribers: Arc<RwLock<Subscribers>>,
    next_id: AtomicUsize,
}

impl ReducerStore {
    /// Create a new store with the given reducer and initial state.
    pub fn new(reducer: Reducer, initial: Value) -> Self {
        Self {
            state: Arc::new(RwLock::new(initial)),
            reducer,
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_id: AtomicUsize::new(0),
        }
    }

    /// Read state without cloning it.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Value) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&*state)
    }

    /// Number of attached listeners.
    pub fn listener_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Store for ReducerStore {
    fn state(&self) -> Value {
        self.read(Value::clone)
    }

    fn dispatch(&self, action: Action) {
        let (previous, next) = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let next = (self.reducer)(&*state, &action);
            let previous = std::mem::replace(&mut *state, next.clone());
            (previous, next)
        };

        // Notify a snapshot so listeners may subscribe, unsubscribe or
        // dispatch again without holding our locks.
        let subscribers: Vec<Listener> = self
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        let change = StateChange {
            state: &next,
            previous: &previous,
            action: &action,
        };
        for subscriber in subscribers {
            subscriber(&change);
        }
    }

    fn subscribe(&self, listener: Listener) -> Unsubscribe {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));

        let subscribers = Arc::downgrade(&self.subscribers);
        Unsubscribe::new(move || {
            if let Some(subscribers) = subscribers.upgrade() {
                subscribers
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .retain(|(entry, _)| *entry != id);
            }
        })
    }
}

/// Default factory producing [`ReducerStore`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReducerStoreFactory;

impl StoreFactory for ReducerStoreFactory {
    fn create_store(&self, reducer: Reducer, initial_state: Value) -> Arc<dyn Store> {
        Arc::new(ReducerStore::new(reducer, initial_state))
    }
}
