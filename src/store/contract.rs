use crate::action::Action;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Computes the next state from the current state and an action.
pub type Reducer = Arc<dyn Fn(&Value, &Action) -> Value + Send + Sync>;

/// Called after every dispatch with the state transition that happened.
pub type Listener = Arc<dyn Fn(&StateChange<'_>) + Send + Sync>;

/// Wrap a closure as a [`Reducer`].
pub fn reducer<F>(f: F) -> Reducer
where
    F: Fn(&Value, &Action) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wrap a closure as a [`Listener`].
pub fn listener<F>(f: F) -> Listener
where
    F: Fn(&StateChange<'_>) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A reducer that leaves the state untouched.
pub fn identity_reducer() -> Reducer {
    reducer(|state, _| state.clone())
}

/// What a listener sees after a dispatch.
#[derive(Debug, Clone, Copy)]
pub struct StateChange<'a> {
    pub state: &'a Value,
    pub previous: &'a Value,
    pub action: &'a Action,
}

/// A state container owned by one request cycle.
pub trait Store: Send + Sync {
    /// Snapshot of the current state.
    fn state(&self) -> Value;

    /// Run the reducer and notify listeners.
    fn dispatch(&self, action: Action);

    /// Register a listener; the returned handle detaches it.
    fn subscribe(&self, listener: Listener) -> Unsubscribe;
}

/// Builds a store from a reducer and an initial state.
pub trait StoreFactory: Send + Sync {
    fn create_store(&self, reducer: Reducer, initial_state: Value) -> Arc<dyn Store>;
}

impl<F> StoreFactory for F
where
    F: Fn(Reducer, Value) -> Arc<dyn Store> + Send + Sync,
{
    fn create_store(&self, reducer: Reducer, initial_state: Value) -> Arc<dyn Store> {
        self(reducer, initial_state)
    }
}

type Detach = Box<dyn FnOnce() + Send>;

/// Handle that detaches a listener from its store.
///
/// Clones share the same underlying detach function, which runs at most once
/// no matter how many clones call it or how the store implements removal.
#[derive(Clone)]
pub struct Unsubscribe {
    detach: Arc<Mutex<Option<Detach>>>,
}

impl Unsubscribe {
    pub fn new<F>(detach: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            detach: Arc::new(Mutex::new(Some(Box::new(detach)))),
        }
    }

    /// A handle with nothing to detach.
    pub fn noop() -> Self {
        Self {
            detach: Arc::new(Mutex::new(None)),
        }
    }

    /// Detach the listener. Returns `false` if it was already detached.
    pub fn call(&self) -> bool {
        // Taken under the lock, run outside it: detaching may re-enter the store.
        let detach = self
            .detach
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match detach {
            Some(detach) => {
                detach();
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.detach
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Whether two handles share the same detach function.
    pub fn same_handle(&self, other: &Unsubscribe) -> bool {
        Arc::ptr_eq(&self.detach, &other.detach)
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("active", &self.is_active())
            .finish()
    }
}
