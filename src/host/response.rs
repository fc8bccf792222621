use crate::action::Action;
use crate::error::{Error, Result};
use crate::store::{Listener, Unsubscribe};
use http::StatusCode;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// A dispatch function bound on the response locals.
pub type DispatchFn = Arc<dyn Fn(Action) -> Result<()> + Send + Sync>;

/// A subscribe function bound on the response locals.
pub type SubscribeFn = Arc<dyn Fn(Listener) -> Result<Unsubscribe> + Send + Sync>;

/// A function stored under a locals key.
#[derive(Clone)]
pub enum Binding {
    Dispatch(DispatchFn),
    Subscribe(SubscribeFn),
}

/// Response-local state shared by every handler of one request.
///
/// The data map is what the request's store starts from. Function bindings
/// let downstream handlers reach the store without holding it.
#[derive(Default)]
pub struct Locals {
    data: RwLock<Map<String, Value>>,
    bindings: RwLock<HashMap<String, Binding>>,
}

impl Locals {
    /// Store `value` under `key`, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value)
    }

    /// A copy of the value under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// The data map as a JSON object.
    pub fn to_state(&self) -> Value {
        Value::Object(
            self.data
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        )
    }

    /// Bind a function under `key`, replacing whatever was there.
    pub fn bind(&self, key: impl Into<String>, binding: Binding) {
        self.bindings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), binding);
    }

    /// The function bound under `key`.
    pub fn binding(&self, key: &str) -> Option<Binding> {
        self.bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// `true` if any function is bound under `key`.
    pub fn is_bound(&self, key: &str) -> bool {
        self.binding(key).is_some()
    }

    /// Call the dispatch function bound under `key`.
    pub fn dispatch(&self, key: &str, action: Action) -> Result<()> {
        match self.binding(key) {
            Some(Binding::Dispatch(dispatch)) => dispatch(action),
            _ => Err(Error::UnboundLocal {
                key: key.to_string(),
                kind: "dispatch",
            }),
        }
    }

    /// Call the subscribe function bound under `key`.
    pub fn subscribe(&self, key: &str, listener: Listener) -> Result<Unsubscribe> {
        match self.binding(key) {
            Some(Binding::Subscribe(subscribe)) => subscribe(listener),
            _ => Err(Error::UnboundLocal {
                key: key.to_string(),
                kind: "subscribe",
            }),
        }
    }
}

impl fmt::Debug for Locals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound: Vec<String> = self
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("Locals")
            .field("data", &self.to_state())
            .field("bound", &bound)
            .finish()
    }
}

struct ResponseInner {
    status: Mutex<StatusCode>,
    body: Mutex<Option<String>>,
    locals: Locals,
}

/// The outgoing response of one request.
///
/// Cloning shares the same response; handlers write the status and body and
/// read or extend [`Locals`].
#[derive(Clone)]
pub struct Response {
    inner: Arc<ResponseInner>,
}

impl Response {
    /// An empty `200 OK` response.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ResponseInner {
                status: Mutex::new(StatusCode::OK),
                body: Mutex::new(None),
                locals: Locals::default(),
            }),
        }
    }

    /// Per-request data and bound functions.
    pub fn locals(&self) -> &Locals {
        &self.inner.locals
    }

    /// The current status code.
    pub fn status(&self) -> StatusCode {
        *self
            .inner
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_status(&self, status: StatusCode) {
        *self
            .inner
            .status
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = status;
    }

    /// Replace the response body.
    pub fn send(&self, body: impl Into<String>) {
        *self
            .inner
            .body
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(body.into());
    }

    /// The body sent so far, if any.
    pub fn body(&self) -> Option<String> {
        self.inner
            .body
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `true` if both handles refer to the same response.
    pub fn ptr_eq(&self, other: &Response) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status())
            .field("locals", self.locals())
            .finish()
    }
}
