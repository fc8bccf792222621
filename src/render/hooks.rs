use crate::error::{Error, Result};
use crate::host::{Next, Request, Response};
use crate::store::Reducer;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Completion callback handed to a `before` hook.
pub type Done = Box<dyn FnOnce(Option<Error>) + Send>;

/// Completion callback of a single render.
pub type RenderCallback = Box<dyn FnOnce(Result<()>) + Send>;

/// Renders the page again from the given state.
pub type Render = Arc<dyn Fn(&Value, RenderCallback) + Send + Sync>;

/// Runs before the render middleware renders.
pub type BeforeHook = Arc<dyn Fn(&RenderOptions, &Request, &Response, Done) + Send + Sync>;

/// Runs after the render middleware rendered.
pub type AfterHook = Arc<dyn Fn(Option<Error>, Render, Next) + Send + Sync>;

pub fn before_hook<F>(f: F) -> BeforeHook
where
    F: Fn(&RenderOptions, &Request, &Response, Done) + Send + Sync + 'static,
{
    Arc::new(f)
}

pub fn after_hook<F>(f: F) -> AfterHook
where
    F: Fn(Option<Error>, Render, Next) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Options handed to the render middleware factory.
///
/// `settings` is passed through untouched for the render middleware's own
/// configuration.
#[derive(Clone, Default)]
pub struct RenderOptions {
    pub reducer: Option<Reducer>,
    pub before: Option<BeforeHook>,
    pub after: Option<AfterHook>,
    pub settings: Map<String, Value>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = Some(reducer);
        self
    }

    pub fn before(mut self, hook: BeforeHook) -> Self {
        self.before = Some(hook);
        self
    }

    pub fn after(mut self, hook: AfterHook) -> Self {
        self.after = Some(hook);
        self
    }

    pub fn setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("reducer", &self.reducer.is_some())
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}
