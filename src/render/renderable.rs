use super::RenderOptions;
use crate::host::RequestHandler;
use crate::store::Reducer;
use std::fmt;
use std::sync::Arc;

/// Something a render middleware knows how to render.
///
/// A renderable may declare its own reducer, which takes priority over the
/// one configured on the middleware.
pub trait Renderable: Send + Sync {
    fn reducer(&self) -> Option<Reducer> {
        None
    }
}

/// Builds a render middleware for one renderable.
pub trait RenderMiddlewareFactory: Send + Sync {
    fn create(&self, renderable: Arc<dyn Renderable>, options: RenderOptions) -> RequestHandler;
}

impl<F> RenderMiddlewareFactory for F
where
    F: Fn(Arc<dyn Renderable>, RenderOptions) -> RequestHandler + Send + Sync,
{
    fn create(&self, renderable: Arc<dyn Renderable>, options: RenderOptions) -> RequestHandler {
        self(renderable, options)
    }
}

/// A render middleware with two entry points: one that only renders, and
/// one that hydrates state rendered on the server.
pub trait RenderEngine: Send + Sync {
    fn middleware(&self, renderable: Arc<dyn Renderable>, options: RenderOptions)
        -> RequestHandler;

    fn hydrating_middleware(
        &self,
        renderable: Arc<dyn Renderable>,
        options: RenderOptions,
    ) -> RequestHandler;
}

/// A named page with an optional reducer.
#[derive(Clone)]
pub struct Page {
    name: String,
    reducer: Option<Reducer>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reducer: None,
        }
    }

    pub fn with_reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = Some(reducer);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Renderable for Page {
    fn reducer(&self) -> Option<Reducer> {
        self.reducer.clone()
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("name", &self.name)
            .field("reducer", &self.reducer.is_some())
            .finish()
    }
}
