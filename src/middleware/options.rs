use super::config::{MiddlewareConfig, RenderingConfig};
use crate::render::{AfterHook, BeforeHook, RenderEngine, RenderMiddlewareFactory, RenderOptions};
use crate::runtime::Environment;
use crate::store::{Reducer, StoreFactory};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Options of the generic state-container middleware.
///
/// Both collaborators are optional here so that a missing one is reported
/// when the middleware is built rather than when a request arrives.
#[derive(Clone, Default)]
pub struct StateContainerOptions {
    pub config: MiddlewareConfig,
    pub render_middleware_factory: Option<Arc<dyn RenderMiddlewareFactory>>,
    pub store_factory: Option<Arc<dyn StoreFactory>>,
    /// User hooks, reducer and settings handed on to the render middleware.
    pub render: RenderOptions,
    /// Pins the environment instead of resolving it per request.
    pub environment: Option<Environment>,
}

impl StateContainerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: MiddlewareConfig) -> Self {
        self.config = config;
        self
    }

    pub fn render_middleware_factory<F>(mut self, factory: F) -> Self
    where
        F: RenderMiddlewareFactory + 'static,
    {
        self.render_middleware_factory = Some(Arc::new(factory));
        self
    }

    pub fn store_factory<F>(mut self, factory: F) -> Self
    where
        F: StoreFactory + 'static,
    {
        self.store_factory = Some(Arc::new(factory));
        self
    }

    pub fn handle_errors(mut self, handle_errors: bool) -> Self {
        self.config.handle_errors = handle_errors;
        self
    }

    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.render.reducer = Some(reducer);
        self
    }

    pub fn before(mut self, hook: BeforeHook) -> Self {
        self.render.before = Some(hook);
        self
    }

    pub fn after(mut self, hook: AfterHook) -> Self {
        self.render.after = Some(hook);
        self
    }

    pub fn setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.render.settings.insert(key.into(), value);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }
}

impl fmt::Debug for StateContainerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateContainerOptions")
            .field("config", &self.config)
            .field(
                "render_middleware_factory",
                &self.render_middleware_factory.is_some(),
            )
            .field("store_factory", &self.store_factory.is_some())
            .field("render", &self.render)
            .field("environment", &self.environment)
            .finish()
    }
}

/// Options of the rendering middleware.
///
/// Without a store factory the built-in [`crate::store::ReducerStoreFactory`]
/// is used.
#[derive(Clone, Default)]
pub struct RenderingOptions {
    pub config: RenderingConfig,
    pub engine: Option<Arc<dyn RenderEngine>>,
    pub store_factory: Option<Arc<dyn StoreFactory>>,
    pub render: RenderOptions,
    pub environment: Option<Environment>,
}

impl RenderingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: RenderingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn engine<E>(mut self, engine: E) -> Self
    where
        E: RenderEngine + 'static,
    {
        self.engine = Some(Arc::new(engine));
        self
    }

    pub fn store_factory<F>(mut self, factory: F) -> Self
    where
        F: StoreFactory + 'static,
    {
        self.store_factory = Some(Arc::new(factory));
        self
    }

    pub fn handle_errors(mut self, handle_errors: bool) -> Self {
        self.config.base.handle_errors = handle_errors;
        self
    }

    pub fn no_hydrate(mut self, no_hydrate: bool) -> Self {
        self.config.no_hydrate = no_hydrate;
        self
    }

    pub fn reducer(mut self, reducer: Reducer) -> Self {
        self.render.reducer = Some(reducer);
        self
    }

    pub fn before(mut self, hook: BeforeHook) -> Self {
        self.render.before = Some(hook);
        self
    }

    pub fn after(mut self, hook: AfterHook) -> Self {
        self.render.after = Some(hook);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }
}

impl fmt::Debug for RenderingOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderingOptions")
            .field("config", &self.config)
            .field("engine", &self.engine.is_some())
            .field("store_factory", &self.store_factory.is_some())
            .field("render", &self.render)
            .field("environment", &self.environment)
            .finish()
    }
}
