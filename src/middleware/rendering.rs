use super::lifecycle::{Lifecycle, RenderErrors};
use super::options::RenderingOptions;
use crate::error::{Error, Result};
use crate::host::RequestHandler;
use crate::render::{RenderEngine, RenderMiddlewareFactory, RenderOptions, Renderable};
use crate::store::{ReducerStoreFactory, StoreFactory};
use std::sync::Arc;

/// Picks one of the engine's two entry points.
struct EngineEntry {
    engine: Arc<dyn RenderEngine>,
    hydrate: bool,
}

impl RenderMiddlewareFactory for EngineEntry {
    fn create(&self, renderable: Arc<dyn Renderable>, options: RenderOptions) -> RequestHandler {
        if self.hydrate {
            self.engine.hydrating_middleware(renderable, options)
        } else {
            self.engine.middleware(renderable, options)
        }
    }
}

/// The store middleware bound to a [`RenderEngine`].
///
/// Works like [`super::state_container`] with three differences: the store
/// factory defaults to [`ReducerStoreFactory`], `noHydrate` selects the
/// non-hydrating entry point, and a failed re-render is logged instead of
/// being dispatched.
pub fn rendering_middleware<R>(renderable: R, options: RenderingOptions) -> Result<RequestHandler>
where
    R: Renderable + 'static,
{
    let engine = options
        .engine
        .ok_or(Error::MissingCollaborator("renderEngine"))?;
    let store_factory = options
        .store_factory
        .unwrap_or_else(|| Arc::new(ReducerStoreFactory) as Arc<dyn StoreFactory>);

    Ok(Lifecycle {
        renderable: Arc::new(renderable),
        render_factory: Arc::new(EngineEntry {
            engine,
            hydrate: !options.config.no_hydrate,
        }),
        store_factory,
        config: options.config.base,
        user: options.render,
        environment: options.environment,
        render_errors: RenderErrors::Report,
    }
    .into_handler())
}
