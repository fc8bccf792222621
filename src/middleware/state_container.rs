use super::lifecycle::{Lifecycle, RenderErrors};
use super::options::StateContainerOptions;
use crate::error::{Error, Result};
use crate::host::RequestHandler;
use crate::render::Renderable;
use std::sync::Arc;

/// Wrap a render middleware so every request gets its own store.
///
/// On a client each request creates a store in the render middleware's
/// `before` hook and binds `dispatch` and `subscribe` on the response locals.
/// In `after` the store is subscribed so that state changes re-render, and
/// the route-change action is dispatched. A re-render that fails dispatches
/// the render-error action. On a server the render middleware runs with the
/// options unchanged.
///
/// The render subscription stays attached, and keeps the store, its request
/// and its response alive, until the route-change action's `unsubscribe` is
/// called. [`create_factory`](super::create_factory) calls it when the next
/// route's store is created; callers of this middleware call it themselves.
///
/// Fails if either collaborator is missing.
pub fn state_container<R>(renderable: R, options: StateContainerOptions) -> Result<RequestHandler>
where
    R: Renderable + 'static,
{
    let render_factory = options
        .render_middleware_factory
        .ok_or(Error::MissingCollaborator("renderMiddlewareFactory"))?;
    let store_factory = options
        .store_factory
        .ok_or(Error::MissingCollaborator("createStore"))?;

    Ok(Lifecycle {
        renderable: Arc::new(renderable),
        render_factory,
        store_factory,
        config: options.config,
        user: options.render,
        environment: options.environment,
        render_errors: RenderErrors::Dispatch,
    }
    .into_handler())
}
