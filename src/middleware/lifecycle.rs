use super::config::MiddlewareConfig;
use crate::action::Action;
use crate::error::{Error, Result};
use crate::host::{Binding, Next, Request, RequestHandler, Response};
use crate::render::{
    after_hook, before_hook, AfterHook, BeforeHook, Render, RenderMiddlewareFactory,
    RenderOptions, Renderable,
};
use crate::runtime::{Environment, RequestCycle};
use crate::store::{identity_reducer, listener, Listener, Store, StoreFactory, Unsubscribe};
use std::sync::{Arc, OnceLock};
use tracing::{debug, error, trace, warn};

/// What happens when a re-render reports an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenderErrors {
    /// Dispatch the configured render-error action into the store.
    Dispatch,
    /// Log the error and dispatch nothing.
    Report,
}

/// The store lifecycle both middleware variants share.
pub(crate) struct Lifecycle {
    pub(crate) renderable: Arc<dyn Renderable>,
    pub(crate) render_factory: Arc<dyn RenderMiddlewareFactory>,
    pub(crate) store_factory: Arc<dyn StoreFactory>,
    pub(crate) config: MiddlewareConfig,
    pub(crate) user: RenderOptions,
    pub(crate) environment: Option<Environment>,
    pub(crate) render_errors: RenderErrors,
}

impl Lifecycle {
    pub(crate) fn into_handler(self) -> RequestHandler {
        let lifecycle = Arc::new(self);
        if lifecycle.config.handle_errors {
            RequestHandler::error_handling(move |error, request, response, next| {
                lifecycle.handle(error, request, response, next)
            })
        } else {
            RequestHandler::plain(move |request, response, next| {
                lifecycle.handle(None, request, response, next)
            })
        }
    }

    fn environment(&self) -> Environment {
        self.environment.unwrap_or_else(Environment::current)
    }

    fn handle(self: &Arc<Self>, error: Option<Error>, request: Request, response: Response, next: Next) {
        // Decided once per request; the render middleware may run `after` later.
        let environment = self.environment();
        // A server renders once per request; nothing to subscribe to.
        if environment.is_server() {
            debug!(path = request.path(), "server render, store hooks skipped");
            return self.render(self.user.clone(), error, request, response, next);
        }

        let cycle = RequestCycle::new();
        let mut options = self.user.clone();
        options.before = Some(self.before_hook(Arc::clone(&cycle)));
        options.after = Some(self.after_hook(
            environment,
            cycle,
            request.clone(),
            response.clone(),
        ));
        self.render(options, error, request, response, next);
    }

    fn render(
        &self,
        options: RenderOptions,
        error: Option<Error>,
        request: Request,
        response: Response,
        next: Next,
    ) {
        let handler = self
            .render_factory
            .create(Arc::clone(&self.renderable), options);
        handler.call(error, request, response, next);
    }

    fn before_hook(self: &Arc<Self>, cycle: Arc<RequestCycle>) -> BeforeHook {
        let lifecycle = Arc::clone(self);
        before_hook(move |options, request, response, done| {
            let locals = response.locals();

            let dispatch_cycle = Arc::clone(&cycle);
            locals.bind(
                lifecycle.config.dispatch_key.clone(),
                Binding::Dispatch(Arc::new(move |action: Action| {
                    dispatch_cycle.dispatch(action)
                })),
            );
            let subscribe_cycle = Arc::clone(&cycle);
            locals.bind(
                lifecycle.config.subscribe_key.clone(),
                Binding::Subscribe(Arc::new(move |listener: Listener| {
                    subscribe_cycle.subscribe(listener)
                })),
            );

            let reducer = lifecycle
                .renderable
                .reducer()
                .or_else(|| options.reducer.clone())
                .unwrap_or_else(identity_reducer);
            cycle.install(lifecycle.store_factory.create_store(reducer, locals.to_state()));
            debug!(path = request.path(), "store created for request");

            match &lifecycle.user.before {
                Some(before) => before(options, request, response, done),
                None => done(None),
            }
        })
    }

    fn after_hook(
        self: &Arc<Self>,
        environment: Environment,
        cycle: Arc<RequestCycle>,
        request: Request,
        response: Response,
    ) -> AfterHook {
        let lifecycle = Arc::clone(self);
        after_hook(move |error, render, next| {
            if environment.is_server() {
                return lifecycle.complete(error, render, next);
            }

            let Some(store) = cycle.store() else {
                warn!(path = request.path(), "after hook ran before the store was created");
                let error = error.unwrap_or(Error::StoreNotCreated {
                    operation: "subscribe",
                });
                return lifecycle.complete(Some(error), render, next);
            };

            let unsubscribe = lifecycle.subscribe_renders(&store, Arc::clone(&render));

            debug!(
                action = %lifecycle.config.route_change_action,
                path = request.path(),
                "dispatching route change"
            );
            store.dispatch(Action::route_change(
                lifecycle.config.route_change_action.clone(),
                unsubscribe,
                request.clone(),
                response.clone(),
            ));

            lifecycle.complete(error, render, next);
        })
    }

    /// Hand completion to the user's `after` hook, or forward an error.
    fn complete(&self, error: Option<Error>, render: Render, next: Next) {
        match &self.user.after {
            Some(after) => after(error, render, next),
            None => {
                if let Some(error) = error {
                    next.call(Some(error));
                }
            }
        }
    }

    /// Re-render on every state change of `store`.
    fn subscribe_renders(&self, store: &Arc<dyn Store>, render: Render) -> Unsubscribe {
        // The listener needs its own handle for render-error actions, and
        // only gets it once `subscribe` has returned.
        let handle: Arc<OnceLock<Unsubscribe>> = Arc::new(OnceLock::new());
        let store_ref = Arc::downgrade(store);
        let error_action = self.config.render_error_action.clone();
        let policy = self.render_errors;

        let listener_handle = Arc::clone(&handle);
        let unsubscribe = store.subscribe(listener(move |change| {
            trace!(action = change.action.kind(), "re-rendering after state change");
            // A failed render of the error state must not dispatch another error.
            let after_error = change.action.kind() == error_action;
            let store_ref = store_ref.clone();
            let handle = Arc::clone(&listener_handle);
            let error_action = error_action.clone();

            render(
                change.state,
                Box::new(move |result: Result<()>| {
                    let Err(err) = result else { return };
                    if after_error {
                        warn!(error = %err, "render of the error state failed");
                        return;
                    }
                    match policy {
                        RenderErrors::Report => {
                            error!(error = %err, "render failed, inspect the render middleware");
                        }
                        RenderErrors::Dispatch => {
                            if let Some(store) = store_ref.upgrade() {
                                debug!(action = %error_action, "dispatching render error");
                                store.dispatch(Action::render_error(
                                    error_action,
                                    err,
                                    handle.get().cloned(),
                                ));
                            }
                        }
                    }
                }),
            );
        }));

        let _ = handle.set(unsubscribe.clone());
        unsubscribe
    }
}
