//! # Render Store
//!
//! Per-request state containers for server-side rendering middleware.
//!
//! A render middleware renders a page for each request. This crate wraps it so
//! that every request gets a fresh store:
//!
//! - `dispatch` and `subscribe` are bound on the response locals, so handlers
//!   further down the chain can reach the store
//! - on the client, store changes re-render the page
//! - a route-change action is dispatched once per request before control
//!   returns to the host chain
//!
//! ## Middlewares
//!
//! - [`state_container`] - generic, over any render middleware factory
//! - [`create_factory`] - the same, detaching the previous route's render
//!   subscription when the next route's store is created
//! - [`rendering_middleware`] - bound to a [`RenderEngine`] with a default
//!   store and a hydrate/no-hydrate switch

pub mod action;
pub mod error;
pub mod host;
pub mod middleware;
pub mod render;
pub mod runtime;
pub mod store;

// Re-export main types for convenience
pub use action::{Action, Payload};
pub use error::{Error, Result};
pub use host::{Locals, Next, Request, RequestHandler, Response};
pub use middleware::{
    create_factory, rendering_middleware, state_container, MiddlewareConfig, MiddlewareFactory,
    RenderingConfig, RenderingOptions, StateContainerOptions,
};
pub use render::{Page, RenderEngine, RenderMiddlewareFactory, RenderOptions, Renderable};
pub use runtime::Environment;
pub use store::{ReducerStore, ReducerStoreFactory, Store, StoreFactory, Unsubscribe};
