//! Store middlewares for render middlewares.
//!
//! - [`state_container`] wraps any [`crate::render::RenderMiddlewareFactory`]
//! - [`create_factory`] adds cleanup of the previous route's subscription
//! - [`rendering_middleware`] binds to a [`crate::render::RenderEngine`]

mod config;
mod factory;
mod lifecycle;
mod options;
mod rendering;
mod state_container;

pub use config::{MiddlewareConfig, RenderingConfig};
pub use factory::{create_factory, MiddlewareFactory, RouteScopedStoreFactory, SubscriptionSlot};
pub use options::{RenderingOptions, StateContainerOptions};
pub use rendering::rendering_middleware;
pub use state_container::state_container;
