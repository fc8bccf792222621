//! The host framework's request/response/next convention.
//!
//! Handlers receive a [`Request`], a shared [`Response`] whose [`Locals`]
//! carry per-request state, and a [`Next`] continuation. Error-aware handlers
//! additionally receive the pending error.

mod handler;
mod request;
mod response;

pub use handler::{ErrorHandler, Next, PlainHandler, RequestHandler};
pub use request::Request;
pub use response::{Binding, DispatchFn, Locals, Response, SubscribeFn};
