//! Error types shared by the middleware, the store and the host glue.

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building or running a store middleware.
///
/// The enum is `Clone` because errors travel through `done`/`next`
/// continuations and render callbacks, and the same error may be handed to
/// more than one of them.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A required collaborator was not supplied when the middleware was built.
    #[error("{0} is required")]
    MissingCollaborator(&'static str),

    /// `dispatch` or `subscribe` was called before the request's store existed.
    #[error("cannot call {operation} until store is created")]
    StoreNotCreated { operation: &'static str },

    /// Nothing of the requested kind is bound on the response locals.
    #[error("no {kind} function bound to locals key `{key}`")]
    UnboundLocal { key: String, kind: &'static str },

    /// A JSON action did not carry a string `type` field.
    #[error("action is missing a string `type` field")]
    MissingActionType,

    /// The render middleware reported a failed render.
    #[error("render failed: {0}")]
    Render(String),

    /// An error coming from a handler further down the chain.
    #[error("{0}")]
    Handler(Arc<dyn StdError + Send + Sync>),
}

impl Error {
    /// Build a render error from any message.
    pub fn render(message: impl Into<String>) -> Self {
        Error::Render(message.into())
    }

    /// Wrap an arbitrary downstream error.
    pub fn handler<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Error::Handler(Arc::new(error))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
