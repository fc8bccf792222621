use super::{Request, Response};
use crate::error::Error;
use std::fmt;
use std::sync::Arc;

/// Continuation into the next handler of the host chain.
#[derive(Clone)]
pub struct Next(Arc<dyn Fn(Option<Error>) + Send + Sync>);

impl Next {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Option<Error>) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// A continuation that ends the chain.
    pub fn noop() -> Self {
        Self::new(|_| {})
    }

    /// Continue the chain, optionally with an error.
    pub fn call(&self, error: Option<Error>) {
        (self.0)(error)
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Next")
    }
}

pub type PlainHandler = Arc<dyn Fn(Request, Response, Next) + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn(Option<Error>, Request, Response, Next) + Send + Sync>;

/// A handler in one of the two host call shapes.
#[derive(Clone)]
pub enum RequestHandler {
    /// `(request, response, next)`
    Plain(PlainHandler),
    /// `(error, request, response, next)`
    ErrorHandling(ErrorHandler),
}

impl RequestHandler {
    /// A handler that only runs when no error is pending.
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(Request, Response, Next) + Send + Sync + 'static,
    {
        RequestHandler::Plain(Arc::new(f))
    }

    /// A handler that receives the pending error.
    pub fn error_handling<F>(f: F) -> Self
    where
        F: Fn(Option<Error>, Request, Response, Next) + Send + Sync + 'static,
    {
        RequestHandler::ErrorHandling(Arc::new(f))
    }

    pub fn handles_errors(&self) -> bool {
        matches!(self, RequestHandler::ErrorHandling(_))
    }

    /// Invoke the handler the way the host chain would.
    ///
    /// A plain handler never sees an error: when one is pending it is
    /// skipped and the error goes straight to `next`.
    pub fn call(&self, error: Option<Error>, request: Request, response: Response, next: Next) {
        match self {
            RequestHandler::ErrorHandling(handler) => handler(error, request, response, next),
            RequestHandler::Plain(handler) => match error {
                None => handler(request, response, next),
                Some(error) => next.call(Some(error)),
            },
        }
    }
}

impl fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestHandler::Plain(_) => f.write_str("RequestHandler::Plain"),
            RequestHandler::ErrorHandling(_) => f.write_str("RequestHandler::ErrorHandling"),
        }
    }
}
