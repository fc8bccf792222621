use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Where the middleware is running.
///
/// On the server a page renders exactly once per request, so store
/// subscriptions and re-renders are pointless there. On the client a page
/// keeps re-rendering as its store changes.
///
/// # Examples
///
/// The detected environment can be overridden for a scope:
///
/// ```
/// use render_store::Environment;
///
/// Environment::Client.scope(|| {
///     assert_eq!(Environment::current(), Environment::Client);
/// });
/// // Back to the detected environment here
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Server,
    Client,
}

// Thread-local stack for scoped overrides
thread_local! {
    static ENVIRONMENT_STACK: RefCell<Vec<Environment>> = const { RefCell::new(Vec::new()) };
}

impl Environment {
    /// The environment implied by the compilation target.
    ///
    /// `wasm32` builds run in a browser; everything else is a server.
    pub fn detected() -> Self {
        if cfg!(target_arch = "wasm32") {
            Environment::Client
        } else {
            Environment::Server
        }
    }

    /// The innermost scoped environment, or the detected one.
    pub fn current() -> Self {
        ENVIRONMENT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .copied()
                .unwrap_or_else(Self::detected)
        })
    }

    /// Run a function with this environment as the current one.
    ///
    /// The override is popped again even if `f` panics.
    pub fn scope<F, R>(self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        ENVIRONMENT_STACK.with(|stack| {
            stack.borrow_mut().push(self);
        });

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

        ENVIRONMENT_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });

        match result {
            Ok(r) => r,
            Err(e) => std::panic::resume_unwind(e),
        }
    }

    pub fn is_server(self) -> bool {
        self == Environment::Server
    }

    pub fn is_client(self) -> bool {
        self == Environment::Client
    }
}
