use http::{HeaderMap, Method, Uri};
use std::fmt;
use std::sync::Arc;

/// An incoming request as seen by the middleware chain.
///
/// Cheap to clone; every handler in the chain sees the same request.
#[derive(Clone)]
pub struct Request {
    inner: Arc<http::Request<()>>,
}

impl Request {
    /// A bodiless request for `method` and `uri`.
    pub fn new(method: Method, uri: Uri) -> Self {
        let mut request = http::Request::new(());
        *request.method_mut() = method;
        *request.uri_mut() = uri;
        Self::from_http(request)
    }

    /// A `GET` request for a static path.
    pub fn get(path: &'static str) -> Self {
        Self::new(Method::GET, Uri::from_static(path))
    }

    /// Wrap an `http` request.
    pub fn from_http(request: http::Request<()>) -> Self {
        Self {
            inner: Arc::new(request),
        }
    }

    /// The request method.
    pub fn method(&self) -> &Method {
        self.inner.method()
    }

    /// The full request URI.
    pub fn uri(&self) -> &Uri {
        self.inner.uri()
    }

    /// The URI path.
    pub fn path(&self) -> &str {
        self.inner.uri().path()
    }

    /// The request headers.
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// `true` if both handles refer to the same request.
    pub fn ptr_eq(&self, other: &Request) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", self.method())
            .field("uri", self.uri())
            .finish()
    }
}
