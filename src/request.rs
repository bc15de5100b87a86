//! Incoming HTTP request type.

use bytes::Bytes;
use http::{Method, Uri};

/// An incoming HTTP request with its body fully read.
///
/// Middleware only looks at [`method`](Self::method) and [`uri`](Self::uri);
/// the body is for the handler at the end of the chain.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    body: Bytes,
}

impl Request {
    pub fn new(method: Method, uri: Uri, body: Bytes) -> Self {
        Self { method, uri, body }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn body(&self) -> &[u8] { &self.body }
}

/// Builds a [`Request`] from an in-memory `http::Request`.
///
/// ```rust
/// use bytes::Bytes;
///
/// let req: strata::Request = http::Request::get("/greet?name=ann")
///     .body(Bytes::new())
///     .unwrap()
///     .into();
/// assert_eq!(req.path(), "/greet");
/// ```
impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::new(parts.method, parts.uri, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_drops_the_query() {
        let req = Request::new(Method::GET, Uri::from_static("/status?verbose=1"), Bytes::new());
        assert_eq!(req.path(), "/status");
        assert_eq!(req.uri().to_string(), "/status?verbose=1");
    }

    #[test]
    fn converts_from_http_request() {
        let req: Request = http::Request::post("/greet")
            .body(Bytes::from_static(b"hi"))
            .unwrap()
            .into();
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.body(), b"hi");
    }
}
