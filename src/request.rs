//! Incoming HTTP request type.

use bytes::Bytes;
use http_body_util::BodyExt;

/// An incoming HTTP request with its body already buffered.
///
/// The method is kept as the raw wire string; the dispatcher decides whether
/// it names a known [`Method`](crate::Method).
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) method: String,
    pub(crate) path: String,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>, body: impl Into<Bytes>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Adds a header. Returns `self` for chaining.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    /// Buffers a hyper request. Header values that are not visible ASCII are dropped.
    pub(crate) async fn from_hyper<B>(req: hyper::Request<B>) -> Result<Self, B::Error>
    where
        B: hyper::body::Body,
    {
        let (parts, body) = req.into_parts();
        let body = body.collect().await?.to_bytes();
        let headers = parts.headers.iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_owned(), v.to_owned())))
            .collect();

        Ok(Self {
            method: parts.method.as_str().to_owned(),
            path: parts.uri.path().to_owned(),
            headers,
            body,
        })
    }

    pub fn method(&self) -> &str { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Numeric id taken from the last path segment.
    ///
    /// `/api/posts/42` yields `Some(42)`. A trailing slash, a non-numeric
    /// segment or a value outside `i64` yields `None`.
    pub fn id_param(&self) -> Option<i64> {
        let (_, last) = self.path.rsplit_once('/')?;
        last.parse().ok()
    }
}
