//! Incoming HTTP request type.

use std::collections::HashMap;
use std::future::Future;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::request::Parts;
use http::{HeaderMap, Method, Uri};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, LengthLimitError, Limited};
use hyper::body::Body;

use crate::error::{BoxError, Error};

/// Type-erased request body. Whatever the server (or a test) hands us is
/// boxed into this so handlers never carry a body type parameter.
pub(crate) type RequestBody = UnsyncBoxBody<Bytes, BoxError>;

/// An incoming HTTP request.
///
/// The body stays a stream until somebody asks for it. The binding
/// middleware moves it out with [`Request::read_body`]; handlers further down
/// the chain then see an empty body.
pub struct Request {
    head: Parts,
    body: RequestBody,
    params: HashMap<String, String>,
}

impl Request {
    /// Wraps any `http::Request` whose body yields [`Bytes`].
    ///
    /// ```rust
    /// use bytes::Bytes;
    /// use http_body_util::Full;
    /// use tsu_binding::Request;
    ///
    /// let req = Request::from_http(
    ///     http::Request::post("/posts")
    ///         .header("content-type", "application/json")
    ///         .body(Full::new(Bytes::from_static(br#"{"title":"hi"}"#)))
    ///         .unwrap(),
    /// );
    /// assert_eq!(req.content_type(), "application/json");
    /// ```
    pub fn from_http<B>(req: http::Request<B>) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        let (head, body) = req.into_parts();
        Self {
            head,
            body: body.map_err(Into::into).boxed_unsync(),
            params: HashMap::new(),
        }
    }

    pub fn method(&self) -> &Method { &self.head.method }
    pub fn uri(&self) -> &Uri { &self.head.uri }
    pub fn path(&self) -> &str { self.head.uri.path() }
    pub fn query(&self) -> Option<&str> { self.head.uri.query() }
    pub fn headers(&self) -> &HeaderMap { &self.head.headers }

    /// Case-insensitive header lookup. Values that are not visible ASCII
    /// read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The `Content-Type` header, or `""` when there is none.
    pub fn content_type(&self) -> &str {
        self.head
            .headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/posts/{id}`, `req.param("id")` on `/posts/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    /// Moves the body stream out, leaving an empty body behind.
    pub(crate) fn take_body(&mut self) -> RequestBody {
        std::mem::replace(&mut self.body, empty_body())
    }

    /// Reads the whole body into memory, refusing more than `limit` bytes.
    ///
    /// The stream is moved out of the request when this is called, so it is
    /// dropped when the returned future completes (or is dropped) whether or
    /// not reading succeeded.
    pub fn read_body(
        &mut self,
        limit: usize,
    ) -> impl Future<Output = Result<Bytes, Error>> + Send + use<> {
        // Boxed as `dyn Future + Send` outside the async block so the `Send`
        // check does not run into a higher-ranked `From` bound on `Limited`.
        let collect: std::pin::Pin<
            Box<dyn Future<Output = Result<http_body_util::Collected<Bytes>, BoxError>> + Send>,
        > = Box::pin(Limited::new(self.take_body(), limit).collect());
        async move {
            match collect.await {
                Ok(collected) => Ok(collected.to_bytes()),
                Err(e) if e.is::<LengthLimitError>() => Err(Error::BodyTooLarge { limit }),
                Err(e) => Err(Error::Body(e)),
            }
        }
    }

    /// Drops the body stream unread.
    pub fn discard_body(&mut self) {
        drop(self.take_body());
    }
}

fn empty_body() -> RequestBody {
    Empty::new().map_err(|never| match never {}).boxed_unsync()
}

#[cfg(test)]
mod tests {
    use http_body_util::Full;

    use super::*;

    fn post(uri: &str, body: &'static str) -> Request {
        Request::from_http(
            http::Request::post(uri)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Full::new(Bytes::from_static(body.as_bytes())))
                .unwrap(),
        )
    }

    #[test]
    fn head_accessors() {
        let req = post("/posts?tag=a&tag=b", "");
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.uri().path(), "/posts");
        assert_eq!(req.path(), "/posts");
        assert_eq!(req.query(), Some("tag=a&tag=b"));
        assert_eq!(req.headers().len(), 1);
        assert_eq!(req.header("content-type"), Some("application/x-www-form-urlencoded"));
        assert_eq!(req.content_type(), "application/x-www-form-urlencoded");
        assert_eq!(req.param("id"), None);
    }

    #[tokio::test]
    async fn body_is_read_once() {
        let mut req = post("/posts", "title=Hello");
        assert_eq!(req.read_body(64).await.unwrap(), "title=Hello");
        assert!(req.read_body(64).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn body_over_limit_is_refused() {
        let mut req = post("/posts", "title=Hello");
        let err = req.read_body(4).await.unwrap_err();
        assert!(matches!(err, Error::BodyTooLarge { limit: 4 }));
    }

    #[tokio::test]
    async fn discarded_body_reads_empty() {
        let mut req = post("/posts", "title=Hello");
        req.discard_body();
        assert!(req.read_body(64).await.unwrap().is_empty());
    }
}
