//! Route adapters: wrap a handler so it receives a bound value.
//!
//! ```text
//! router.post("/posts", binding::bind(create_post))
//!        ↓ request arrives
//! Binder::bind(&mut req)                 ← dispatch, decode, validate
//!        ↓ errors?  → 400 + JSON, create_post never runs
//! create_post(req, Bound { value, errors })
//! ```

use std::any::type_name;
use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use super::binder::{Binder, Bound};
use super::config::Config;
use super::errors::Errors;
use super::schema::Bindable;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler, private};
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// How a [`Bind`] adapter decodes and what it does with errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Mode {
    /// Content-type dispatch; 400 on any error.
    Bind,
    /// Form only; errors passed through.
    Form,
    /// JSON only; errors passed through.
    Json,
}

/// A handler wrapped in binding middleware. Built by [`bind`], [`form`] or
/// [`json`]; register it on a [`Router`](crate::Router) like any handler.
pub struct Bind<T, H> {
    binder: Arc<Binder<T>>,
    handler: Arc<H>,
    mode: Mode,
}

impl<T: Bindable, H> Bind<T, H> {
    fn new(handler: H, mode: Mode) -> Self {
        Self { binder: Arc::new(Binder::new()), handler: Arc::new(handler), mode }
    }

    /// Replaces the default [`Config`] for this route.
    pub fn with_config(mut self, config: Config) -> Self {
        self.binder = Arc::new(Binder::with_config(config));
        self
    }
}

/// Binds the request by content type and calls `handler` with the result.
/// Any error short-circuits with `400 Bad Request` and a JSON body; the
/// handler never runs.
///
/// ```rust,no_run
/// use tsu_binding::{Request, Response, Router, binding};
/// use tsu_binding::binding::{Bindable, Bound, Schema};
///
/// #[derive(Default)]
/// struct BlogPost { title: String }
///
/// impl Bindable for BlogPost {
///     fn describe(schema: &mut Schema<Self>) {
///         schema.field("Title", |p| &p.title, |p| &mut p.title).key("title").required();
///     }
/// }
///
/// async fn create_post(_req: Request, post: Bound<BlogPost>) -> Response {
///     Response::text(post.value.title)
/// }
///
/// let app = Router::new().post("/posts", binding::bind(create_post));
/// ```
pub fn bind<T, H, Fut, R>(handler: H) -> Bind<T, H>
where
    T: Bindable,
    H: Fn(Request, Bound<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    Bind::new(handler, Mode::Bind)
}

/// Binds form data and calls `handler` even when there were errors.
pub fn form<T, H, Fut, R>(handler: H) -> Bind<T, H>
where
    T: Bindable,
    H: Fn(Request, Bound<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    Bind::new(handler, Mode::Form)
}

/// Binds a JSON body and calls `handler` even when there were errors.
pub fn json<T, H, Fut, R>(handler: H) -> Bind<T, H>
where
    T: Bindable,
    H: Fn(Request, Bound<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    Bind::new(handler, Mode::Json)
}

/// The error handler: `Some(400 response)` when `errors` is non-empty.
pub fn reject(errors: &Errors) -> Option<Response> {
    if errors.is_empty() {
        return None;
    }
    Some(errors.clone().into_response())
}

impl<T, H, Fut, R> private::Sealed for Bind<T, H>
where
    T: Bindable,
    H: Fn(Request, Bound<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<T, H, Fut, R> Handler for Bind<T, H>
where
    T: Bindable,
    H: Fn(Request, Bound<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

impl<T, H, Fut, R> ErasedHandler for Bind<T, H>
where
    T: Bindable,
    H: Fn(Request, Bound<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, mut req: Request) -> BoxFuture {
        let binder = Arc::clone(&self.binder);
        let handler = Arc::clone(&self.handler);
        let mode = self.mode;

        Box::pin(async move {
            let bound = match mode {
                Mode::Bind => binder.bind(&mut req).await,
                Mode::Form => binder.form(&mut req).await,
                Mode::Json => binder.json(&mut req).await,
            };

            if mode == Mode::Bind {
                if let Some(rejection) = reject(&bound.errors) {
                    debug!(
                        target_type = type_name::<T>(),
                        errors = bound.errors.count(),
                        path = req.path(),
                        "request rejected"
                    );
                    return rejection;
                }
            }

            (*handler)(req, bound).await.into_response()
        })
    }
}
