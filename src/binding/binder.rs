//! The binding pipeline: dispatch, deserialize, validate, combine.

use std::any::type_name;
use std::future::Future;

use bytes::Bytes;
use tracing::{debug, trace};

use super::config::Config;
use super::errors::{ErrorKind, Errors};
use super::form::FormData;
use super::schema::{Bindable, Schema};
use super::{json, validate};
use crate::error::Error;
use crate::request::Request;

const FORM_MARKER: &str = "form-urlencoded";
const JSON_MARKER: &str = "json";

/// A populated target together with everything wrong with it.
///
/// Handed to the handler behind [`binding::form`](fn@super::form) and
/// [`binding::json`](fn@super::json) as is; behind
/// [`binding::bind`](fn@super::bind) the handler only ever sees an empty
/// `errors`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bound<T> {
    pub value: T,
    pub errors: Errors,
}

impl<T> Bound<T> {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Which decoder a request's `Content-Type` selects.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dispatch {
    Form,
    Json,
    /// Neither marker present: JSON first, form if JSON produced any error.
    Guess,
}

impl Dispatch {
    pub fn for_content_type(content_type: &str) -> Self {
        if content_type.contains(FORM_MARKER) {
            Self::Form
        } else if content_type.contains(JSON_MARKER) {
            Self::Json
        } else {
            Self::Guess
        }
    }
}

/// Binds requests into `T`.
///
/// Builds `T`'s schema once; share one binder across every request on a
/// route. Each call starts from `T::default()` and a fresh [`Errors`].
pub struct Binder<T> {
    schema: Schema<T>,
    config: Config,
}

impl<T: Bindable> Binder<T> {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        Self { schema: Schema::of(), config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Picks a decoder from the `Content-Type` header and runs it.
    ///
    /// Without a recognizable content type the body is tried as JSON and,
    /// if that attempt reports anything (validation included), a fresh form
    /// attempt takes its place.
    pub fn bind<'a>(&'a self, req: &'a mut Request) -> impl Future<Output = Bound<T>> + Send + 'a {
        async move {
            let dispatch = Dispatch::for_content_type(req.content_type());
            trace!(target_type = type_name::<T>(), ?dispatch, "binding request");

            match dispatch {
                Dispatch::Form => self.form(req).await,
                Dispatch::Json => self.json(req).await,
                Dispatch::Guess => {
                    let body = req.read_body(self.config.body_limit()).await;
                    let attempt = self.decode_json(req, body);
                    if attempt.is_ok() {
                        return attempt;
                    }
                    debug!(
                        target_type = type_name::<T>(),
                        errors = attempt.errors.count(),
                        "json attempt failed, retrying as form"
                    );
                    self.decode_form(req, None)
                }
            }
        }
    }

    /// Binds query-string pairs, plus body pairs when the request declares a
    /// urlencoded body. Any other body is discarded unread.
    pub fn form<'a>(&'a self, req: &'a mut Request) -> impl Future<Output = Bound<T>> + Send + 'a {
        async move {
            let body = if req.content_type().contains(FORM_MARKER) {
                Some(req.read_body(self.config.body_limit()).await)
            } else {
                req.discard_body();
                None
            };
            self.decode_form(req, body)
        }
    }

    /// Binds a JSON body.
    pub fn json<'a>(&'a self, req: &'a mut Request) -> impl Future<Output = Bound<T>> + Send + 'a {
        async move {
            let body = req.read_body(self.config.body_limit()).await;
            self.decode_json(req, body)
        }
    }

    /// Required-field walk, then `T`'s own [`Bindable::validate`]. A required
    /// error keeps its key even if the custom check reports the same field.
    pub fn validate(&self, value: &T, req: &Request) -> Errors {
        let mut errors = Errors::new();
        validate::required(&self.schema, value, &mut errors);

        let mut custom = Errors::new();
        value.validate(&mut custom, req);
        errors.combine(custom);
        errors
    }

    fn decode_form(&self, req: &Request, body: Option<Result<Bytes, Error>>) -> Bound<T> {
        let mut errors = Errors::new();

        let body = match body {
            Some(Ok(bytes)) => Some(bytes),
            Some(Err(e)) => {
                errors.add_overall(ErrorKind::Reader, e.to_string());
                None
            }
            None => None,
        };

        let (form, parse_err) = FormData::parse(req.query(), body.as_deref());
        if let Some(e) = parse_err {
            errors.add_overall(ErrorKind::Deserialization, e);
        }

        let mut value = T::default();
        for field in self.schema.fields().iter().filter(|f| !f.is_ignored()) {
            let Some(key) = field.form_key() else { continue };
            let Some(raw) = form.get_all(key) else { continue };
            if let Err(kind) = field.set_form(&mut value, raw) {
                errors.add_field_once(key, kind);
            }
        }

        self.finish(req, value, errors)
    }

    fn decode_json(&self, req: &Request, body: Result<Bytes, Error>) -> Bound<T> {
        let mut errors = Errors::new();
        let mut value = T::default();

        match body {
            Ok(bytes) => json::decode(&self.schema, &mut value, &bytes, &mut errors),
            Err(e) => errors.add_overall(ErrorKind::Reader, e.to_string()),
        }

        self.finish(req, value, errors)
    }

    fn finish(&self, req: &Request, value: T, mut errors: Errors) -> Bound<T> {
        errors.combine(self.validate(&value, req));
        Bound { value, errors }
    }
}

impl<T: Bindable> Default for Binder<T> {
    fn default() -> Self { Self::new() }
}
