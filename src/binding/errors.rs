//! The error map a binding attempt produces.

use std::collections::BTreeMap;
use std::fmt;

use http::StatusCode;
use serde::Serialize;

use crate::response::{IntoResponse, Response};

/// What went wrong while binding.
///
/// The wire strings are part of the `400` contract: clients match on them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// A required field kept its zero value.
    Required,
    /// Malformed JSON, a JSON type mismatch, or malformed urlencoding.
    Deserialization,
    /// The body stream could not be read.
    Reader,
    IntegerType,
    BooleanType,
    FloatType,
}

impl ErrorKind {
    /// Returns the wire tag (e.g. `"DeserializationError"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Required        => "Required",
            Self::Deserialization => "DeserializationError",
            Self::Reader          => "ReaderError",
            Self::IntegerType     => "IntegerTypeError",
            Self::BooleanType     => "BooleanTypeError",
            Self::FloatType       => "FloatTypeError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything wrong with one request, split into errors about the request as
/// a whole and errors about a single field.
///
/// Serializes as `{"overall":{…},"fields":{…}}`. Maps are ordered so the
/// same request always produces the same body.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Errors {
    /// Error tag → message, e.g. `"DeserializationError" → "expected value at line 1 column 3"`.
    pub overall: BTreeMap<String, String>,
    /// Field name → error tag (or a custom validator's message).
    pub fields: BTreeMap<String, String>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total errors: overall plus per-field. Zero means the request bound cleanly.
    pub fn count(&self) -> usize {
        self.overall.len() + self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Records a request-level error. The first message for a kind sticks.
    pub fn add_overall(&mut self, kind: ErrorKind, message: impl Into<String>) {
        self.overall
            .entry(kind.as_str().to_owned())
            .or_insert_with(|| message.into());
    }

    /// Records `kind` against `field`, replacing whatever was there.
    pub fn add_field(&mut self, field: impl Into<String>, kind: ErrorKind) {
        self.set_field(field, kind.as_str());
    }

    /// Records `kind` against `field` unless `field` already has an error.
    pub fn add_field_once(&mut self, field: impl Into<String>, kind: ErrorKind) {
        self.fields
            .entry(field.into())
            .or_insert_with(|| kind.as_str().to_owned());
    }

    /// Records a free-form message against `field`, replacing whatever was
    /// there. Meant for [`Bindable::validate`](super::Bindable::validate).
    pub fn set_field(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.insert(field.into(), message.into());
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn overall(&self, kind: ErrorKind) -> Option<&str> {
        self.overall.get(kind.as_str()).map(String::as_str)
    }

    /// Merges `other` into `self`. Keys already present in `self` win.
    pub fn combine(&mut self, other: Errors) {
        for (key, val) in other.fields {
            self.fields.entry(key).or_insert(val);
        }
        for (key, val) in other.overall {
            self.overall.entry(key).or_insert(val);
        }
    }
}

/// `400 Bad Request` with the JSON-serialized errors as the body.
impl IntoResponse for Errors {
    fn into_response(self) -> Response {
        // Two string maps always serialize.
        let body = serde_json::to_vec(&self).unwrap_or_default();
        Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .json(body)
    }
}
