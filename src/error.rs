//! Unified error type.

/// Boxed error produced by a request body stream.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by tsu-binding's fallible operations.
///
/// Client mistakes (malformed JSON, a missing required field, a form value
/// that is not a number) are never an `Error`: the binder folds them into
/// [`Errors`](crate::binding::Errors) and answers `400 Bad Request`. This type
/// surfaces infrastructure failures: binding a port, accepting a connection,
/// or pulling bytes off a request body.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("body: {0}")]
    Body(BoxError),

    #[error("body exceeds the {limit} byte limit")]
    BodyTooLarge { limit: usize },
}
