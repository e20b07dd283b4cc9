//! Request binding and validation.
//!
//! Turns a raw request into a populated value before your handler runs:
//!
//! 1. **Dispatch** on `Content-Type`: `form-urlencoded` → form,
//!    `json` → JSON, anything else → JSON, then form if JSON failed.
//! 2. **Deserialize** into `T::default()` using the fields `T` declared in
//!    [`Bindable::describe`].
//! 3. **Validate**: required fields must not keep their zero value, then
//!    [`Bindable::validate`] runs.
//! 4. **Combine** both phases; the first error recorded for a key wins.
//! 5. **Publish** the result as [`Bound<T>`], or with [`bind`] answer
//!    `400 Bad Request` and stop.
//!
//! Every client mistake ends up in the same [`Errors`] map:
//!
//! ```json
//! {"overall":{"DeserializationError":"expected value at line 1 column 3"},
//!  "fields":{"Title":"Required","views":"IntegerTypeError"}}
//! ```

mod binder;
mod config;
mod errors;
mod form;
mod json;
mod middleware;
mod schema;
mod validate;

pub use binder::{Binder, Bound, Dispatch};
pub use config::{Config, DEFAULT_MAX_BODY_SIZE};
pub use errors::{ErrorKind, Errors};
pub use form::{FormData, FormValue, Scalar};
pub use middleware::{Bind, bind, form, json, reject};
pub use schema::{Bindable, Field, IGNORE, Schema};
