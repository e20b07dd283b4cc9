//! # tsu-binding
//!
//! Request binding and validation middleware for the tsu HTTP framework,
//! shipped together with the small framework surface it runs on.
//!
//! ## The contract
//!
//! A handler should receive a typed, validated value or never run at all.
//! Wrap it in [`binding::bind`] and the middleware:
//!
//! - decodes form data (query string + urlencoded body) or a JSON body,
//!   picked by `Content-Type`,
//! - checks required fields and runs your own validation hook,
//! - answers `400 Bad Request` with a JSON error map when anything is wrong.
//!
//! No reflection: each target type lists its fields once in
//! [`binding::Bindable::describe`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tsu_binding::{Request, Response, Router, Server, binding};
//! use tsu_binding::binding::{Bindable, Bound, Schema};
//!
//! #[derive(Default)]
//! struct BlogPost {
//!     title: String,
//!     content: String,
//! }
//!
//! impl Bindable for BlogPost {
//!     fn describe(schema: &mut Schema<Self>) {
//!         schema.field("Title", |p| &p.title, |p| &mut p.title).key("title").required();
//!         schema.field("Content", |p| &p.content, |p| &mut p.content).key("content");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new().post("/posts", binding::bind(create_post));
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn create_post(_req: Request, post: Bound<BlogPost>) -> Response {
//!     // Only reached when `title` was present and non-empty.
//!     Response::text(post.value.title)
//! }
//! ```

mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;

pub mod binding;

pub use error::{BoxError, Error};
pub use handler::Handler;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
