//! Blog-post API guarded by binding middleware.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example blog
//!
//! Try:
//!   curl -i -X POST http://localhost:3000/posts \
//!        -H 'content-type: application/json' \
//!        -d '{"title":"Hello","content":"First post","tags":["intro"]}'
//!   curl -i -X POST http://localhost:3000/posts \
//!        -d 'content=no+title&tag=a&tag=b'
//!   curl -i 'http://localhost:3000/search?q=rust&page=two'
//!   curl -i http://localhost:3000/posts/42

use http::StatusCode;
use tsu_binding::binding::{self, Bindable, Bound, Errors, Schema};
use tsu_binding::{Request, Response, Router, Server};

#[derive(Debug, Default, PartialEq)]
struct BlogPost {
    title: String,
    content: String,
    tags: Vec<String>,
}

impl Bindable for BlogPost {
    fn describe(schema: &mut Schema<Self>) {
        schema.field("Title", |p| &p.title, |p| &mut p.title).key("title").required();
        schema.field("Content", |p| &p.content, |p| &mut p.content).key("content");
        schema.field("Tags", |p| &p.tags, |p| &mut p.tags).form("tag").json("tags");
    }

    fn validate(&self, errors: &mut Errors, _req: &Request) {
        if self.content.len() > 1024 {
            errors.set_field("Content", "Content too long");
        }
    }
}

#[derive(Debug, Default, PartialEq)]
struct Search {
    query: String,
    page: u32,
}

impl Bindable for Search {
    fn describe(schema: &mut Schema<Self>) {
        schema.field("Query", |s| &s.query, |s| &mut s.query).form("q");
        schema.field("Page", |s| &s.page, |s| &mut s.page).form("page");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .post("/posts",     binding::bind(create_post))
        .get("/search",     binding::form(search))
        .get("/posts/{id}", show_post);

    if let Err(e) = Server::bind("0.0.0.0:3000").serve(app).await {
        tracing::error!("server error: {e}");
    }
}

// POST /posts: only reached with a valid post.
async fn create_post(_req: Request, post: Bound<BlogPost>) -> Response {
    let BlogPost { title, tags, .. } = post.value;
    Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/posts/99")
        .text(format!("created {title:?} tagged {tags:?}"))
}

// GET /search: binding errors are the handler's call here.
async fn search(_req: Request, search: Bound<Search>) -> Response {
    if let Some(rejection) = binding::reject(&search.errors) {
        return rejection;
    }
    Response::text(format!("page {} of {:?}", search.value.page.max(1), search.value.query))
}

async fn show_post(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::text(format!("post {id}"))
}
