#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use crud_sdk::{
    common_routes, crud_routes, layered, CrudService, CrudState, Entity, Field, FieldKind, Mapper, MemoryRepository,
    PagingConfig, ServerConfig,
};
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tower::ServiceExt;
use validator::Validate;

pub const BASE: &str = "/api/books";

const BOOK_FIELDS: &[Field] = &[
    Field::id(),
    Field::new("title", FieldKind::Text).required(),
    Field::new("author", FieldKind::Text),
    Field::new("pages", FieldKind::Int),
    Field::new("in_print", FieldKind::Bool),
];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub pages: Option<i32>,
    pub in_print: Option<bool>,
}

impl Entity for Book {
    const NAME: &'static str = "Book";
    const TABLE: &'static str = "books";

    fn fields() -> &'static [Field] {
        BOOK_FIELDS
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub author: Option<String>,
    #[validate(range(min = 1))]
    pub pages: Option<i32>,
    pub in_print: Option<bool>,
}

pub struct BookMapper;

impl Mapper<Book, BookDto> for BookMapper {
    fn to_dto(&self, b: &Book) -> BookDto {
        BookDto {
            id: b.id,
            title: b.title.clone(),
            author: b.author.clone(),
            pages: b.pages,
            in_print: b.in_print,
        }
    }

    fn to_entity(&self, d: BookDto) -> Book {
        Book {
            id: d.id,
            title: d.title,
            author: d.author,
            pages: d.pages,
            in_print: d.in_print,
        }
    }
}

/// Test config: local defaults, 64 KiB body limit.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "postgres://localhost/crud_test".into(),
        host: "127.0.0.1".into(),
        port: 0,
        max_connections: 1,
        max_body_bytes: 64 * 1024,
        paging: PagingConfig::default(),
    }
}

/// Full router over an in-memory repository, with the same layers a server uses.
/// Returns the repository so tests can seed or inspect it directly.
pub fn build_app() -> (Router, MemoryRepository<Book>) {
    build_app_with(test_config())
}

pub fn build_app_with(config: ServerConfig) -> (Router, MemoryRepository<Book>) {
    let repo = MemoryRepository::new();
    let service = CrudService::new(repo.clone()).with_paging(config.paging.clone());
    let router = Router::new()
        .nest(BASE, crud_routes(CrudState::new(service, BookMapper)))
        .merge(common_routes(None));
    (layered(router, &config), repo)
}

pub fn book(title: &str, author: Option<&str>, pages: Option<i32>) -> Book {
    Book {
        title: Some(title.into()),
        author: author.map(Into::into),
        pages,
        ..Book::default()
    }
}

/// Seeds five books with ids 1..=5.
pub async fn seed(repo: &MemoryRepository<Book>) {
    use crud_sdk::Repository;
    repo.save_all(vec![
        book("Dune", Some("Frank Herbert"), Some(412)),
        book("Solaris", Some("Stanislaw Lem"), Some(204)),
        book("Anathem", Some("Neal Stephenson"), Some(937)),
        book("Kindred", Some("Octavia Butler"), Some(264)),
        book("Hyperion", Some("Dan Simmons"), Some(482)),
    ])
    .await
    .unwrap();
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body.to_string())).await
}

pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

async fn send(app: Router, method: Method, uri: &str, body: Option<String>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_LENGTH, body.len())
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
