//! Book entity, its DTO and the mapper between them.

use chrono::{DateTime, Utc};
use crud_sdk::{Entity, Field, FieldKind, Mapper};
use serde::{Deserialize, Serialize};
use validator::Validate;

const BOOK_FIELDS: &[Field] = &[
    Field::id(),
    Field::new("title", FieldKind::Text).required(),
    Field::new("author", FieldKind::Text),
    Field::new("isbn", FieldKind::Text),
    Field::new("pages", FieldKind::Int),
    Field::new("price", FieldKind::Double),
    Field::new("in_print", FieldKind::Bool),
    Field::new("created_at", FieldKind::Timestamp),
];

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub pages: Option<i32>,
    pub price: Option<f64>,
    pub in_print: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
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

#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    #[validate(length(max = 200))]
    pub author: Option<String>,
    #[validate(length(min = 10, max = 17))]
    pub isbn: Option<String>,
    #[validate(range(min = 1))]
    pub pages: Option<i32>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub in_print: Option<bool>,
}

pub struct BookMapper;

impl Mapper<Book, BookDto> for BookMapper {
    fn to_dto(&self, book: &Book) -> BookDto {
        BookDto {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            pages: book.pages,
            price: book.price,
            in_print: book.in_print,
        }
    }

    /// `created_at` is set only for new books; updates leave the stored value alone.
    fn to_entity(&self, dto: BookDto) -> Book {
        Book {
            created_at: dto.id.is_none().then(Utc::now),
            id: dto.id,
            title: dto.title,
            author: dto.author,
            isbn: dto.isbn,
            pages: dto.pages,
            price: dto.price,
            in_print: dto.in_print,
        }
    }
}
