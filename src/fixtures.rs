//! Test-only entity, DTO and mapper shared by unit tests.

use crate::entity::{Entity, Field, FieldKind};
use crate::mapper::Mapper;
use serde::{Deserialize, Serialize};
use validator::Validate;

const BOOK_FIELDS: &[Field] = &[
    Field::id(),
    Field::new("title", FieldKind::Text).required(),
    Field::new("author", FieldKind::Text),
    Field::new("pages", FieldKind::Int),
    Field::new("in_print", FieldKind::Bool),
    Field::new("published_on", FieldKind::Date),
];

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub pages: Option<i32>,
    pub in_print: Option<bool>,
    pub published_on: Option<chrono::NaiveDate>,
}

impl Book {
    pub fn new(id: i64, title: &str, author: Option<&str>, pages: Option<i32>) -> Self {
        Book {
            id: Some(id),
            title: Some(title.to_string()),
            author: author.map(str::to_string),
            pages,
            ..Book::default()
        }
    }

    pub fn unsaved(title: &str, author: Option<&str>, pages: Option<i32>) -> Self {
        Book {
            id: None,
            ..Book::new(0, title, author, pages)
        }
    }
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

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookDto {
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub author: Option<String>,
    #[validate(range(min = 1))]
    pub pages: Option<i32>,
}

pub struct BookMapper;

impl Mapper<Book, BookDto> for BookMapper {
    fn to_dto(&self, entity: &Book) -> BookDto {
        BookDto {
            id: entity.id,
            title: entity.title.clone(),
            author: entity.author.clone(),
            pages: entity.pages,
        }
    }

    fn to_entity(&self, dto: BookDto) -> Book {
        Book {
            id: dto.id,
            title: dto.title,
            author: dto.author,
            pages: dto.pages,
            ..Book::default()
        }
    }
}
