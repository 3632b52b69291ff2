//! Book (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppResult;

use super::{
    author::Author,
    book_instance::InstanceView,
    genre::{Genre, Language},
};

/// Book model from database. A book is the catalog entry, not a copy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    pub summary: String,
    pub isbn: String,
    pub language_id: Option<i32>,
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Short book representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub author_id: Option<i32>,
    /// "first_name, last_name" of the author, if any
    pub author_name: Option<String>,
}

/// Book with its resolved references and copies
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetail {
    pub book: Book,
    pub author: Option<Author>,
    pub language: Option<Language>,
    pub genres: Vec<Genre>,
    /// First three genre names, comma separated
    pub genre_display: String,
    pub instances: Vec<InstanceView>,
}

/// Create/update book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, max = 200, message = "Title must be 1 to 200 characters"))]
    pub title: String,
    pub author_id: Option<i32>,
    #[validate(length(max = 1000, message = "Summary must be at most 1000 characters"))]
    #[serde(default)]
    pub summary: String,
    #[validate(length(max = 13, message = "ISBN must be at most 13 characters"))]
    #[serde(default)]
    pub isbn: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
    pub language_id: Option<i32>,
}

impl BookInput {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        Ok(())
    }

    /// Genre ids without duplicates, in first-seen order
    pub fn distinct_genre_ids(&self) -> Vec<i32> {
        let mut ids = Vec::with_capacity(self.genre_ids.len());
        for id in &self.genre_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }
}

/// Book listing parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive title substring
    pub title: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn input() -> BookInput {
        BookInput {
            title: "The Dispossessed".into(),
            author_id: Some(1),
            summary: "An ambiguous utopia.".into(),
            isbn: "9780060512750".into(),
            genre_ids: vec![3, 1, 3],
            language_id: None,
        }
    }

    #[test]
    fn isbn_longer_than_thirteen_is_rejected() {
        let mut book = input();
        book.isbn = "97800605127501".into();
        match book.check() {
            Err(AppError::Validation { field, .. }) => assert_eq!(field, "isbn"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn summary_is_capped() {
        let mut book = input();
        book.summary = "a".repeat(1000);
        assert!(book.check().is_ok());
        book.summary.push('a');
        assert!(book.check().is_err());
    }

    #[test]
    fn genre_ids_are_deduplicated() {
        assert_eq!(input().distinct_genre_ids(), vec![3, 1]);
    }
}
