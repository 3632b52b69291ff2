//! Genre and language reference records

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppResult;

/// Book genre (e.g. Science Fiction, French Poetry)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Natural language a book is written in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Language {
    pub id: i32,
    pub name: String,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Create/update request for a genre or a language
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NameInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,
}

impl NameInput {
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        Ok(())
    }
}

/// Genre label shown in book listings: the first three names
pub fn display_genre(genres: &[Genre]) -> String {
    genres
        .iter()
        .take(3)
        .map(|g| g.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
