//! Author model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

use super::book::BookShort;

/// Full author model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl std::fmt::Display for Author {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.first_name, self.last_name)
    }
}

/// Author with the books referencing them
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuthorDetail {
    pub author: Author,
    pub books: Vec<BookShort>,
}

/// Create/update author request. Omitted dates stay unset.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AuthorInput {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl AuthorInput {
    /// Field validation plus the lifespan ordering rule
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;

        if let (Some(born), Some(died)) = (self.date_of_birth, self.date_of_death) {
            if born > died {
                return Err(AppError::validation(
                    "date_of_death",
                    "Date of death must not precede date of birth",
                ));
            }
        }

        Ok(())
    }
}

/// Author listing parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AuthorQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
