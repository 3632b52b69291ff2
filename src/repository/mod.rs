//! Repository layer for database operations

pub mod authors;
pub mod books;
pub mod genres;
pub mod instances;
pub mod languages;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::CatalogCounts};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub genres: genres::GenresRepository,
    pub languages: languages::LanguagesRepository,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
    pub instances: instances::InstancesRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            genres: genres::GenresRepository::new(pool.clone()),
            languages: languages::LanguagesRepository::new(pool.clone()),
            authors: authors::AuthorsRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            instances: instances::InstancesRepository::new(pool.clone()),
            users: users::UsersRepository,
            pool,
        }
    }

    /// Home page counts in a single round trip
    pub async fn counts(&self, title_term: &str) -> AppResult<CatalogCounts> {
        let row: (i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM books),
                (SELECT COUNT(*) FROM book_instances),
                (SELECT COUNT(*) FROM book_instances WHERE status = 'a'),
                (SELECT COUNT(*) FROM authors),
                (SELECT COUNT(*) FROM genres),
                (SELECT COUNT(*) FROM books WHERE title ILIKE $1)
            "#,
        )
        .bind(contains_pattern(title_term))
        .fetch_one(&self.pool)
        .await?;

        Ok(CatalogCounts {
            num_books: row.0,
            num_instances: row.1,
            num_instances_available: row.2,
            num_authors: row.3,
            num_genres: row.4,
            num_books_with_term: row.5,
        })
    }

    /// Database connectivity probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// `ILIKE` pattern matching `term` anywhere, with wildcards in `term`
/// taken literally
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
