//! Books repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookInput, BookShort},
};

use super::contains_pattern;

const BOOK_COLUMNS: &str = "id, title, author_id, summary, isbn, language_id";

const BOOK_SHORT_SELECT: &str = r#"
    SELECT b.id, b.title, b.author_id,
           a.first_name || ', ' || a.last_name AS author_name
    FROM books b
    LEFT JOIN authors a ON a.id = b.author_id
"#;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Page of books, optionally filtered by a case-insensitive title
    /// substring, plus the total count for that filter
    pub async fn list(
        &self,
        title: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<BookShort>, i64)> {
        let pattern = title.map(contains_pattern);

        let books = sqlx::query_as::<_, BookShort>(&format!(
            r#"
            {}
            WHERE ($1::text IS NULL OR b.title ILIKE $1)
            ORDER BY b.title, b.id
            LIMIT $2 OFFSET $3
            "#,
            BOOK_SHORT_SELECT
        ))
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books b WHERE ($1::text IS NULL OR b.title ILIKE $1)",
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok((books, total))
    }

    pub async fn by_author(&self, author_id: i32) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(&format!(
            "{} WHERE b.author_id = $1 ORDER BY b.title, b.id",
            BOOK_SHORT_SELECT
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    // =========================================================================
    // WRITE (inside a caller-owned transaction)
    // =========================================================================

    pub async fn create(&self, conn: &mut PgConnection, book: &BookInput) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, language_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.language_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(created)
    }

    pub async fn update(&self, conn: &mut PgConnection, id: i32, book: &BookInput) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = $1, author_id = $2, summary = $3, isbn = $4, language_id = $5
            WHERE id = $6
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(book.author_id)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.language_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Replace the genre set of a book
    pub async fn set_genres(&self, conn: &mut PgConnection, book_id: i32, genre_ids: &[i32]) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *conn)
            .await?;

        if !genre_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO book_genres (book_id, genre_id)
                SELECT $1, genre_id FROM UNNEST($2::int[]) AS genre_id
                "#,
            )
            .bind(book_id)
            .bind(genre_ids)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Delete a book; its copies stay with no book
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn exists(&self, conn: &mut PgConnection, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists)
    }
}
