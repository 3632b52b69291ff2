//! Book instances (copies) repository for database operations

use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::book_instance::{BookInstance, InstanceInput, InstanceRow, LoanStatus},
};

const INSTANCE_COLUMNS: &str = "id, book_id, imprint, due_back, borrower_id, status";

const INSTANCE_ROW_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint, bi.due_back,
           bi.borrower_id, u.username AS borrower_username, bi.status
    FROM book_instances bi
    LEFT JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

/// Listing order for copies: due date ascending, undated copies first
const INSTANCE_ORDER: &str = "ORDER BY bi.due_back ASC NULLS FIRST, bi.id";

#[derive(Clone)]
pub struct InstancesRepository {
    pool: Pool<Postgres>,
}

impl InstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub async fn get_row(&self, id: Uuid) -> AppResult<InstanceRow> {
        sqlx::query_as::<_, InstanceRow>(&format!("{} WHERE bi.id = $1", INSTANCE_ROW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Copies of a book in listing order
    pub async fn for_book(&self, book_id: i32) -> AppResult<Vec<InstanceRow>> {
        let rows = sqlx::query_as::<_, InstanceRow>(&format!(
            "{} WHERE bi.book_id = $1 {}",
            INSTANCE_ROW_SELECT, INSTANCE_ORDER
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Page of copies with `status`, optionally restricted to one borrower,
    /// in listing order, plus the total count for that filter
    pub async fn list_by_status(
        &self,
        status: LoanStatus,
        borrower_id: Option<i32>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<InstanceRow>, i64)> {
        let rows = sqlx::query_as::<_, InstanceRow>(&format!(
            r#"
            {}
            WHERE bi.status = $1 AND ($2::int IS NULL OR bi.borrower_id = $2)
            {}
            LIMIT $3 OFFSET $4
            "#,
            INSTANCE_ROW_SELECT, INSTANCE_ORDER
        ))
        .bind(status)
        .bind(borrower_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM book_instances bi
            WHERE bi.status = $1 AND ($2::int IS NULL OR bi.borrower_id = $2)
            "#,
        )
        .bind(status)
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;

        Ok((rows, total))
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    pub async fn create(&self, conn: &mut PgConnection, instance: &BookInstance) -> AppResult<BookInstance> {
        let created = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, borrower_id, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            INSTANCE_COLUMNS
        ))
        .bind(instance.id)
        .bind(instance.book_id)
        .bind(&instance.imprint)
        .bind(instance.due_back)
        .bind(instance.borrower_id)
        .bind(instance.status)
        .fetch_one(&mut *conn)
        .await?;
        Ok(created)
    }

    /// Overwrite every field but the identifier
    pub async fn update(&self, conn: &mut PgConnection, id: Uuid, input: &InstanceInput) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            UPDATE book_instances
            SET book_id = $1, imprint = $2, due_back = $3, borrower_id = $4, status = $5
            WHERE id = $6
            RETURNING {}
            "#,
            INSTANCE_COLUMNS
        ))
        .bind(input.book_id)
        .bind(&input.imprint)
        .bind(input.due_back)
        .bind(input.borrower_id)
        .bind(input.status)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    /// Lock a copy for the rest of the transaction
    pub async fn lock(&self, conn: &mut PgConnection, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances WHERE id = $1 FOR UPDATE",
            INSTANCE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    pub async fn set_due_back(&self, conn: &mut PgConnection, id: Uuid, due_back: NaiveDate) -> AppResult<()> {
        sqlx::query("UPDATE book_instances SET due_back = $1 WHERE id = $2")
            .bind(due_back)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book instance {} not found", id)));
        }
        Ok(())
    }
}
