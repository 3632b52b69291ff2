//! Users (borrowers) repository for database operations

use sqlx::PgConnection;

use crate::error::AppResult;

/// Accounts are owned by the identity provider; the catalog only checks
/// that a borrower reference resolves.
#[derive(Clone, Default)]
pub struct UsersRepository;

impl UsersRepository {
    pub async fn exists(&self, conn: &mut PgConnection, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists)
    }
}
