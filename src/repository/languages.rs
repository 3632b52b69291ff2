//! Languages repository for database operations

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::Language,
};

#[derive(Clone)]
pub struct LanguagesRepository {
    pool: Pool<Postgres>,
}

impl LanguagesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Language>> {
        let languages =
            sqlx::query_as::<_, Language>("SELECT id, name FROM languages ORDER BY name, id")
                .fetch_all(&self.pool)
                .await?;
        Ok(languages)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Language> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Language with id {} not found", id)))
    }

    pub async fn find(&self, id: i32) -> AppResult<Option<Language>> {
        let language = sqlx::query_as::<_, Language>("SELECT id, name FROM languages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(language)
    }

    pub async fn create(&self, name: &str) -> AppResult<Language> {
        let language = sqlx::query_as::<_, Language>(
            "INSERT INTO languages (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(language)
    }

    pub async fn update(&self, id: i32, name: &str) -> AppResult<Language> {
        sqlx::query_as::<_, Language>(
            "UPDATE languages SET name = $1 WHERE id = $2 RETURNING id, name",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Language with id {} not found", id)))
    }

    /// Delete a language; books written in it keep existing with no language
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM languages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Language with id {} not found", id)));
        }
        Ok(())
    }

    pub async fn exists(&self, conn: &mut PgConnection, id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM languages WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists)
    }
}
