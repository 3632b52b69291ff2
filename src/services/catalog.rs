//! Catalog management service: authors, books, genres and languages

use chrono::Utc;
use sqlx::PgConnection;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetail, AuthorInput, AuthorQuery},
        book::{Book, BookDetail, BookInput, BookQuery, BookShort},
        book_instance::InstanceView,
        genre::{display_genre, Genre, Language, NameInput},
        CatalogCounts,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// Counts shown on the home page
    pub async fn counts(&self) -> AppResult<CatalogCounts> {
        self.repository.counts(&self.config.featured_title_term).await
    }

    /// Database connectivity probe used by the readiness check
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }

    // =========================================================================
    // BOOKS
    // =========================================================================

    pub async fn list_books(&self, query: &BookQuery) -> AppResult<(Vec<BookShort>, i64)> {
        let (limit, offset) = self.config.page_window(query.page, query.per_page);
        let title = query
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        self.repository.books.list(title, limit, offset).await
    }

    /// Book with author, language, genres and copies
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetail> {
        let book = self.repository.books.get_by_id(id).await?;

        let author = match book.author_id {
            Some(author_id) => self.repository.authors.find(author_id).await?,
            None => None,
        };
        let language = match book.language_id {
            Some(language_id) => self.repository.languages.find(language_id).await?,
            None => None,
        };
        let genres = self.repository.genres.for_book(id).await?;

        let today = Utc::now().date_naive();
        let instances = self
            .repository
            .instances
            .for_book(id)
            .await?
            .into_iter()
            .map(|row| InstanceView::from_row(row, today))
            .collect();

        Ok(BookDetail {
            genre_display: display_genre(&genres),
            book,
            author,
            language,
            genres,
            instances,
        })
    }

    pub async fn create_book(&self, input: BookInput) -> AppResult<Book> {
        input.check()?;
        let genre_ids = input.distinct_genre_ids();

        let mut tx = self.repository.pool.begin().await?;
        self.check_book_references(&mut tx, &input, &genre_ids).await?;
        let book = self.repository.books.create(&mut tx, &input).await?;
        self.repository.books.set_genres(&mut tx, book.id, &genre_ids).await?;
        tx.commit().await?;

        tracing::info!("Catalog: created book id={} title={:?}", book.id, book.title);
        Ok(book)
    }

    pub async fn update_book(&self, id: i32, input: BookInput) -> AppResult<Book> {
        input.check()?;
        let genre_ids = input.distinct_genre_ids();

        let mut tx = self.repository.pool.begin().await?;
        if !self.repository.books.exists(&mut tx, id).await? {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        self.check_book_references(&mut tx, &input, &genre_ids).await?;
        let book = self.repository.books.update(&mut tx, id, &input).await?;
        self.repository.books.set_genres(&mut tx, id, &genre_ids).await?;
        tx.commit().await?;

        tracing::info!("Catalog: updated book id={}", id);
        Ok(book)
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Catalog: deleted book id={}", id);
        Ok(())
    }

    /// Referenced author, language and genres must exist
    async fn check_book_references(
        &self,
        conn: &mut PgConnection,
        input: &BookInput,
        genre_ids: &[i32],
    ) -> AppResult<()> {
        if let Some(author_id) = input.author_id {
            if !self.repository.authors.exists(conn, author_id).await? {
                return Err(AppError::validation(
                    "author_id",
                    format!("Author with id {} does not exist", author_id),
                ));
            }
        }

        if let Some(language_id) = input.language_id {
            if !self.repository.languages.exists(conn, language_id).await? {
                return Err(AppError::validation(
                    "language_id",
                    format!("Language with id {} does not exist", language_id),
                ));
            }
        }

        if !genre_ids.is_empty() {
            let found = self.repository.genres.count_existing(conn, genre_ids).await?;
            if found != genre_ids.len() as i64 {
                return Err(AppError::validation("genre_ids", "Unknown genre id"));
            }
        }

        Ok(())
    }

    // =========================================================================
    // AUTHORS
    // =========================================================================

    pub async fn list_authors(&self, query: &AuthorQuery) -> AppResult<(Vec<Author>, i64)> {
        let (limit, offset) = self.config.page_window(query.page, query.per_page);
        self.repository.authors.list(limit, offset).await
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetail> {
        let author = self.repository.authors.get_by_id(id).await?;
        let books = self.repository.books.by_author(id).await?;
        Ok(AuthorDetail { author, books })
    }

    pub async fn create_author(&self, input: AuthorInput) -> AppResult<Author> {
        input.check()?;
        let author = self.repository.authors.create(&input).await?;
        tracing::info!("Catalog: created author id={} ({})", author.id, author);
        Ok(author)
    }

    pub async fn update_author(&self, id: i32, input: AuthorInput) -> AppResult<Author> {
        input.check()?;
        let author = self.repository.authors.update(id, &input).await?;
        tracing::info!("Catalog: updated author id={}", id);
        Ok(author)
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.repository.authors.delete(id).await?;
        tracing::info!("Catalog: deleted author id={}", id);
        Ok(())
    }

    // =========================================================================
    // GENRES & LANGUAGES
    // =========================================================================

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.repository.genres.list().await
    }

    pub async fn get_genre(&self, id: i32) -> AppResult<Genre> {
        self.repository.genres.get_by_id(id).await
    }

    pub async fn create_genre(&self, input: NameInput) -> AppResult<Genre> {
        input.check()?;
        let genre = self.repository.genres.create(input.name.trim()).await?;
        tracing::info!("Catalog: created genre id={}", genre.id);
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i32, input: NameInput) -> AppResult<Genre> {
        input.check()?;
        self.repository.genres.update(id, input.name.trim()).await
    }

    pub async fn delete_genre(&self, id: i32) -> AppResult<()> {
        self.repository.genres.delete(id).await?;
        tracing::info!("Catalog: deleted genre id={}", id);
        Ok(())
    }

    pub async fn list_languages(&self) -> AppResult<Vec<Language>> {
        self.repository.languages.list().await
    }

    pub async fn get_language(&self, id: i32) -> AppResult<Language> {
        self.repository.languages.get_by_id(id).await
    }

    pub async fn create_language(&self, input: NameInput) -> AppResult<Language> {
        input.check()?;
        let language = self.repository.languages.create(input.name.trim()).await?;
        tracing::info!("Catalog: created language id={}", language.id);
        Ok(language)
    }

    pub async fn update_language(&self, id: i32, input: NameInput) -> AppResult<Language> {
        input.check()?;
        self.repository.languages.update(id, input.name.trim()).await
    }

    pub async fn delete_language(&self, id: i32) -> AppResult<()> {
        self.repository.languages.delete(id).await?;
        tracing::info!("Catalog: deleted language id={}", id);
        Ok(())
    }
}
