//! Book (catalog) endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::CatalogConfig,
    error::AppResult,
    models::{
        author::Author,
        book::{Book, BookDetail, BookInput, BookQuery, BookShort},
        book_instance::InstanceView,
    },
};

use super::{AppJson, Librarian};

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
#[aliases(
    BookPage = PaginatedResponse<BookShort>,
    AuthorPage = PaginatedResponse<Author>,
    LoanPage = PaginatedResponse<InstanceView>
)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Entries of the requested page
    pub items: Vec<T>,
    /// Total number of entries
    pub total: i64,
    /// Current page number
    pub page: i64,
    /// Entries per page
    pub per_page: i64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(
        items: Vec<T>,
        total: i64,
        page: Option<i64>,
        per_page: Option<i64>,
        catalog: &CatalogConfig,
    ) -> Self {
        let (limit, offset) = catalog.page_window(page, per_page);
        Self {
            items,
            total,
            page: offset / limit + 1,
            per_page: limit,
        }
    }
}

/// List books, optionally filtered by title
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Page of books", body = BookPage)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<PaginatedResponse<BookShort>>> {
    let (books, total) = state.services.catalog.list_books(&query).await?;

    Ok(Json(PaginatedResponse::new(
        books,
        total,
        query.page,
        query.per_page,
        &state.config.catalog,
    )))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BookDetail>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookInput,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing catalog permission")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    AppJson(input): AppJson<BookInput>,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<Book>)> {
    let created = state.services.catalog.create_book(input).await?;
    let location = format!("{}/books/{}", crate::router::API_PREFIX, created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// Update an existing book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookInput,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<i32>,
    AppJson(input): AppJson<BookInput>,
) -> AppResult<Json<Book>> {
    let updated = state.services.catalog.update_book(id, input).await?;
    Ok(Json(updated))
}

/// Delete a book; its copies are kept without a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
