//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    Json,
};

use crate::{
    error::AppResult,
    models::author::{Author, AuthorDetail, AuthorInput, AuthorQuery},
};

use super::{books::PaginatedResponse, AppJson, Librarian};

/// List authors
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(AuthorQuery),
    responses(
        (status = 200, description = "Page of authors", body = super::books::AuthorPage)
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    Query(query): Query<AuthorQuery>,
) -> AppResult<Json<PaginatedResponse<Author>>> {
    let (authors, total) = state.services.catalog.list_authors(&query).await?;

    Ok(Json(PaginatedResponse::new(
        authors,
        total,
        query.page,
        query.per_page,
        &state.config.catalog,
    )))
}

/// Get author details (with their books) by ID
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AuthorDetail>> {
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Create a new author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorInput,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing catalog permission")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    AppJson(input): AppJson<AuthorInput>,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<Author>)> {
    let created = state.services.catalog.create_author(input).await?;
    let location = format!("{}/authors/{}", crate::router::API_PREFIX, created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// Update an existing author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = AuthorInput,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<i32>,
    AppJson(input): AppJson<AuthorInput>,
) -> AppResult<Json<Author>> {
    let updated = state.services.catalog.update_author(id, input).await?;
    Ok(Json(updated))
}

/// Delete an author; their books are kept without an author
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_author(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
