//! Genre endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::genre::{Genre, NameInput},
};

use super::{AppJson, Librarian};

/// List every genre
#[utoipa::path(
    get,
    path = "/genres",
    tag = "genres",
    responses(
        (status = 200, description = "All genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}

/// Get a genre by ID
#[utoipa::path(
    get,
    path = "/genres/{id}",
    tag = "genres",
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    responses(
        (status = 200, description = "Genre", body = Genre),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn get_genre(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Genre>> {
    let genre = state.services.catalog.get_genre(id).await?;
    Ok(Json(genre))
}

/// Create a genre
#[utoipa::path(
    post,
    path = "/genres",
    tag = "genres",
    security(("bearer_auth" = [])),
    request_body = NameInput,
    responses(
        (status = 201, description = "Genre created", body = Genre),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing catalog permission")
    )
)]
pub async fn create_genre(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    AppJson(input): AppJson<NameInput>,
) -> AppResult<(StatusCode, Json<Genre>)> {
    let created = state.services.catalog.create_genre(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Rename a genre
#[utoipa::path(
    put,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    request_body = NameInput,
    responses(
        (status = 200, description = "Genre updated", body = Genre),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn update_genre(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<i32>,
    AppJson(input): AppJson<NameInput>,
) -> AppResult<Json<Genre>> {
    let updated = state.services.catalog.update_genre(id, input).await?;
    Ok(Json(updated))
}

/// Delete a genre (books lose the genre, nothing else)
#[utoipa::path(
    delete,
    path = "/genres/{id}",
    tag = "genres",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Genre ID")
    ),
    responses(
        (status = 204, description = "Genre deleted"),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Genre not found")
    )
)]
pub async fn delete_genre(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_genre(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
