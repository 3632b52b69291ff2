//! Language endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{Language, NameInput},
};

use super::{AppJson, Librarian};

/// List every language
#[utoipa::path(
    get,
    path = "/languages",
    tag = "languages",
    responses(
        (status = 200, description = "All languages", body = Vec<Language>)
    )
)]
pub async fn list_languages(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Language>>> {
    let languages = state.services.catalog.list_languages().await?;
    Ok(Json(languages))
}

/// Get a language by ID
#[utoipa::path(
    get,
    path = "/languages/{id}",
    tag = "languages",
    params(
        ("id" = i32, Path, description = "Language ID")
    ),
    responses(
        (status = 200, description = "Language", body = Language),
        (status = 404, description = "Language not found")
    )
)]
pub async fn get_language(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Language>> {
    let language = state.services.catalog.get_language(id).await?;
    Ok(Json(language))
}

/// Create a language
#[utoipa::path(
    post,
    path = "/languages",
    tag = "languages",
    security(("bearer_auth" = [])),
    request_body = NameInput,
    responses(
        (status = 201, description = "Language created", body = Language),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing catalog permission")
    )
)]
pub async fn create_language(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    AppJson(input): AppJson<NameInput>,
) -> AppResult<(StatusCode, Json<Language>)> {
    let created = state.services.catalog.create_language(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Rename a language
#[utoipa::path(
    put,
    path = "/languages/{id}",
    tag = "languages",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Language ID")
    ),
    request_body = NameInput,
    responses(
        (status = 200, description = "Language updated", body = Language),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Language not found")
    )
)]
pub async fn update_language(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<i32>,
    AppJson(input): AppJson<NameInput>,
) -> AppResult<Json<Language>> {
    let updated = state.services.catalog.update_language(id, input).await?;
    Ok(Json(updated))
}

/// Delete a language (books keep existing with no language)
#[utoipa::path(
    delete,
    path = "/languages/{id}",
    tag = "languages",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Language ID")
    ),
    responses(
        (status = 204, description = "Language deleted"),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Language not found")
    )
)]
pub async fn delete_language(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_language(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
