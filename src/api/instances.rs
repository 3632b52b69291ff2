//! Book copy endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book_instance::{InstanceInput, InstanceView},
};

use super::{AppJson, Librarian};

/// Get a copy by ID
#[utoipa::path(
    get,
    path = "/instances/{id}",
    tag = "instances",
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Copy details", body = InstanceView),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_instance(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<InstanceView>> {
    let instance = state.services.circulation.get_instance(id).await?;
    Ok(Json(instance))
}

/// Register a new copy; the identifier is generated by the server
#[utoipa::path(
    post,
    path = "/instances",
    tag = "instances",
    security(("bearer_auth" = [])),
    request_body = InstanceInput,
    responses(
        (status = 201, description = "Copy created", body = InstanceView),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing catalog permission")
    )
)]
pub async fn create_instance(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    AppJson(input): AppJson<InstanceInput>,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<InstanceView>)> {
    let created = state.services.circulation.create_instance(input).await?;
    let location = format!("{}/instances/{}", crate::router::API_PREFIX, created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// Update a copy (imprint, status, borrower, due date)
#[utoipa::path(
    put,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = InstanceInput,
    responses(
        (status = 200, description = "Copy updated", body = InstanceView),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn update_instance(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<Uuid>,
    AppJson(input): AppJson<InstanceInput>,
) -> AppResult<Json<InstanceView>> {
    let updated = state.services.circulation.update_instance(id, input).await?;
    Ok(Json(updated))
}

/// Delete a copy
#[utoipa::path(
    delete,
    path = "/instances/{id}",
    tag = "instances",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 204, description = "Copy deleted"),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn delete_instance(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.circulation.delete_instance(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
