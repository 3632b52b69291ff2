//! Loan listings and renewal endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::book_instance::{InstanceView, LoanQuery, RenewInput, RenewalProposal},
};

use super::{books::PaginatedResponse, AppJson, AuthenticatedUser, Librarian};

/// Result of a successful renewal
#[derive(Serialize, ToSchema)]
pub struct RenewalResponse {
    /// The copy with its new due date
    pub instance: InstanceView,
    /// Listing to show next
    pub redirect_to: String,
}

/// Copies on loan to the current user, soonest due first
#[utoipa::path(
    get,
    path = "/loans/mine",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "Current user's loans", body = super::books::LoanPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<InstanceView>>> {
    let (loans, total) = state
        .services
        .circulation
        .user_loans(claims.user_id, &query)
        .await?;

    Ok(Json(PaginatedResponse::new(
        loans,
        total,
        query.page,
        query.per_page,
        &state.config.catalog,
    )))
}

/// Every copy on loan, soonest due first
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(LoanQuery),
    responses(
        (status = 200, description = "All loans", body = super::books::LoanPage),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing catalog permission")
    )
)]
pub async fn all_loans(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<PaginatedResponse<InstanceView>>> {
    let (loans, total) = state.services.circulation.all_loans(&query).await?;

    Ok(Json(PaginatedResponse::new(
        loans,
        total,
        query.page,
        query.per_page,
        &state.config.catalog,
    )))
}

/// Renewal form: the copy and the proposed due date
#[utoipa::path(
    get,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    responses(
        (status = 200, description = "Renewal proposal", body = RenewalProposal),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn get_renewal(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RenewalProposal>> {
    let proposal = state.services.circulation.renewal_proposal(id).await?;
    Ok(Json(proposal))
}

/// Renew a copy
#[utoipa::path(
    post,
    path = "/instances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Copy ID")
    ),
    request_body = RenewInput,
    responses(
        (status = 200, description = "Copy renewed", body = RenewalResponse),
        (status = 400, description = "Renewal date outside the accepted window"),
        (status = 403, description = "Missing catalog permission"),
        (status = 404, description = "Copy not found")
    )
)]
pub async fn renew_instance(
    State(state): State<crate::AppState>,
    _librarian: Librarian,
    Path(id): Path<Uuid>,
    AppJson(input): AppJson<RenewInput>,
) -> AppResult<Json<RenewalResponse>> {
    let instance = state.services.circulation.renew(id, input).await?;

    Ok(Json(RenewalResponse {
        instance,
        redirect_to: format!("{}/loans", crate::router::API_PREFIX),
    }))
}
