//! Home page: catalog counts and the per-session visit counter

use axum::{
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppResult, models::CatalogCounts};

/// Header carrying the client's session id, echoed back on every response
pub const SESSION_HEADER: &str = "x-session-id";

#[derive(Serialize, ToSchema)]
pub struct HomeResponse {
    #[serde(flatten)]
    pub counts: CatalogCounts,
    /// Visits to the home page earlier in this session
    pub num_visits: i64,
}

/// Session id sent by the client, if it is one we would have issued
fn client_session_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(SESSION_HEADER)?.to_str().ok()?.trim();
    let well_formed = !value.is_empty()
        && value.len() <= 64
        && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    well_formed.then(|| value.to_string())
}

/// Home page counts
#[utoipa::path(
    get,
    path = "/home",
    tag = "home",
    params(
        ("x-session-id" = Option<String>, Header, description = "Session id from a previous response")
    ),
    responses(
        (status = 200, description = "Catalog counts and visit counter", body = HomeResponse,
         headers(("x-session-id" = String, description = "Session id to send on later requests")))
    )
)]
pub async fn home(
    State(state): State<crate::AppState>,
    headers: HeaderMap,
) -> AppResult<(HeaderMap, Json<HomeResponse>)> {
    let session_id = client_session_id(&headers).unwrap_or_else(|| Uuid::new_v4().to_string());

    let counts = state.services.catalog.counts().await?;
    let num_visits = state.services.sessions.record_visit(&session_id).await?;

    let mut response_headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&session_id) {
        response_headers.insert(HeaderName::from_static(SESSION_HEADER), value);
    }

    Ok((response_headers, Json(HomeResponse { counts, num_visits })))
}
