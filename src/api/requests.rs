//! Borrow request endpoints for librarians

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    api::AppQuery, error::AppResult, models::request::BorrowRequest,
    services::circulation::Approval,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RequestsQuery {
    /// Include approved and denied requests
    pub all: Option<bool>,
}

/// List borrow requests (pending only unless `all=true`)
#[utoipa::path(
    get,
    path = "/requests",
    tag = "requests",
    params(RequestsQuery),
    responses(
        (status = 200, description = "Borrow requests, oldest first", body = Vec<BorrowRequest>)
    )
)]
pub async fn list_requests(
    State(state): State<crate::AppState>,
    AppQuery(query): AppQuery<RequestsQuery>,
) -> AppResult<Json<Vec<BorrowRequest>>> {
    let desk = state.services.circulation.read().await;
    let requests = if query.all.unwrap_or(false) {
        desk.list_requests()
    } else {
        desk.list_pending_requests()
    };
    Ok(Json(requests))
}

/// Approve a pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/approve",
    tag = "requests",
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request approved and loan opened", body = Approval),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Request already decided", body = crate::error::ErrorResponse),
        (status = 422, description = "Out of stock or loan limit reached", body = crate::error::ErrorResponse)
    )
)]
pub async fn approve_request(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Approval>> {
    let approval = state.services.circulation.write().await.approve_request(&id)?;
    Ok(Json(approval))
}

/// Deny a pending request
#[utoipa::path(
    post,
    path = "/requests/{id}/deny",
    tag = "requests",
    params(
        ("id" = String, Path, description = "Request ID")
    ),
    responses(
        (status = 200, description = "Request denied", body = BorrowRequest),
        (status = 404, description = "Request not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Request already decided", body = crate::error::ErrorResponse)
    )
)]
pub async fn deny_request(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BorrowRequest>> {
    let request = state.services.circulation.write().await.deny_request(&id)?;
    Ok(Json(request))
}
