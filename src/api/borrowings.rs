//! Borrowing endpoints: requests from members, loans and returns

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    api::{AppJson, AppQuery},
    error::{AppError, AppResult},
    models::{
        loan::{Checkout, LoanFilter, LoanView},
        request::{BorrowRequest, CreateBorrowRequest},
    },
};

/// Borrower selector for per-member listings
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BorrowerQuery {
    /// Borrower name
    pub borrower: Option<String>,
}

impl BorrowerQuery {
    fn required(self) -> AppResult<String> {
        self.borrower
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .ok_or_else(|| AppError::BadRequest("borrower is required".to_string()))
    }
}

/// Quick return request
#[derive(Deserialize, ToSchema)]
pub struct QuickReturnRequest {
    /// Loan ID, or book ID to return that book's oldest open loan
    pub key: String,
}

/// Return response with loan details
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    /// Return status
    pub status: String,
    /// Loan after return, with its final fine
    pub loan: LoanView,
    pub fine_message: String,
}

impl From<LoanView> for ReturnResponse {
    fn from(loan: LoanView) -> Self {
        let fine_message = if loan.fine.is_zero() {
            "No fine".to_string()
        } else {
            format!("Late return fine: {}", loan.fine)
        };
        Self {
            status: "returned".to_string(),
            loan,
            fine_message,
        }
    }
}

/// Ask to borrow a book
#[utoipa::path(
    post,
    path = "/borrowings",
    tag = "borrowings",
    request_body = CreateBorrowRequest,
    responses(
        (status = 201, description = "Request queued for approval", body = BorrowRequest),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_borrowing(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<CreateBorrowRequest>,
) -> AppResult<(StatusCode, Json<BorrowRequest>)> {
    let request = state.services.circulation.write().await.request_borrow(request)?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List loans, optionally filtered by status, borrower or book
#[utoipa::path(
    get,
    path = "/borrowings",
    tag = "borrowings",
    params(LoanFilter),
    responses(
        (status = 200, description = "Loans with status computed now", body = Vec<LoanView>)
    )
)]
pub async fn list_borrowings(
    State(state): State<crate::AppState>,
    AppQuery(filter): AppQuery<LoanFilter>,
) -> AppResult<Json<Vec<LoanView>>> {
    let desk = state.services.circulation.read().await;
    let loans: Vec<LoanView> = desk.list_loans(&filter).collect();
    Ok(Json(loans))
}

/// Open loans of a borrower
#[utoipa::path(
    get,
    path = "/borrowings/my",
    tag = "borrowings",
    params(BorrowerQuery),
    responses(
        (status = 200, description = "Open loans", body = Vec<LoanView>),
        (status = 400, description = "Missing borrower", body = crate::error::ErrorResponse)
    )
)]
pub async fn my_borrowings(
    State(state): State<crate::AppState>,
    AppQuery(query): AppQuery<BorrowerQuery>,
) -> AppResult<Json<Vec<LoanView>>> {
    let borrower = query.required()?;
    let loans = state.services.circulation.read().await.borrower_loans(&borrower);
    Ok(Json(loans))
}

/// Every loan of a borrower, most recent first
#[utoipa::path(
    get,
    path = "/borrowings/history",
    tag = "borrowings",
    params(BorrowerQuery),
    responses(
        (status = 200, description = "Loan history", body = Vec<LoanView>),
        (status = 400, description = "Missing borrower", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrowing_history(
    State(state): State<crate::AppState>,
    AppQuery(query): AppQuery<BorrowerQuery>,
) -> AppResult<Json<Vec<LoanView>>> {
    let borrower = query.required()?;
    let loans = state.services.circulation.read().await.borrower_history(&borrower);
    Ok(Json(loans))
}

/// Get a loan by ID
#[utoipa::path(
    get,
    path = "/borrowings/{id}",
    tag = "borrowings",
    params(
        ("id" = String, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan", body = LoanView),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_borrowing(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<LoanView>> {
    let loan = state.services.circulation.read().await.find_loan(&id)?;
    Ok(Json(loan))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrowings/{id}/return",
    tag = "borrowings",
    params(
        ("id" = String, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "Loan not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Already returned", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_borrowing(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ReturnResponse>> {
    let loan = state.services.circulation.write().await.return_loan(&id)?;
    Ok(Json(ReturnResponse::from(loan)))
}

/// Return by loan ID or book ID
#[utoipa::path(
    post,
    path = "/borrowings/quick-return",
    tag = "borrowings",
    request_body = QuickReturnRequest,
    responses(
        (status = 200, description = "Book returned", body = ReturnResponse),
        (status = 404, description = "No open loan matches", body = crate::error::ErrorResponse)
    )
)]
pub async fn quick_return(
    State(state): State<crate::AppState>,
    AppJson(request): AppJson<QuickReturnRequest>,
) -> AppResult<Json<ReturnResponse>> {
    let loan = state.services.circulation.write().await.quick_return(&request.key)?;
    Ok(Json(ReturnResponse::from(loan)))
}

/// Lend a book directly, without a request
#[utoipa::path(
    post,
    path = "/borrowings/checkout",
    tag = "borrowings",
    request_body = Checkout,
    responses(
        (status = 201, description = "Loan opened", body = LoanView),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Out of stock or loan limit reached", body = crate::error::ErrorResponse)
    )
)]
pub async fn checkout(
    State(state): State<crate::AppState>,
    AppJson(checkout): AppJson<Checkout>,
) -> AppResult<(StatusCode, Json<LoanView>)> {
    let loan = state.services.circulation.write().await.checkout(checkout)?;
    Ok((StatusCode::CREATED, Json(loan)))
}
