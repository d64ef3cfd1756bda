//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrowings, health, requests, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation API",
        version = "0.1.0",
        description = "Library circulation REST API: catalog, borrow requests, loans and fines"
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        // Borrowings
        borrowings::create_borrowing,
        borrowings::list_borrowings,
        borrowings::my_borrowings,
        borrowings::borrowing_history,
        borrowings::get_borrowing,
        borrowings::return_borrowing,
        borrowings::quick_return,
        borrowings::checkout,
        // Requests
        requests::list_requests,
        requests::approve_request,
        requests::deny_request,
        // Stats
        stats::get_stats,
    ),
    components(
        schemas(
            // Books
            crate::models::book::BookView,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            crate::models::book::StockLevel,
            // Loans
            crate::models::loan::LoanView,
            crate::models::loan::LoanStatus,
            crate::models::loan::Checkout,
            borrowings::QuickReturnRequest,
            borrowings::ReturnResponse,
            // Requests
            crate::models::request::BorrowRequest,
            crate::models::request::CreateBorrowRequest,
            crate::models::request::Requester,
            crate::models::request::RequestStatus,
            crate::models::request::Role,
            crate::services::circulation::Approval,
            // Stats
            crate::models::stats::Stats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Catalog management"),
        (name = "borrowings", description = "Borrow requests, loans and returns"),
        (name = "requests", description = "Librarian approval queue"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
