//! Book (catalog) endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::{AppJson, AppQuery},
    error::AppResult,
    models::book::{BookQuery, BookView, CreateBook, UpdateBook},
};

/// List books with optional search and filters
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Books in catalog order", body = Vec<BookView>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AppQuery(query): AppQuery<BookQuery>,
) -> AppResult<Json<Vec<BookView>>> {
    let books = state.services.circulation.read().await.list_books(&query);
    Ok(Json(books))
}

/// Get book details by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookView),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookView>> {
    let book = state.services.circulation.read().await.find_book(&id)?;
    Ok(Json(book))
}

/// Add a book to the catalog
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookView),
        (status = 400, description = "Missing title/author or invalid stock", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AppJson(book): AppJson<CreateBook>,
) -> AppResult<(StatusCode, Json<BookView>)> {
    let book = state.services.circulation.write().await.add_book(book)?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book's details or stock
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookView),
        (status = 400, description = "Blank field or invalid stock", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    AppJson(update): AppJson<UpdateBook>,
) -> AppResult<Json<BookView>> {
    let book = state.services.circulation.write().await.update_book(&id, update)?;
    Ok(Json(book))
}
