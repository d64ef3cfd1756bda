//! Borrow request model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Member,
    Librarian,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Requester {
    pub name: String,
    pub role: Role,
}

/// A member's ask to borrow a book, awaiting a librarian decision.
/// Kept after approval or denial as an audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub id: String,
    pub book_id: String,
    pub requester: Requester,
    pub created_at: DateTime<Utc>,
    pub status: RequestStatus,
    pub decided_at: Option<DateTime<Utc>>,
    /// Loan opened by the approval
    pub loan_id: Option<String>,
}

/// Create borrow request payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateBorrowRequest {
    pub book_id: String,
    #[validate(length(min = 1, max = 100, message = "Requester is required"))]
    pub requester: String,
    #[serde(default)]
    pub role: Role,
}

impl CreateBorrowRequest {
    pub fn member(book_id: &str, requester: &str) -> Self {
        Self {
            book_id: book_id.to_string(),
            requester: requester.to_string(),
            role: Role::Member,
        }
    }
}
