//! Dashboard counters

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Summary counters, recomputed from the stores on every request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Stats {
    /// Sum of stock across all books
    pub total_books: u64,
    /// Loans not yet returned
    pub issued: u64,
    pub overdue: u64,
    pub due_soon: u64,
    /// Distinct borrowers across all loans and pending requests
    pub members: u64,
    pub pending_requests: u64,
    /// Fines accruing on open overdue loans (informational)
    pub accruing_fines: Decimal,
}
