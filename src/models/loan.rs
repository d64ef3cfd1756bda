//! Loan (borrow transaction) model and related types

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

/// Loan record as held by the ledger.
///
/// The lifecycle status is never stored: it is derived from the dates each
/// time the loan is read. `fine` holds the realized fine and stays zero until
/// the loan is returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: String,
    pub book_id: String,
    pub borrower: String,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub fine: Decimal,
    /// Borrow request this loan was created from, absent for direct checkouts
    pub request_id: Option<String>,
}

impl Loan {
    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }
}

/// Loan lifecycle classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum LoanStatus {
    Active,
    DueSoon,
    Overdue,
    Returned,
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            LoanStatus::Active => "active",
            LoanStatus::DueSoon => "due-soon",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        };
        write!(f, "{}", label)
    }
}

/// Loan with status and fine computed at read time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LoanView {
    pub id: String,
    pub book_id: String,
    /// Title of the borrowed book, when the catalog still knows it
    pub book_title: Option<String>,
    pub borrower: String,
    pub borrow_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    /// Days left until the due date, negative once overdue
    pub days_until_due: i64,
    /// Realized fine for returned loans, accruing fine for open ones
    pub fine: Decimal,
}

/// Loan listing filters
#[derive(Debug, Default, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct LoanFilter {
    pub status: Option<LoanStatus>,
    pub borrower: Option<String>,
    pub book_id: Option<String>,
}

impl LoanFilter {
    pub fn borrower(name: &str) -> Self {
        Self {
            borrower: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn status(status: LoanStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Record-level part of the filter; status is matched on the computed view
    pub fn accepts(&self, loan: &Loan) -> bool {
        self.borrower.as_deref().map_or(true, |b| loan.borrower == b.trim())
            && self.book_id.as_deref().map_or(true, |id| loan.book_id == id)
    }
}

/// Direct librarian checkout, bypassing the request queue
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct Checkout {
    pub book_id: String,
    #[validate(length(min = 1, max = 100, message = "Borrower is required"))]
    pub borrower: String,
}
