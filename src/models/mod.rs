//! Data models for the circulation server

pub mod book;
pub mod loan;
pub mod request;
pub mod stats;

// Re-export commonly used types
pub use book::{Book, BookView};
pub use loan::{Loan, LoanStatus, LoanView};
pub use request::{BorrowRequest, RequestStatus};
pub use stats::Stats;
