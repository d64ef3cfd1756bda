//! In-memory stores for books, borrow requests and loans.
//!
//! The three stores never hold each other; they are correlated by book id only.

pub mod books;
pub mod loans;
pub mod requests;

/// All circulation state, owned by a single desk
#[derive(Debug, Default)]
pub struct Repository {
    pub books: books::BooksRepository,
    pub requests: requests::RequestsRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }
}
