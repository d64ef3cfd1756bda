//! Loan ledger: every loan from checkout to return

use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanFilter, LoanView},
    repository::books::BooksRepository,
    services::{clock::days_between, policy},
};

#[derive(Debug, Default)]
pub struct LoansRepository {
    loans: IndexMap<String, Loan>,
    next_id: u64,
}

impl LoansRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new open loan
    pub fn open_loan(
        &mut self,
        book_id: &str,
        borrower: &str,
        borrow_date: NaiveDate,
        due_date: NaiveDate,
        request_id: Option<&str>,
    ) -> AppResult<Loan> {
        if due_date < borrow_date {
            return Err(AppError::Validation(format!(
                "Due date {} is before borrow date {}",
                due_date, borrow_date
            )));
        }
        self.next_id += 1;
        let loan = Loan {
            id: format!("L{}", self.next_id),
            book_id: book_id.to_string(),
            borrower: borrower.to_string(),
            borrow_date,
            due_date,
            return_date: None,
            fine: Decimal::ZERO,
            request_id: request_id.map(String::from),
        };
        self.loans.insert(loan.id.clone(), loan.clone());
        Ok(loan)
    }

    /// Drop a loan that was opened as part of a unit of work that later failed
    pub(crate) fn discard(&mut self, id: &str) -> Option<Loan> {
        self.loans.shift_remove(id)
    }

    /// Close an open loan on `returned_on`: the book goes back on the shelf and
    /// the realized fine is frozen into the record.
    pub fn return_loan(
        &mut self,
        id: &str,
        returned_on: NaiveDate,
        daily_fine: Decimal,
        books: &mut BooksRepository,
    ) -> AppResult<Loan> {
        let loan = self
            .loans
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))?;

        if loan.return_date.is_some() {
            return Err(AppError::InvalidState(format!("Loan {} already returned", id)));
        }
        if returned_on < loan.borrow_date {
            return Err(AppError::Validation(format!(
                "Return date {} is before borrow date {}",
                returned_on, loan.borrow_date
            )));
        }

        books.increment_stock(&loan.book_id)?;

        loan.return_date = Some(returned_on);
        loan.fine = policy::fine(loan.due_date, returned_on, daily_fine);
        Ok(loan.clone())
    }

    pub fn get(&self, id: &str) -> Option<&Loan> {
        self.loans.get(id)
    }

    /// Get loan by ID
    pub fn get_by_id(&self, id: &str) -> AppResult<&Loan> {
        self.loans
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Loan {} not found", id)))
    }

    /// Oldest open loan of a book
    pub fn oldest_open_for_book(&self, book_id: &str) -> Option<&Loan> {
        self.loans
            .values()
            .find(|l| l.is_open() && l.book_id == book_id)
    }

    /// Open loan of `book_id` held by `borrower`, if any
    pub fn open_for(&self, borrower: &str, book_id: &str) -> Option<&Loan> {
        self.loans
            .values()
            .find(|l| l.is_open() && l.borrower == borrower && l.book_id == book_id)
    }

    /// Number of open loans held by a borrower
    pub fn count_open_for(&self, borrower: &str) -> usize {
        self.loans
            .values()
            .filter(|l| l.is_open() && l.borrower == borrower)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }

    /// Loans matching `filter` as views classified against `today`.
    ///
    /// Nothing is computed until the iterator is driven, and each call
    /// classifies afresh, so two listings a day apart can disagree.
    pub fn list<'a>(
        &'a self,
        filter: &'a LoanFilter,
        today: NaiveDate,
        daily_fine: Decimal,
    ) -> impl Iterator<Item = LoanView> + 'a {
        self.loans
            .values()
            .filter(move |loan| filter.accepts(loan))
            .map(move |loan| to_view(loan, today, daily_fine))
            .filter(move |view| filter.status.map_or(true, |s| view.status == s))
    }
}

/// Derive the read-time view of a loan.
/// Returned loans report their frozen fine, open ones the fine accrued so far.
pub fn to_view(loan: &Loan, today: NaiveDate, daily_fine: Decimal) -> LoanView {
    let status = policy::classify(today, loan.due_date, loan.return_date);
    let fine = match loan.return_date {
        Some(_) => loan.fine,
        None => policy::fine(loan.due_date, today, daily_fine),
    };
    LoanView {
        id: loan.id.clone(),
        book_id: loan.book_id.clone(),
        book_title: None,
        borrower: loan.borrower.clone(),
        borrow_date: loan.borrow_date,
        due_date: loan.due_date,
        return_date: loan.return_date,
        status,
        days_until_due: days_between(today, loan.due_date),
        fine,
    }
}
