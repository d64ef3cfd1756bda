//! Borrow request workflow: pending -> approved | denied.
//!
//! Each function is a unit of work over the whole repository. Checks run
//! before any mutation; when a step fails after an earlier one already
//! changed state, the earlier step is undone before the error is returned.

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::{Checkout, Loan},
        request::{BorrowRequest, CreateBorrowRequest, RequestStatus, Requester},
    },
    repository::Repository,
    services::{clock::day_of, policy::LoanPolicy},
};

/// Queue a borrow request. Zero stock does not block queuing; it is checked at approval.
pub fn create_request(
    repository: &mut Repository,
    request: CreateBorrowRequest,
    now: DateTime<Utc>,
) -> AppResult<BorrowRequest> {
    request.validate()?;
    let requester = Requester {
        name: request.requester.trim().to_string(),
        role: request.role,
    };
    if requester.name.is_empty() {
        return Err(AppError::Validation("Requester is required".to_string()));
    }

    let book_id = repository.books.get_by_id(request.book_id.trim())?.id.clone();
    Ok(repository.requests.create(&book_id, requester, now))
}

/// Approve a pending request: one copy leaves the shelf and a loan is opened
pub fn approve(
    repository: &mut Repository,
    request_id: &str,
    policy: &LoanPolicy,
    now: DateTime<Utc>,
) -> AppResult<(BorrowRequest, Loan)> {
    let request = repository.requests.pending_by_id(request_id)?.clone();
    ensure_not_holding(repository, &request.requester.name, &request.book_id)?;
    ensure_within_limit(repository, policy, &request.requester.name)?;

    let loan = lend(
        repository,
        &request.book_id,
        &request.requester.name,
        policy,
        now,
        Some(request_id),
    )?;

    match repository
        .requests
        .resolve(request_id, RequestStatus::Approved, now, Some(loan.id.clone()))
    {
        Ok(request) => Ok((request, loan)),
        Err(err) => {
            undo_lend(repository, &loan)?;
            Err(err)
        }
    }
}

/// Deny a pending request. Stock and loans are untouched.
pub fn deny(
    repository: &mut Repository,
    request_id: &str,
    now: DateTime<Utc>,
) -> AppResult<BorrowRequest> {
    repository
        .requests
        .resolve(request_id, RequestStatus::Denied, now, None)
}

/// Lend a book directly, without a request
pub fn checkout(
    repository: &mut Repository,
    checkout: Checkout,
    policy: &LoanPolicy,
    now: DateTime<Utc>,
) -> AppResult<Loan> {
    checkout.validate()?;
    let borrower = checkout.borrower.trim();
    if borrower.is_empty() {
        return Err(AppError::Validation("Borrower is required".to_string()));
    }
    let book_id = checkout.book_id.trim();
    ensure_not_holding(repository, borrower, book_id)?;
    ensure_within_limit(repository, policy, borrower)?;
    lend(repository, book_id, borrower, policy, now, None)
}

/// A borrower holds at most one open loan per book
fn ensure_not_holding(repository: &Repository, borrower: &str, book_id: &str) -> AppResult<()> {
    match repository.loans.open_for(borrower, book_id) {
        Some(loan) => Err(AppError::InvalidState(format!(
            "{} already has {} borrowed ({})",
            borrower, book_id, loan.id
        ))),
        None => Ok(()),
    }
}

fn ensure_within_limit(repository: &Repository, policy: &LoanPolicy, borrower: &str) -> AppResult<()> {
    if let Some(max) = policy.max_active_loans {
        let open = repository.loans.count_open_for(borrower);
        if open >= max {
            return Err(AppError::LimitReached(format!(
                "{} already holds {}/{} books",
                borrower, open, max
            )));
        }
    }
    Ok(())
}

/// Decrement stock and open the loan, restoring stock if the loan cannot be opened
fn lend(
    repository: &mut Repository,
    book_id: &str,
    borrower: &str,
    policy: &LoanPolicy,
    now: DateTime<Utc>,
    request_id: Option<&str>,
) -> AppResult<Loan> {
    let borrowed_on = day_of(now);
    let due_date = policy.due_date(borrowed_on)?;

    repository.books.decrement_stock(book_id)?;

    let opened = repository.loans.open_loan(book_id, borrower, borrowed_on, due_date, request_id);
    if opened.is_err() {
        repository.books.increment_stock(book_id)?;
    }
    opened
}

fn undo_lend(repository: &mut Repository, loan: &Loan) -> AppResult<()> {
    repository.loans.discard(&loan.id);
    repository.books.increment_stock(&loan.book_id)?;
    tracing::warn!("Rolled back loan {} for book {}", loan.id, loan.book_id);
    Ok(())
}
