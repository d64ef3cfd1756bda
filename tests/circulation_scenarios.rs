//! End-to-end circulation scenarios against the desk

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use circulation_server::{
    models::{
        book::{BookQuery, CreateBook},
        loan::{Checkout, LoanFilter, LoanStatus},
        request::{CreateBorrowRequest, RequestStatus},
    },
    services::{
        circulation::{CirculationDesk, CirculationService},
        clock::ManualClock,
        policy::LoanPolicy,
    },
    AppError,
};

fn desk() -> (CirculationDesk, ManualClock) {
    let clock = ManualClock::at_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    let desk = CirculationDesk::new(LoanPolicy::default(), Arc::new(clock.clone()));
    (desk, clock)
}

/// Copies on the shelf plus copies on loan
fn copies(desk: &CirculationDesk, book_id: &str) -> u64 {
    let shelf = u64::from(desk.find_book(book_id).unwrap().stock);
    let filter = LoanFilter {
        book_id: Some(book_id.to_string()),
        ..LoanFilter::default()
    };
    let out = desk.list_loans(&filter).filter(|l| l.return_date.is_none()).count() as u64;
    shelf + out
}

#[test]
fn test_copies_are_conserved() {
    let (mut desk, clock) = desk();
    let book = desk.add_book(CreateBook::new("Dune", "Frank Herbert", "Fiction", 3)).unwrap();

    let mut loans = Vec::new();
    for borrower in ["Alice", "Bob", "Carol"] {
        let request = desk.request_borrow(CreateBorrowRequest::member(&book.id, borrower)).unwrap();
        loans.push(desk.approve_request(&request.id).unwrap().loan);
        assert_eq!(copies(&desk, &book.id), 3);
    }

    let late = desk.request_borrow(CreateBorrowRequest::member(&book.id, "Dave")).unwrap();
    assert!(matches!(desk.approve_request(&late.id), Err(AppError::OutOfStock(_))));
    assert_eq!(copies(&desk, &book.id), 3);

    clock.advance_days(2);
    for loan in &loans {
        desk.return_loan(&loan.id).unwrap();
        assert_eq!(copies(&desk, &book.id), 3);
    }
    assert_eq!(desk.find_book(&book.id).unwrap().stock, 3);

    // the queued request can now go through
    let approval = desk.approve_request(&late.id).unwrap();
    assert_eq!(approval.request.status, RequestStatus::Approved);
    assert_eq!(approval.request.loan_id.as_deref(), Some(approval.loan.id.as_str()));
}

#[test]
fn test_status_follows_the_calendar() {
    let (mut desk, clock) = desk();
    let book = desk.add_book(CreateBook::new("Emma", "Jane Austen", "Fiction", 1)).unwrap();
    let loan = desk
        .checkout(Checkout { book_id: book.id.clone(), borrower: "Alice".into() })
        .unwrap();
    assert_eq!(loan.due_date, NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
    assert_eq!(loan.status, LoanStatus::Active);

    clock.advance_days(11);
    assert_eq!(desk.find_loan(&loan.id).unwrap().status, LoanStatus::DueSoon);
    assert_eq!(desk.current_stats().due_soon, 1);

    clock.advance_days(3);
    let due_today = desk.find_loan(&loan.id).unwrap();
    assert_eq!(due_today.status, LoanStatus::DueSoon);
    assert_eq!(due_today.fine, Decimal::ZERO);

    clock.advance_days(1);
    let late = desk.find_loan(&loan.id).unwrap();
    assert_eq!(late.status, LoanStatus::Overdue);
    assert_eq!(late.fine, Decimal::from(5000));
    assert_eq!(desk.current_stats().accruing_fines, Decimal::from(5000));
}

#[test]
fn test_denied_request_leaves_stock_alone() {
    let (mut desk, _) = desk();
    let book = desk.add_book(CreateBook::new("Emma", "Jane Austen", "Fiction", 1)).unwrap();
    let request = desk.request_borrow(CreateBorrowRequest::member(&book.id, "Alice")).unwrap();

    let denied = desk.deny_request(&request.id).unwrap();
    assert_eq!(denied.status, RequestStatus::Denied);
    assert!(denied.decided_at.is_some());
    assert!(denied.loan_id.is_none());
    assert_eq!(desk.find_book(&book.id).unwrap().stock, 1);

    assert!(matches!(desk.approve_request(&request.id), Err(AppError::InvalidState(_))));
    assert_eq!(desk.current_stats().pending_requests, 0);
}

#[test]
fn test_catalog_filters() {
    let (mut desk, _) = desk();
    desk.add_book(CreateBook::new("Clean Code", "Robert C. Martin", "Programming", 5)).unwrap();
    desk.add_book(CreateBook::new("Emma", "Jane Austen", "Fiction", 0)).unwrap();

    let programming = desk.list_books(&BookQuery {
        category: Some("programming".into()),
        ..BookQuery::default()
    });
    assert_eq!(programming.len(), 1);

    let available = desk.list_books(&BookQuery {
        available: Some(true),
        ..BookQuery::default()
    });
    assert_eq!(available[0].title, "Clean Code");

    let search = desk.list_books(&BookQuery {
        q: Some("AUSTEN".into()),
        ..BookQuery::default()
    });
    assert_eq!(search[0].title, "Emma");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_approvals_open_one_loan() {
    let (desk, _) = desk();
    let service = CirculationService::new(desk);
    let (book, request) = {
        let mut desk = service.write().await;
        let book = desk.add_book(CreateBook::new("Dune", "Frank Herbert", "Fiction", 2)).unwrap();
        let request = desk.request_borrow(CreateBorrowRequest::member(&book.id, "Alice")).unwrap();
        (book, request)
    };

    let approve = |service: CirculationService, id: String| {
        tokio::spawn(async move { service.write().await.approve_request(&id) })
    };
    let (first, second) = tokio::join!(
        approve(service.clone(), request.id.clone()),
        approve(service.clone(), request.id.clone()),
    );
    let results = [first.unwrap(), second.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(AppError::InvalidState(_)))));

    let desk = service.read().await;
    assert_eq!(desk.list_loans(&LoanFilter::default()).count(), 1);
    assert_eq!(desk.find_book(&book.id).unwrap().stock, 1);
    assert_eq!(copies(&desk, &book.id), 2);
}
