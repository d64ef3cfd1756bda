//! Circulation desk: the single entry point over books, requests and loans

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{BookQuery, BookView, CreateBook, UpdateBook},
        loan::{Checkout, Loan, LoanFilter, LoanView},
        request::{BorrowRequest, CreateBorrowRequest},
        stats::Stats,
    },
    repository::{loans::to_view, Repository},
    services::{
        clock::{day_of, Clock},
        policy::LoanPolicy,
        stats, workflow,
    },
};

/// Result of approving a borrow request
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct Approval {
    pub request: BorrowRequest,
    pub loan: LoanView,
}

/// Owns all circulation state. Every mutating method is a unit of work:
/// it either applies completely or leaves the state as it found it.
pub struct CirculationDesk {
    repository: Repository,
    policy: LoanPolicy,
    clock: Arc<dyn Clock>,
}

impl CirculationDesk {
    pub fn new(policy: LoanPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository: Repository::new(),
            policy,
            clock,
        }
    }

    /// Calendar date loans are classified against
    pub fn today(&self) -> NaiveDate {
        day_of(self.clock.now())
    }

    // ---------------------------------------------------------------------
    // Catalog
    // ---------------------------------------------------------------------

    pub fn add_book(&mut self, book: CreateBook) -> AppResult<BookView> {
        let book = self.repository.books.create(book)?;
        tracing::info!("Added book {} '{}' with stock {}", book.id, book.title, book.stock);
        Ok(BookView::from(&book))
    }

    /// Librarian edit of details or shelf stock
    pub fn update_book(&mut self, id: &str, update: UpdateBook) -> AppResult<BookView> {
        let book = self
            .repository
            .books
            .update(id, update)
            .inspect_err(|e| tracing::warn!("Update of {} rejected: {}", id, e))?;
        tracing::info!("Updated book {} '{}', stock {}", book.id, book.title, book.stock);
        Ok(BookView::from(&book))
    }

    pub fn book_count(&self) -> usize {
        self.repository.books.len()
    }

    pub fn find_book(&self, id: &str) -> AppResult<BookView> {
        self.repository.books.get_by_id(id).map(BookView::from)
    }

    pub fn list_books(&self, query: &BookQuery) -> Vec<BookView> {
        tracing::debug!("Listing books with {:?}", query);
        self.repository.books.search(query).map(BookView::from).collect()
    }

    // ---------------------------------------------------------------------
    // Requests
    // ---------------------------------------------------------------------

    pub fn request_borrow(&mut self, request: CreateBorrowRequest) -> AppResult<BorrowRequest> {
        let request = workflow::create_request(&mut self.repository, request, self.clock.now())?;
        tracing::info!(
            "Borrow request {} for {} by {}",
            request.id,
            request.book_id,
            request.requester.name
        );
        Ok(request)
    }

    pub fn approve_request(&mut self, request_id: &str) -> AppResult<Approval> {
        let (request, loan) =
            workflow::approve(&mut self.repository, request_id, &self.policy, self.clock.now())
                .inspect_err(|e| tracing::warn!("Approval of {} rejected: {}", request_id, e))?;
        tracing::info!("Approved {} as loan {} due {}", request.id, loan.id, loan.due_date);
        Ok(Approval {
            loan: self.view(&loan),
            request,
        })
    }

    pub fn deny_request(&mut self, request_id: &str) -> AppResult<BorrowRequest> {
        let request = workflow::deny(&mut self.repository, request_id, self.clock.now())
            .inspect_err(|e| tracing::warn!("Denial of {} rejected: {}", request_id, e))?;
        tracing::info!("Denied {}", request.id);
        Ok(request)
    }

    pub fn list_pending_requests(&self) -> Vec<BorrowRequest> {
        self.repository.requests.pending().cloned().collect()
    }

    /// All requests including decided ones
    pub fn list_requests(&self) -> Vec<BorrowRequest> {
        self.repository.requests.iter().cloned().collect()
    }

    // ---------------------------------------------------------------------
    // Loans
    // ---------------------------------------------------------------------

    /// Librarian checkout without a prior request
    pub fn checkout(&mut self, checkout: Checkout) -> AppResult<LoanView> {
        let loan = workflow::checkout(&mut self.repository, checkout, &self.policy, self.clock.now())?;
        tracing::info!("Checked out {} to {} as {}", loan.book_id, loan.borrower, loan.id);
        Ok(self.view(&loan))
    }

    /// Close an open loan today
    pub fn return_loan(&mut self, loan_id: &str) -> AppResult<LoanView> {
        let today = self.today();
        let repository = &mut self.repository;
        let loan = repository
            .loans
            .return_loan(loan_id, today, self.policy.daily_fine, &mut repository.books)
            .inspect_err(|e| tracing::warn!("Return of {} rejected: {}", loan_id, e))?;
        tracing::info!("Returned {} (fine {})", loan.id, loan.fine);
        Ok(self.view(&loan))
    }

    /// Return by loan id, or by book id resolving to that book's oldest open loan
    pub fn quick_return(&mut self, key: &str) -> AppResult<LoanView> {
        let key = key.trim();
        let loan_id = match self.repository.loans.get(key) {
            Some(loan) => loan.id.clone(),
            None => self
                .repository
                .loans
                .oldest_open_for_book(key)
                .map(|loan| loan.id.clone())
                .ok_or_else(|| AppError::NotFound(format!("No open loan matches {}", key)))?,
        };
        self.return_loan(&loan_id)
    }

    /// Loans matching `filter`, classified against today at the time of the call
    pub fn list_loans<'a>(&'a self, filter: &'a LoanFilter) -> impl Iterator<Item = LoanView> + 'a {
        tracing::debug!("Listing loans with {:?}", filter);
        self.repository
            .loans
            .list(filter, self.today(), self.policy.daily_fine)
            .map(move |view| self.with_title(view))
    }

    /// Open loans held by a borrower
    pub fn borrower_loans(&self, borrower: &str) -> Vec<LoanView> {
        let filter = LoanFilter::borrower(borrower);
        self.list_loans(&filter)
            .filter(|view| view.return_date.is_none())
            .collect()
    }

    /// Every loan of a borrower, most recent first
    pub fn borrower_history(&self, borrower: &str) -> Vec<LoanView> {
        let filter = LoanFilter::borrower(borrower);
        let mut history: Vec<LoanView> = self.list_loans(&filter).collect();
        history.reverse();
        history
    }

    pub fn find_loan(&self, loan_id: &str) -> AppResult<LoanView> {
        let loan = self.repository.loans.get_by_id(loan_id)?;
        Ok(self.view(loan))
    }

    // ---------------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------------

    pub fn current_stats(&self) -> Stats {
        tracing::debug!("Computing stats for {}", self.today());
        stats::aggregate(&self.repository, self.today(), self.policy.daily_fine)
    }

    fn view(&self, loan: &Loan) -> LoanView {
        self.with_title(to_view(loan, self.today(), self.policy.daily_fine))
    }

    fn with_title(&self, mut view: LoanView) -> LoanView {
        view.book_title = self.repository.books.get(&view.book_id).map(|b| b.title.clone());
        view
    }
}

/// Shares one desk between request handlers. Writers are serialized, so a
/// transition always sees the state left by the previous one.
#[derive(Clone)]
pub struct CirculationService {
    desk: Arc<RwLock<CirculationDesk>>,
}

impl CirculationService {
    pub fn new(desk: CirculationDesk) -> Self {
        Self {
            desk: Arc::new(RwLock::new(desk)),
        }
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, CirculationDesk> {
        self.desk.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, CirculationDesk> {
        self.desk.write().await
    }
}
