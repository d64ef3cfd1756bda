//! Statistics aggregation

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{
    models::{loan::LoanStatus, stats::Stats},
    repository::Repository,
    services::policy,
};

/// Recompute every counter from the current stores. Nothing is cached.
pub fn aggregate(repository: &Repository, today: NaiveDate, daily_fine: Decimal) -> Stats {
    let mut stats = Stats {
        total_books: repository.books.total_stock(),
        ..Stats::default()
    };

    let mut members: HashSet<&str> = HashSet::new();

    for loan in repository.loans.iter() {
        members.insert(loan.borrower.as_str());
        if !loan.is_open() {
            continue;
        }
        stats.issued += 1;
        match policy::classify(today, loan.due_date, loan.return_date) {
            LoanStatus::Overdue => {
                stats.overdue += 1;
                stats.accruing_fines += policy::fine(loan.due_date, today, daily_fine);
            }
            LoanStatus::DueSoon => stats.due_soon += 1,
            LoanStatus::Active | LoanStatus::Returned => {}
        }
    }

    for request in repository.requests.pending() {
        members.insert(request.requester.name.as_str());
        stats.pending_requests += 1;
    }

    stats.members = members.len() as u64;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{book::CreateBook, request::{Requester, Role}};
    use chrono::{Duration, Utc};

    fn day(n: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_empty() {
        let stats = aggregate(&Repository::new(), day(0), Decimal::from(5000));
        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn test_counts() {
        let mut repository = Repository::new();
        let rate = Decimal::from(5000);
        let book = repository.books.create(CreateBook::new("Dune", "Frank Herbert", "Fiction", 3)).unwrap();
        repository.books.create(CreateBook::new("Emma", "Jane Austen", "Fiction", 2)).unwrap();

        repository.books.decrement_stock(&book.id).unwrap();
        repository.loans.open_loan(&book.id, "Alice", day(0), day(14), None).unwrap();
        repository.books.decrement_stock(&book.id).unwrap();
        let returned = repository.loans.open_loan(&book.id, "Bob", day(0), day(14), None).unwrap();
        repository.loans.return_loan(&returned.id, day(2), rate, &mut repository.books).unwrap();
        repository.books.decrement_stock(&book.id).unwrap();
        repository.loans.open_loan(&book.id, "Alice", day(5), day(19), None).unwrap();

        let carol = Requester { name: "Carol".into(), role: Role::Member };
        repository.requests.create(&book.id, carol, Utc::now());

        let stats = aggregate(&repository, day(16), rate);
        assert_eq!(stats.total_books, 3);
        assert_eq!(stats.issued, 2);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.due_soon, 1);
        assert_eq!(stats.members, 3);
        assert_eq!(stats.pending_requests, 1);
        assert_eq!(stats.accruing_fines, Decimal::from(10000));
    }
}
