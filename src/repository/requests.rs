//! Borrow request store

use chrono::{DateTime, Utc};
use indexmap::IndexMap;

use crate::{
    error::{AppError, AppResult},
    models::request::{BorrowRequest, RequestStatus, Requester},
};

#[derive(Debug, Default)]
pub struct RequestsRepository {
    requests: IndexMap<String, BorrowRequest>,
    next_id: u64,
}

impl RequestsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &mut self,
        book_id: &str,
        requester: Requester,
        created_at: DateTime<Utc>,
    ) -> BorrowRequest {
        self.next_id += 1;
        let request = BorrowRequest {
            id: format!("R{}", self.next_id),
            book_id: book_id.to_string(),
            requester,
            created_at,
            status: RequestStatus::Pending,
            decided_at: None,
            loan_id: None,
        };
        self.requests.insert(request.id.clone(), request.clone());
        request
    }

    /// Get request by ID
    pub fn get_by_id(&self, id: &str) -> AppResult<&BorrowRequest> {
        self.requests
            .get(id)
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))
    }

    /// Get request by ID, failing unless it is still pending
    pub fn pending_by_id(&self, id: &str) -> AppResult<&BorrowRequest> {
        let request = self.get_by_id(id)?;
        if request.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "Request {} is already {:?}",
                id, request.status
            )));
        }
        Ok(request)
    }

    /// Move a pending request to a terminal status.
    /// The pending check runs against the stored state at the moment of the call.
    pub fn resolve(
        &mut self,
        id: &str,
        status: RequestStatus,
        decided_at: DateTime<Utc>,
        loan_id: Option<String>,
    ) -> AppResult<BorrowRequest> {
        if !status.is_terminal() {
            return Err(AppError::Internal(format!("Cannot resolve {} to pending", id)));
        }
        self.pending_by_id(id)?;
        let request = self
            .requests
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Request {} not found", id)))?;
        request.status = status;
        request.decided_at = Some(decided_at);
        request.loan_id = loan_id;
        Ok(request.clone())
    }

    /// Pending requests, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &BorrowRequest> {
        self.requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
    }

    /// Every request ever made, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &BorrowRequest> {
        self.requests.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::request::Role;

    fn alice() -> Requester {
        Requester {
            name: "Alice".to_string(),
            role: Role::Member,
        }
    }

    #[test]
    fn test_resolve_only_once() {
        let mut repo = RequestsRepository::new();
        let now = Utc::now();
        let request = repo.create("B1", alice(), now);
        assert_eq!(request.id, "R1");

        let denied = repo.resolve(&request.id, RequestStatus::Denied, now, None).unwrap();
        assert_eq!(denied.status, RequestStatus::Denied);
        assert_eq!(denied.decided_at, Some(now));

        let again = repo.resolve(&request.id, RequestStatus::Approved, now, Some("L1".into()));
        assert!(matches!(again, Err(AppError::InvalidState(_))));
        assert_eq!(repo.get_by_id(&request.id).unwrap().status, RequestStatus::Denied);
        assert_eq!(repo.pending().count(), 0);
        assert_eq!(repo.iter().count(), 1);
    }

    #[test]
    fn test_resolve_missing() {
        let mut repo = RequestsRepository::new();
        let result = repo.resolve("R7", RequestStatus::Denied, Utc::now(), None);
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
