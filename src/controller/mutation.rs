//! Create, update and delete, followed by exactly one list refresh.
//!
//! The coordinator never edits the displayed list itself. After a mutation succeeds it asks the
//! `QueryController` to refresh with the current filter, and the refreshed list is the single
//! source of truth. Only one mutation per form or record may be in flight; a second attempt is
//! rejected before it reaches the network.

use crate::api::TransactionRepository;
use crate::controller::{Notifier, QueryController};
use crate::error::{Error, ErrorType, Result};
use crate::model::{Transaction, TransactionFields};
use crate::session::Session;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// What a mutation is about. A create is keyed on the form since there is no id yet.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum MutationKey {
    NewTransaction,
    Record(String),
}

struct Messages {
    success: &'static str,
    failure: &'static str,
}

const CREATE: Messages = Messages {
    success: "Transaction Added Successfully",
    failure: "Failed to add transaction",
};

const UPDATE: Messages = Messages {
    success: "Transaction Updated Successfully",
    failure: "Failed to update transaction",
};

const DELETE: Messages = Messages {
    success: "Transaction Deleted",
    failure: "Unable to delete",
};

type PendingSet = Mutex<HashSet<MutationKey>>;

/// Removes its key from the pending set when dropped, even if the mutation future is dropped
/// before it finishes.
struct PendingGuard<'a> {
    pending: &'a PendingSet,
    key: MutationKey,
}

impl<'a> PendingGuard<'a> {
    fn acquire(pending: &'a PendingSet, key: MutationKey) -> Result<Self> {
        let mut set = pending.lock().unwrap_or_else(PoisonError::into_inner);
        if !set.insert(key.clone()) {
            return Err(Error::msg(
                ErrorType::Pending,
                format!("A change to {key:?} is already in progress"),
            ));
        }
        Ok(Self { pending, key })
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

pub struct MutationCoordinator {
    repo: Arc<dyn TransactionRepository>,
    session: Session,
    query: Arc<QueryController>,
    notifier: Notifier,
    pending: PendingSet,
}

impl MutationCoordinator {
    pub fn new(
        repo: Arc<dyn TransactionRepository>,
        session: Session,
        query: Arc<QueryController>,
        notifier: Notifier,
    ) -> Self {
        Self {
            repo,
            session,
            query,
            notifier,
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Creates a transaction and returns it as stored by the server, if the server sent it back.
    pub async fn create(&self, fields: TransactionFields) -> Result<Option<Transaction>> {
        let mutation = self.repo.create(&self.session, &fields);
        self.run(MutationKey::NewTransaction, CREATE, mutation).await
    }

    pub async fn update(&self, id: &str, fields: TransactionFields) -> Result<()> {
        let mutation = self.repo.update(&self.session, id, &fields);
        self.run(MutationKey::Record(id.to_string()), UPDATE, mutation)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let mutation = self.repo.delete(&self.session, id);
        self.run(MutationKey::Record(id.to_string()), DELETE, mutation)
            .await
    }

    /// Whether a mutation for `key` is in flight.
    pub fn is_pending(&self, key: &MutationKey) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }

    async fn run<T>(
        &self,
        key: MutationKey,
        messages: Messages,
        mutation: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let guard = PendingGuard::acquire(&self.pending, key)?;
        debug!("Starting mutation {:?}", guard.key);
        let result = mutation.await;
        drop(guard);

        match result {
            Ok(value) => {
                self.notifier.success(messages.success).await;
                self.query.refresh().await;
                Ok(value)
            }
            Err(e) => {
                self.notifier.error(messages.failure, &e).await;
                // The record is gone on the server, so the displayed list is out of date.
                if e.kind() == ErrorType::NotFound {
                    self.query.refresh().await;
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryRepository, Op};
    use crate::controller::Level;
    use crate::model::{Amount, Category, TransactionType};
    use crate::test::{fixture_repository, fixture_today, GatedRepository};

    struct Harness {
        query: Arc<QueryController>,
        mutations: Arc<MutationCoordinator>,
        notifier: Notifier,
    }

    async fn harness(repo: Arc<dyn TransactionRepository>) -> Harness {
        let notifier = Notifier::new();
        let session = Session::new("u1");
        let query = Arc::new(QueryController::new(
            repo.clone(),
            session.clone(),
            notifier.clone(),
        ));
        query.refresh().await;
        let mutations = Arc::new(MutationCoordinator::new(
            repo,
            session,
            query.clone(),
            notifier.clone(),
        ));
        Harness {
            query,
            mutations,
            notifier,
        }
    }

    fn lunch() -> TransactionFields {
        TransactionFields {
            date: fixture_today(),
            amount: Amount::from(15),
            kind: TransactionType::Expense,
            category: Category::Food,
            reference: String::new(),
            description: "Lunch".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_shows_record_once() {
        let repo = fixture_repository().await;
        let h = harness(repo.clone()).await;
        let created = h.mutations.create(lunch()).await.unwrap().unwrap();

        let shown = h.query.transactions().await;
        assert_eq!(shown.iter().filter(|t| t.id() == created.id()).count(), 1);
        // One refresh at setup and exactly one after the create.
        assert_eq!(repo.calls(Op::List).await, 2);

        let notes = h.notifier.drain().await;
        assert_eq!(notes.last().unwrap().message(), "Transaction Added Successfully");
    }

    #[tokio::test]
    async fn test_update_is_reflected_after_refresh() {
        let repo = fixture_repository().await;
        let h = harness(repo).await;
        let mut fields = lunch();
        fields.description = "Dinner".to_string();
        fields.amount = Amount::from(70);
        h.mutations.update("groceries", fields).await.unwrap();

        let shown = h.query.transactions().await;
        let updated = shown.iter().find(|t| t.id() == "groceries").unwrap();
        assert_eq!(updated.description(), "Dinner");
        assert_eq!(updated.amount(), Amount::from(70));
    }

    #[tokio::test]
    async fn test_delete_removes_record() {
        let repo = fixture_repository().await;
        let h = harness(repo).await;
        assert!(h.query.transactions().await.iter().any(|t| t.id() == "groceries"));
        h.mutations.delete("groceries").await.unwrap();
        assert!(!h.query.transactions().await.iter().any(|t| t.id() == "groceries"));
        let notes = h.notifier.drain().await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message(), "Transaction Deleted");
    }

    #[tokio::test]
    async fn test_failure_notifies_once_and_does_not_refresh() {
        let repo = fixture_repository().await;
        let h = harness(repo.clone()).await;
        repo.fail_next(Op::Create, ErrorType::Server).await;
        let err = h.mutations.create(lunch()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorType::Server);
        assert_eq!(repo.calls(Op::List).await, 1);

        let notes = h.notifier.drain().await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level(), Level::Error);
        assert!(notes[0].message().starts_with("Failed to add transaction"));
        assert!(!h.mutations.is_pending(&MutationKey::NewTransaction));
    }

    #[tokio::test]
    async fn test_not_found_resyncs_the_list() {
        let repo = Arc::new(MemoryRepository::new(fixture_today()));
        let h = harness(repo.clone()).await;
        let err = h.mutations.delete("vanished").await.unwrap_err();
        assert_eq!(err.kind(), ErrorType::NotFound);
        assert_eq!(repo.calls(Op::List).await, 2);
        let notes = h.notifier.drain().await;
        assert_eq!(notes.len(), 1);
        assert!(notes[0].message().starts_with("Unable to delete"));
    }

    #[tokio::test]
    async fn test_update_of_missing_record_resyncs_the_list() {
        let repo = fixture_repository().await;
        let h = harness(repo.clone()).await;
        let err = h.mutations.update("vanished", lunch()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorType::NotFound);
        // One refresh at setup and one to resync.
        assert_eq!(repo.calls(Op::List).await, 2);
        let notes = h.notifier.drain().await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level(), Level::Error);
        assert!(notes[0].message().starts_with("Failed to update transaction"));
        assert!(!h
            .mutations
            .is_pending(&MutationKey::Record("vanished".to_string())));
    }

    #[tokio::test]
    async fn test_duplicate_delete_is_rejected_while_pending() {
        let memory = fixture_repository().await;
        let gated = Arc::new(GatedRepository::new(memory.clone()));
        let h = harness(gated.clone()).await;

        let gate = gated.close().await;
        let first = {
            let mutations = h.mutations.clone();
            tokio::spawn(async move { mutations.delete("groceries").await })
        };
        gated.wait_for_waiters(1).await;
        assert!(h
            .mutations
            .is_pending(&MutationKey::Record("groceries".to_string())));

        let err = h.mutations.delete("groceries").await.unwrap_err();
        assert_eq!(err.kind(), ErrorType::Pending);
        // Another record is not blocked by the pending one.
        assert!(!h.mutations.is_pending(&MutationKey::Record("salary".to_string())));

        gate.open();
        first.await.unwrap().unwrap();
        assert_eq!(memory.calls(Op::Delete).await, 1);
        let notes = h.notifier.drain().await;
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].message(), "Transaction Deleted");
    }
}
