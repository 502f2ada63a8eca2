//! Keeps the displayed transaction list in sync with the current filter.
//!
//! Every list request is tagged with a sequence number when it is issued. A response is applied
//! only if its tag is the latest one issued, so a slow response for an old filter can never
//! overwrite the result of a newer one. Issuing and completing are separate steps, and the lock
//! is never held while the repository is being awaited.

use crate::api::TransactionRepository;
use crate::controller::Notifier;
use crate::error::{ErrorType, Result};
use crate::filter::{FilterCriteria, ListQuery};
use crate::model::Transaction;
use crate::session::Session;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, trace};

const FETCH_FAILED: &str = "Fetch Issue with Transaction";

#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingState {
    #[default]
    Idle,
    Loading,
    Error,
}

/// What happened to a list response.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum QueryOutcome {
    /// The response was the latest and is now displayed.
    Displayed,
    /// A newer request had been issued; the response was dropped.
    Discarded,
    /// The latest request failed. The previous list is still displayed.
    Failed(ErrorType),
}

/// An issued list request. Hand it back to `QueryController::complete` with the repository's
/// answer.
#[derive(Debug, Clone)]
pub struct Ticket {
    seq: u64,
    query: ListQuery,
}

impl Ticket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }
}

/// A snapshot of what the list area of the page shows.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct QueryView {
    pub criteria_frequency: String,
    pub criteria_type: String,
    pub loading: LoadingState,
    pub transactions: Vec<Transaction>,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
struct QueryState {
    criteria: FilterCriteria,
    issued: u64,
    loading: LoadingState,
    transactions: Vec<Transaction>,
    error: Option<String>,
}

pub struct QueryController {
    repo: Arc<dyn TransactionRepository>,
    session: Session,
    notifier: Notifier,
    state: Mutex<QueryState>,
}

impl QueryController {
    pub fn new(repo: Arc<dyn TransactionRepository>, session: Session, notifier: Notifier) -> Self {
        Self {
            repo,
            session,
            notifier,
            state: Mutex::new(QueryState::default()),
        }
    }

    /// Applies a new filter selection and fetches the list for it.
    pub async fn filter_changed(&self, criteria: FilterCriteria) -> QueryOutcome {
        let ticket = self.issue(criteria).await;
        self.fetch(ticket).await
    }

    /// Fetches the list again for the current filter.
    pub async fn refresh(&self) -> QueryOutcome {
        let ticket = self.issue_refresh().await;
        self.fetch(ticket).await
    }

    /// Records `criteria` as current and issues a request for it without sending it.
    pub async fn issue(&self, criteria: FilterCriteria) -> Ticket {
        let mut state = self.state.lock().await;
        state.criteria = criteria;
        self.next_ticket(&mut state)
    }

    /// Issues a request for the current criteria without sending it.
    pub async fn issue_refresh(&self) -> Ticket {
        let mut state = self.state.lock().await;
        self.next_ticket(&mut state)
    }

    /// Applies the repository's answer to `ticket`, unless a newer ticket has been issued since.
    pub async fn complete(
        &self,
        ticket: Ticket,
        result: Result<Vec<Transaction>>,
    ) -> QueryOutcome {
        let mut state = self.state.lock().await;
        if ticket.seq != state.issued {
            debug!(
                "Discarding list response {} because {} is the latest request",
                ticket.seq, state.issued
            );
            if let Err(e) = result {
                debug!("The discarded response was an error: {e}");
            }
            return QueryOutcome::Discarded;
        }
        match result {
            Ok(transactions) => {
                trace!(
                    "Displaying {} transactions for request {}",
                    transactions.len(),
                    ticket.seq
                );
                state.transactions = transactions;
                state.loading = LoadingState::Idle;
                state.error = None;
                QueryOutcome::Displayed
            }
            Err(e) => {
                state.loading = LoadingState::Error;
                state.error = Some(e.to_string());
                drop(state);
                self.notifier.error(FETCH_FAILED, &e).await;
                QueryOutcome::Failed(e.kind())
            }
        }
    }

    pub async fn criteria(&self) -> FilterCriteria {
        self.state.lock().await.criteria.clone()
    }

    pub async fn loading_state(&self) -> LoadingState {
        self.state.lock().await.loading
    }

    /// The displayed list. While a request is loading this is the previous result.
    pub async fn transactions(&self) -> Vec<Transaction> {
        self.state.lock().await.transactions.clone()
    }

    pub async fn view(&self) -> QueryView {
        let state = self.state.lock().await;
        QueryView {
            criteria_frequency: state.criteria.frequency().to_string(),
            criteria_type: state.criteria.type_filter().to_string(),
            loading: state.loading,
            transactions: state.transactions.clone(),
            error: state.error.clone(),
        }
    }

    fn next_ticket(&self, state: &mut QueryState) -> Ticket {
        state.issued += 1;
        state.loading = LoadingState::Loading;
        let query = state.criteria.to_query(self.session.user_id());
        debug!("Issuing list request {}", state.issued);
        Ticket {
            seq: state.issued,
            query,
        }
    }

    async fn fetch(&self, ticket: Ticket) -> QueryOutcome {
        let result = self.repo.list(ticket.query()).await;
        self.complete(ticket, result).await
    }
}
