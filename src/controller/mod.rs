//! The controllers behind the transactions page.
//!
//! `TransactionPage` wires a `QueryController`, a `MutationCoordinator` and a `FormController`
//! around one repository and one `Session`, and exposes the intents a view emits: a filter
//! change, an edit or delete request on a row, and submitting or cancelling the form.

mod form;
mod mutation;
mod notify;
mod query;

pub use form::{Field, FieldError, FormController, FormFields, FormMode, FormView, Submitted};
pub use mutation::{MutationCoordinator, MutationKey};
pub use notify::{Level, Notification, Notifier};
pub use query::{LoadingState, QueryController, QueryOutcome, QueryView, Ticket};

use crate::api::TransactionRepository;
use crate::error::Result;
use crate::filter::FilterCriteria;
use crate::model::Transaction;
use crate::session::Session;
use std::sync::Arc;

pub struct TransactionPage {
    query: Arc<QueryController>,
    mutations: Arc<MutationCoordinator>,
    form: FormController,
    notifier: Notifier,
}

impl TransactionPage {
    /// Builds the controllers. Nothing is fetched until the first intent.
    pub fn new(repo: Arc<dyn TransactionRepository>, session: Session) -> Self {
        let notifier = Notifier::new();
        let query = Arc::new(QueryController::new(
            repo.clone(),
            session.clone(),
            notifier.clone(),
        ));
        let mutations = Arc::new(MutationCoordinator::new(
            repo,
            session,
            query.clone(),
            notifier.clone(),
        ));
        let form = FormController::new(mutations.clone());
        Self {
            query,
            mutations,
            form,
            notifier,
        }
    }

    pub fn query(&self) -> &QueryController {
        &self.query
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn mutations(&self) -> &MutationCoordinator {
        &self.mutations
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub async fn filter_changed(&self, criteria: FilterCriteria) -> QueryOutcome {
        self.query.filter_changed(criteria).await
    }

    pub async fn edit_requested(&self, record: Transaction) {
        self.form.open_edit(record).await;
    }

    pub async fn delete_requested(&self, id: &str) -> Result<()> {
        self.mutations.delete(id).await
    }

    pub async fn form_submitted(&self) -> Result<Submitted> {
        self.form.submit().await
    }

    pub async fn form_cancelled(&self) {
        self.form.cancel().await;
    }
}
