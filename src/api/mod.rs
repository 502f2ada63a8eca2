//! The gateway to the remote transaction store.
//!
//! `TransactionRepository` is the seam between the controllers and the server. `HttpRepository`
//! talks to a real ledger server; `MemoryRepository` keeps everything in memory so that the app
//! can run top-to-bottom, and be tested, without one.

mod http;
mod memory;

use crate::error::Result;
use crate::filter::ListQuery;
use crate::model::{Transaction, TransactionFields};
use crate::session::Session;
use crate::Config;
use std::sync::Arc;
use tracing::debug;

pub use http::HttpRepository;
pub use memory::{MemoryRepository, Op};

pub(crate) const LIST: &str = "transections/get-transection";
pub(crate) const CREATE: &str = "transections/add-transection";
pub(crate) const UPDATE: &str = "transections/edit-transection";
pub(crate) const DELETE: &str = "transections/delete-transection";

/// Performs list, create, update and delete calls against the store. Every call is scoped to a
/// single user: `list` through the user id embedded in the `ListQuery`, mutations through the
/// `session` argument.
///
/// `list` has no side effects and may be repeated freely. `create` is not idempotent, calling it
/// twice creates two transactions.
#[async_trait::async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Returns the user's transactions matching `query`, in display order.
    ///
    /// # Errors
    /// `Network` or `Server`. A failed list never returns partial results.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Transaction>>;

    /// Creates a transaction from `fields`. Returns it with its server-assigned id when the server
    /// sends it back, `None` when the server only acknowledges the create.
    ///
    /// # Errors
    /// `Validation` if a field is missing or invalid, `Network` or `Server` otherwise.
    async fn create(
        &self,
        session: &Session,
        fields: &TransactionFields,
    ) -> Result<Option<Transaction>>;

    /// Replaces the editable fields of transaction `id`.
    ///
    /// # Errors
    /// `NotFound` if `id` no longer exists, `Validation` on bad fields.
    async fn update(&self, session: &Session, id: &str, fields: &TransactionFields) -> Result<()>;

    /// Deletes transaction `id`.
    ///
    /// # Errors
    /// `NotFound` if it was already deleted.
    async fn delete(&self, session: &Session, id: &str) -> Result<()>;
}

/// Whether we are talking to a real server or running against in-memory data.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    #[default]
    Server,
    Test,
}

impl Mode {
    /// When `LEDGER_IN_TEST_MODE` is set and non-empty the mode is `Test`, otherwise `Server`.
    pub fn from_env() -> Self {
        match std::env::var("LEDGER_IN_TEST_MODE") {
            Ok(s) if !s.is_empty() => Mode::Test,
            _ => Mode::Server,
        }
    }
}

/// Creates the repository for `mode`. In `Test` mode the in-memory store is seeded with sample
/// transactions owned by `session`'s user.
pub fn repository(
    config: &Config,
    session: &Session,
    mode: Mode,
) -> Result<Arc<dyn TransactionRepository>> {
    debug!("Creating {mode:?} repository");
    match mode {
        Mode::Server => Ok(Arc::new(HttpRepository::new(
            config.base_url().clone(),
            config.timeout(),
        )?)),
        Mode::Test => Ok(Arc::new(MemoryRepository::seeded(session.user_id())?)),
    }
}
