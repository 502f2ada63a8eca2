//! Command handlers for the ledger CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod auth;
mod delete;
mod init;
mod insert;
mod query;
mod update;

use crate::api::{self, Mode};
use crate::controller::{QueryOutcome, TransactionPage};
use crate::error::Error;
use crate::filter::FilterCriteria;
use crate::model::Transaction;
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

pub use auth::{login, logout};
pub use delete::delete;
pub use init::init;
pub use insert::add;
pub use query::{analytics, list};
pub use update::edit;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Loads the logged-in user and builds the page controllers against the repository for `mode`.
async fn open_page(config: &Config, mode: Mode) -> Result<TransactionPage> {
    let session = config.session().await?;
    debug!("Opening transactions for user {}", session.user_id());
    let repo = api::repository(config, &session, mode)?;
    Ok(TransactionPage::new(repo, session))
}

/// Applies `criteria` and returns the list it produced. A failed fetch has already been reported
/// by the notifier; it is returned as an error so that the command fails.
async fn load(page: &TransactionPage, criteria: FilterCriteria) -> Result<Vec<Transaction>> {
    match page.filter_changed(criteria).await {
        QueryOutcome::Failed(kind) => {
            let message = page.query().view().await.error.unwrap_or_default();
            Err(Error::msg(kind, message))
        }
        _ => Ok(page.query().transactions().await),
    }
}

/// Renders transactions as a markdown table.
fn table(transactions: &[Transaction]) -> String {
    let mut out = String::from(
        "| Date | Type | Category | Amount | Reference | Description | Id |\n\
         |------|------|----------|--------|-----------|-------------|----|\n",
    );
    for t in transactions {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            crate::model::format_date(t.date()),
            t.kind(),
            t.category(),
            t.amount().to_currency(),
            t.reference(),
            t.description(),
            t.id(),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixture_transactions;

    #[test]
    fn test_out_from_message() {
        let out: Out<()> = "done".into();
        assert_eq!(out.message(), "done");
        assert!(out.structure().is_none());
    }

    #[test]
    fn test_table_rows() {
        let rendered = table(&fixture_transactions()[..2]);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[2],
            "| 2024-01-09 | income | salary | $500.00 |  |  | salary |"
        );
    }
}
