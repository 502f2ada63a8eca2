//! The logged-in user.
//!
//! Every repository call is scoped to a user. Rather than looking the user up from ambient storage
//! inside business logic, a `Session` value is loaded once and handed to the controllers, which
//! cannot be constructed without one.

use crate::error::{ErrorType, IntoResult};
use crate::{utils, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The identity of the logged-in user, as stored in `$LEDGER_HOME/session.json`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "_id")]
    user_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    email: String,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            name: String::new(),
            email: String::new(),
        }
    }

    pub fn with_profile(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.name = name.into();
        self.email = email.into();
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Loads the session from `path`. A missing file means nobody is logged in.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(anyhow::anyhow!(
                "Nobody is logged in (no session at '{}'), run 'ledger login' first",
                path.display()
            ))
            .pub_result(ErrorType::Session);
        }
        let session: Session = utils::deserialize(path).await.pub_result(ErrorType::Session)?;
        if session.user_id.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "The session at '{}' has no user id",
                path.display()
            ))
            .pub_result(ErrorType::Session);
        }
        Ok(session)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Unable to serialize session")
            .pub_result(ErrorType::Session)?;
        utils::write(path, json).await.pub_result(ErrorType::Session)
    }

    /// Removes the session file. Returns `false` if nobody was logged in.
    pub async fn clear(path: &Path) -> Result<bool> {
        if !path.is_file() {
            return Ok(false);
        }
        utils::remove(path).await.pub_result(ErrorType::Session)?;
        Ok(true)
    }
}
