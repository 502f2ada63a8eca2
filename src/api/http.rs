//! Implements `TransactionRepository` against a ledger server over HTTP.

use crate::api::{TransactionRepository, CREATE, DELETE, LIST, UPDATE};
use crate::error::{Error, ErrorType, IntoResult, Result};
use crate::filter::ListQuery;
use crate::model::{Transaction, TransactionFields};
use crate::session::Session;
use anyhow::Context;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Each operation is one `POST` with a JSON body. Failures are classified by status: no response
/// at all is `Network`, 404 is `NotFound`, any other 4xx is `Validation` and 5xx is `Server`.
pub struct HttpRepository {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRepository {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Unable to create the HTTP client")
            .pub_result(ErrorType::Config)?;
        Ok(Self { client, base_url })
    }

    async fn post<B>(&self, endpoint: &str, body: &B) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let url = self
            .base_url
            .join(endpoint)
            .with_context(|| format!("Unable to build the URL for {endpoint}"))
            .pub_result(ErrorType::Config)?;
        trace!("POST {url}");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Unable to reach the server for {endpoint}"))
            .pub_result(ErrorType::Network)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response body".to_string());
        Err(status_error(endpoint, status, &body))
    }

    /// Sends `body` and returns the response body as text.
    async fn post_text<B>(&self, endpoint: &str, body: &B) -> Result<String>
    where
        B: Serialize + ?Sized,
    {
        self.post(endpoint, body)
            .await?
            .text()
            .await
            .with_context(|| format!("Unable to read the response of {endpoint}"))
            .pub_result(ErrorType::Network)
    }

    async fn post_json<B, T>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let text = self.post_text(endpoint, body).await?;
        decode(endpoint, &text)
    }
}

/// A body that arrived in full but is not what the server promised is the server's fault.
fn decode<T: DeserializeOwned>(endpoint: &str, text: &str) -> Result<T> {
    serde_json::from_str(text)
        .with_context(|| format!("Unexpected response from {endpoint}: {}", text.trim()))
        .pub_result(ErrorType::Server)
}

/// The created transaction if the acknowledgment carries one. Servers may answer a create with
/// only a status or a message, which still means the transaction was stored.
fn created(text: &str) -> Option<Transaction> {
    match serde_json::from_str::<Transaction>(text) {
        Ok(transaction) => Some(transaction),
        Err(e) => {
            debug!("Create acknowledged without a transaction: {e}");
            None
        }
    }
}

fn status_error(endpoint: &str, status: StatusCode, body: &str) -> Error {
    let kind = if status == StatusCode::NOT_FOUND {
        ErrorType::NotFound
    } else if status.is_client_error() {
        ErrorType::Validation
    } else {
        ErrorType::Server
    };
    Error::msg(
        kind,
        format!("{endpoint} failed with status {status}: {}", body.trim()),
    )
}

#[derive(Serialize)]
struct CreateBody<'a> {
    #[serde(flatten)]
    fields: &'a TransactionFields,
    userid: &'a str,
}

#[derive(Serialize)]
struct UpdatePayload<'a> {
    #[serde(flatten)]
    fields: &'a TransactionFields,
    #[serde(rename = "userId")]
    user_id: &'a str,
}

#[derive(Serialize)]
struct UpdateBody<'a> {
    payload: UpdatePayload<'a>,
    #[serde(rename = "transactionId")]
    transaction_id: &'a str,
}

#[derive(Serialize)]
struct DeleteBody<'a> {
    #[serde(rename = "transactionId")]
    transaction_id: &'a str,
    userid: &'a str,
}

#[async_trait::async_trait]
impl TransactionRepository for HttpRepository {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Transaction>> {
        self.post_json(LIST, query).await
    }

    async fn create(
        &self,
        session: &Session,
        fields: &TransactionFields,
    ) -> Result<Option<Transaction>> {
        let body = CreateBody {
            fields,
            userid: session.user_id(),
        };
        let text = self.post_text(CREATE, &body).await?;
        Ok(created(&text))
    }

    async fn update(&self, session: &Session, id: &str, fields: &TransactionFields) -> Result<()> {
        let body = UpdateBody {
            payload: UpdatePayload {
                fields,
                user_id: session.user_id(),
            },
            transaction_id: id,
        };
        self.post(UPDATE, &body).await.map(|_| ())
    }

    async fn delete(&self, session: &Session, id: &str) -> Result<()> {
        let body = DeleteBody {
            transaction_id: id,
            userid: session.user_id(),
        };
        self.post(DELETE, &body).await.map(|_| ())
    }
}
