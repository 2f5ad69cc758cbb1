//! HTTP client for the remote classification service that turns free-form
//! messages into transactions and keeps the chat history.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;

use crate::{
    Error, UserUuid,
    chat::{AutoTransactionRequest, AutoTransactionResponse, HistoryEntry},
};

/// The path of the endpoint that returns a user's chat history.
pub const HISTORY_PATH: &str = "/api/v1/chatbot/history";
/// The path of the endpoint that classifies a message as a transaction.
pub const AUTO_TRANSACTION_PATH: &str = "/api/v1/transactions:auto";

/// The default time to wait for the classification service before giving up.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the classification service.
///
/// Cloning is cheap, clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the service at `base_url`, e.g. "http://localhost:8080".
    ///
    /// # Errors
    /// Returns [Error::InvalidBackendUrl] if `base_url` is not an HTTP(S) URL, or
    /// [Error::HttpClient] if the HTTP client cannot be created.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, Error> {
        let url = Url::parse(base_url)
            .map_err(|error| Error::InvalidBackendUrl(format!("\"{base_url}\": {error}")))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::InvalidBackendUrl(format!(
                "\"{base_url}\": scheme must be http or https"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| Error::HttpClient(error.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Get the chat history of `user`, oldest turn first.
    ///
    /// # Errors
    /// - [Error::BackendUnreachable] if the request could not be sent,
    /// - [Error::BackendStatus] if the service responded with a non-success status,
    /// - [Error::InvalidBackendResponse] if the body is not a list of chat turns.
    pub async fn fetch_history(&self, user: &UserUuid) -> Result<Vec<HistoryEntry>, Error> {
        tracing::debug!("Fetching chat history for user {user}");

        let response = self
            .client
            .get(format!("{}{HISTORY_PATH}", self.base_url))
            .query(&[("userUuid", user.as_str())])
            .send()
            .await?;

        decode_json(response).await
    }

    /// Ask the service to record `message` from `user` as a transaction.
    ///
    /// # Errors
    /// Same as [BackendClient::fetch_history].
    pub async fn classify_message(
        &self,
        message: &str,
        user: &UserUuid,
    ) -> Result<AutoTransactionResponse, Error> {
        tracing::debug!("Classifying message for user {user}");

        let response = self
            .client
            .post(format!("{}{AUTO_TRANSACTION_PATH}", self.base_url))
            .json(&AutoTransactionRequest {
                message,
                user_uuid: user.as_str(),
            })
            .send()
            .await?;

        decode_json(response).await
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, Error> {
    let status = response.status();

    if !status.is_success() {
        return Err(Error::BackendStatus(status.as_u16()));
    }

    response
        .json::<T>()
        .await
        .map_err(|error| Error::InvalidBackendResponse(error.to_string()))
}
