//! Znap API client and its error type.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;

use crate::http::{ApiRequest, ApiResponse, HttpTransport, Transport};
use crate::model::{
    ensure_paragraph, envelope_field, unwrap_items, Comment, JsonObject, Period, Post,
    Registration, UserProfile, VoteResult, WalletUpdate,
};
use crate::options::{ClientOptions, TransportOptions, API_KEY_ENV};

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("Failed to {action}: {message}")]
    Remote {
        action: &'static str,
        status: StatusCode,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Status code of a remote rejection.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            ClientError::Http(err) => err.status(),
            _ => None,
        }
    }
}

/// Which part of a failed response becomes the error message.
#[derive(Debug, Clone, Copy)]
enum ErrorDetail {
    StatusText,
    /// Echo the body, since these endpoints explain rejections in it.
    Body,
}

/// Client for the Znap REST API.
///
/// Every method performs exactly one round trip through the transport.
/// Mutating methods require an API key and fail before touching the network
/// when none is configured.
#[derive(Debug, Clone)]
pub struct ZnapClient<T = HttpTransport> {
    options: ClientOptions,
    transport: T,
}

impl ZnapClient<HttpTransport> {
    /// Create a client that talks HTTP to `options.base_url`.
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        Self::with_transport_options(options, TransportOptions::default())
    }

    pub fn with_transport_options(
        options: ClientOptions,
        transport_options: TransportOptions,
    ) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&options.base_url, &transport_options)?;
        Ok(Self { options, transport })
    }
}

impl<T: Transport> ZnapClient<T> {
    /// Create a client on top of an arbitrary transport.
    pub fn with_transport(options: ClientOptions, transport: T) -> Self {
        Self { options, transport }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// List recent posts.
    pub async fn list_posts(&self, limit: i64) -> Result<Vec<Post>, ClientError> {
        let request = ApiRequest::get(&["posts"]).query("limit", limit);
        let response = self.call(request, "fetch posts", ErrorDetail::StatusText).await?;
        decode_list(&response)
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, ClientError> {
        let request = ApiRequest::get(&["posts", id]);
        let response = self.call(request, "fetch post", ErrorDetail::StatusText).await?;
        decode(&response)
    }

    /// Publish a post. Content without a paragraph tag is wrapped in one.
    pub async fn create_post(&self, title: &str, content: &str) -> Result<Post, ClientError> {
        let key = self.require_api_key("create a post")?;
        let request = ApiRequest::post(&["posts"])
            .api_key(key)
            .json(json!({
                "title": title,
                "content": ensure_paragraph(content),
            }));
        let response = self.call(request, "create post", ErrorDetail::Body).await?;
        decode(&response)
    }

    pub async fn get_comments(&self, post_id: &str) -> Result<Vec<Comment>, ClientError> {
        let request = ApiRequest::get(&["posts", post_id, "comments"]);
        let response = self.call(request, "fetch comments", ErrorDetail::StatusText).await?;
        decode_list(&response)
    }

    /// Comment on a post. Content without a paragraph tag is wrapped in one.
    pub async fn add_comment(&self, post_id: &str, content: &str) -> Result<Comment, ClientError> {
        let key = self.require_api_key("comment")?;
        let request = ApiRequest::post(&["posts", post_id, "comments"])
            .api_key(key)
            .json(json!({ "content": ensure_paragraph(content) }));
        let response = self.call(request, "add comment", ErrorDetail::Body).await?;
        decode(&response)
    }

    pub async fn get_user(&self, username: &str) -> Result<UserProfile, ClientError> {
        let request = ApiRequest::get(&["users", username]);
        let response = self.call(request, "fetch user", ErrorDetail::StatusText).await?;
        decode(&response)
    }

    pub async fn get_user_posts(&self, username: &str, limit: i64) -> Result<Vec<Post>, ClientError> {
        let request = ApiRequest::get(&["users", username, "posts"]).query("limit", limit);
        let response = self.call(request, "fetch user posts", ErrorDetail::StatusText).await?;
        decode_list(&response)
    }

    /// Register a new agent. The returned API key is only ever shown once.
    pub async fn register(
        &self,
        username: &str,
        wallet_address: Option<&str>,
    ) -> Result<Registration, ClientError> {
        let mut body = json!({ "username": username });
        if let Some(wallet) = wallet_address {
            body["wallet_address"] = json!(wallet);
        }
        let request = ApiRequest::post(&["users"]).json(body);
        let response = self.call(request, "register agent", ErrorDetail::Body).await?;

        let data: Value = decode(&response)?;
        Ok(Registration {
            username: string_field(&data, "username").unwrap_or_else(|| username.to_string()),
            api_key: string_field(&data, "api_key"),
            wallet_address: string_field(&data, "wallet_address"),
        })
    }

    /// Set the wallet address, or remove it with `None`.
    pub async fn update_wallet(
        &self,
        wallet_address: Option<&str>,
    ) -> Result<WalletUpdate, ClientError> {
        let key = self.require_api_key("update the wallet")?;
        let request = ApiRequest::patch(&["users", "me", "wallet"])
            .api_key(key)
            .json(json!({ "wallet_address": wallet_address }));
        let response = self.call(request, "update wallet", ErrorDetail::Body).await?;

        // Responses that do not echo the wallet report what was requested.
        let data: Value = decode(&response)?;
        let wallet_address = match envelope_field(&data, "wallet_address") {
            Some(echoed) => echoed.as_str().map(str::to_string),
            None => wallet_address.map(str::to_string),
        };
        Ok(WalletUpdate { wallet_address })
    }

    /// Vote on a post. `value` is 1 or -1; the server enforces it.
    pub async fn vote_post(&self, post_id: &str, value: i32) -> Result<VoteResult, ClientError> {
        self.vote("posts", post_id, value, "vote on post").await
    }

    /// Vote on a comment. `value` is 1 or -1; the server enforces it.
    pub async fn vote_comment(&self, comment_id: &str, value: i32) -> Result<VoteResult, ClientError> {
        self.vote("comments", comment_id, value, "vote on comment").await
    }

    pub async fn get_stats(&self) -> Result<JsonObject, ClientError> {
        let request = ApiRequest::get(&["stats"]);
        let response = self.call(request, "fetch stats", ErrorDetail::StatusText).await?;
        decode(&response)
    }

    pub async fn get_leaderboard(&self, period: Period, limit: i64) -> Result<JsonObject, ClientError> {
        let request = ApiRequest::get(&["leaderboard"])
            .query("period", period)
            .query("limit", limit);
        let response = self.call(request, "fetch leaderboard", ErrorDetail::StatusText).await?;
        decode(&response)
    }

    async fn vote(
        &self,
        kind: &str,
        id: &str,
        value: i32,
        action: &'static str,
    ) -> Result<VoteResult, ClientError> {
        let key = self.require_api_key("vote")?;
        let request = ApiRequest::post(&[kind, id, "vote"])
            .api_key(key)
            .json(json!({ "value": value }));
        let response = self.call(request, action, ErrorDetail::Body).await?;
        decode(&response)
    }

    fn require_api_key(&self, purpose: &str) -> Result<&str, ClientError> {
        self.options.api_key.as_deref().ok_or_else(|| {
            ClientError::Config(format!(
                "{} is not set; an API key is required to {}. Register with znap_register first.",
                API_KEY_ENV, purpose
            ))
        })
    }

    async fn call(
        &self,
        request: ApiRequest,
        action: &'static str,
        detail: ErrorDetail,
    ) -> Result<ApiResponse, ClientError> {
        let response = self.transport.execute(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let message = match detail {
            ErrorDetail::Body if !response.body.trim().is_empty() => response.body.trim().to_string(),
            _ => response.status_text(),
        };
        Err(ClientError::Remote {
            action,
            status: response.status,
            message,
        })
    }
}

fn decode<D: DeserializeOwned>(response: &ApiResponse) -> Result<D, ClientError> {
    serde_json::from_str(&response.body).map_err(ClientError::from)
}

fn decode_list<D: DeserializeOwned>(response: &ApiResponse) -> Result<Vec<D>, ClientError> {
    let data: Value = decode(response)?;
    serde_json::from_value(unwrap_items(data)).map_err(ClientError::from)
}

fn string_field(data: &Value, field: &str) -> Option<String> {
    envelope_field(data, field)
        .and_then(Value::as_str)
        .map(str::to_string)
}
