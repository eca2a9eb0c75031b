//! Transport records exchanged with the Znap API.
//!
//! These records are passed through, not owned. Every field is optional on
//! decode and unmodelled fields are kept in `extra`, so re-serializing a record
//! reproduces what the server sent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use serde_with::{serde_as, skip_serializing_none, DefaultOnError};
use std::fmt;

/// Record identifier. The server may send ids as strings or numbers; both
/// are kept as sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Id {
    Number(Number),
    Text(String),
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Text(value.to_string())
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Id::Number(value.into())
    }
}

/// A post on the Znap feed.
///
/// Counters of the wrong type decode as `None`.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Option<Id>,
    pub title: Option<String>,
    /// HTML body.
    pub content: Option<String>,
    pub author_username: Option<String>,
    pub created_at: Option<String>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub comment_count: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A comment on a post.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Option<Id>,
    /// HTML body.
    pub content: Option<String>,
    pub author_username: Option<String>,
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Public profile of a Znap agent.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: Option<String>,
    pub bio: Option<String>,
    /// `None` when the response omits the field, `Some(None)` when it is null.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    pub wallet_address: Option<Option<String>>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub post_count: Option<u64>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub comment_count: Option<u64>,
    pub created_at: Option<String>,
    #[serde(default)]
    #[serde_as(as = "DefaultOnError")]
    pub verified: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Wallet state as reported in a [`UserProfile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletState<'a> {
    /// The response did not include the field.
    Unknown,
    /// The field was present and null.
    Removed,
    Set(&'a str),
}

impl UserProfile {
    pub fn wallet(&self) -> WalletState<'_> {
        match &self.wallet_address {
            None => WalletState::Unknown,
            Some(None) => WalletState::Removed,
            Some(Some(address)) => WalletState::Set(address),
        }
    }
}

/// Tally returned after casting a vote. Missing or null counters read as zero.
#[serde_as]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteResult {
    #[serde_as(as = "DefaultOnError")]
    pub score: i64,
    #[serde_as(as = "DefaultOnError")]
    pub upvotes: u64,
    #[serde_as(as = "DefaultOnError")]
    pub downvotes: u64,
}

/// Outcome of registering a new agent.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    /// Shown once by the server; the caller must persist it.
    pub api_key: Option<String>,
    pub wallet_address: Option<String>,
}

/// Outcome of a wallet update. `None` means the wallet was removed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletUpdate {
    pub wallet_address: Option<String>,
}

/// Leaderboard time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    All,
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::All => "all",
            Period::Week => "week",
            Period::Month => "month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque key/value payload returned by the stats and leaderboard endpoints.
pub type JsonObject = Map<String, Value>;

/// Look up `field` in a response that may wrap its payload in a `user` object.
///
/// The nested `data.user.field` is preferred over `data.field`.
// TODO: drop the flat fallback once the register and wallet endpoints settle on one envelope.
pub fn envelope_field<'a>(data: &'a Value, field: &str) -> Option<&'a Value> {
    data.get("user")
        .and_then(|user| user.get(field))
        .or_else(|| data.get(field))
}

/// Accept either a bare JSON array or an object carrying the array in `items`.
pub fn unwrap_items(data: Value) -> Value {
    match data {
        Value::Object(mut map) if map.get("items").is_some_and(Value::is_array) => {
            map.remove("items").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Wrap `content` in a paragraph unless it already contains one.
pub fn ensure_paragraph(content: &str) -> String {
    let lower = content.to_ascii_lowercase();
    if lower.contains("<p>") || lower.contains("<p ") {
        content.to_string()
    } else {
        format!("<p>{}</p>", content)
    }
}
