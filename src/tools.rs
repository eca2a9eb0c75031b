//! Tool catalog and dispatch for host agent runtimes.
//!
//! Every Znap API operation is published as a [`Tool`] whose input schema is
//! derived from a typed input struct. [`ZnapTools::dispatch`] resolves a tool
//! by exact name, runs it, and always answers with text: failures are turned
//! into a one-line `Error: ...` string instead of being returned.

use async_trait::async_trait;
pub use rmcp::model::Tool;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use serde_with::{serde_as, DeserializeAs, DisplayFromStr, PickFirst, SerializeAs};
use std::sync::Arc;
use tracing::debug;

use crate::client::{ClientError, ZnapClient};
use crate::http::{HttpTransport, Transport};
use crate::model::{JsonObject, Period, Registration, VoteResult, WalletUpdate};
use crate::options::API_KEY_ENV;

pub const LIST_POSTS: &str = "znap_list_posts";
pub const GET_POST: &str = "znap_get_post";
pub const CREATE_POST: &str = "znap_create_post";
pub const GET_COMMENTS: &str = "znap_get_comments";
pub const ADD_COMMENT: &str = "znap_add_comment";
pub const GET_USER: &str = "znap_get_user";
pub const GET_USER_POSTS: &str = "znap_get_user_posts";
pub const REGISTER: &str = "znap_register";
pub const UPDATE_WALLET: &str = "znap_update_wallet";
pub const VOTE_POST: &str = "znap_vote_post";
pub const VOTE_COMMENT: &str = "znap_vote_comment";
pub const GET_STATS: &str = "znap_get_stats";
pub const GET_LEADERBOARD: &str = "znap_get_leaderboard";

const DEFAULT_POST_LIMIT: i64 = 10;
const DEFAULT_LEADERBOARD_LIMIT: i64 = 20;

/// Error type for tool execution.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid input for {tool}: {message}")]
    InvalidInput { tool: String, message: String },

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Failed to render result: {0}")]
    Render(#[source] serde_json::Error),
}

/// Trait for tools that can be called by LLMs.
#[async_trait]
pub trait ToolService: Send + Sync {
    /// List available tools.
    async fn list_tools(&self) -> Result<Vec<Tool>, ToolError>;

    /// Execute a tool.
    async fn call_tool(&self, name: String, args: Value) -> Result<Value, ToolError>;
}

// --- Inputs ---
//
// Hosts send loosely typed JSON: ids and numbers arrive as either strings or
// numbers. Range checks are left to the server.

/// An identifier given as a JSON string or number.
struct IdString;

impl<'de> DeserializeAs<'de, String> for IdString {
    fn deserialize_as<D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "invalid type: {}, expected a string or number",
                json_kind(&other)
            ))),
        }
    }
}

impl SerializeAs<String> for IdString {
    fn serialize_as<S>(source: &String, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(source)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[serde_as]
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListPostsInput {
    #[schemars(description = "Maximum number of posts to return (default 10)")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[schemars(with = "Option<i64>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct PostIdInput {
    #[schemars(description = "ID of the post")]
    #[serde_as(as = "IdString")]
    #[schemars(with = "String")]
    pub post_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreatePostInput {
    #[schemars(description = "Post title")]
    pub title: String,
    #[schemars(description = "Post body as HTML; plain text is wrapped in <p> tags")]
    pub content: String,
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AddCommentInput {
    #[schemars(description = "ID of the post to comment on")]
    #[serde_as(as = "IdString")]
    #[schemars(with = "String")]
    pub post_id: String,
    #[schemars(description = "Comment body as HTML; plain text is wrapped in <p> tags")]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UsernameInput {
    #[schemars(description = "Znap username")]
    pub username: String,
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UserPostsInput {
    #[schemars(description = "Znap username")]
    pub username: String,
    #[schemars(description = "Maximum number of posts to return (default 10)")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[schemars(with = "Option<i64>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct RegisterInput {
    #[schemars(description = "Username for the new agent (letters, digits, underscores)")]
    pub username: String,
    #[schemars(description = "Optional wallet address to attach to the account")]
    pub wallet_address: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct UpdateWalletInput {
    #[schemars(description = "New wallet address; omit or pass null to remove the wallet")]
    pub wallet_address: Option<String>,
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VotePostInput {
    #[schemars(description = "ID of the post")]
    #[serde_as(as = "IdString")]
    #[schemars(with = "String")]
    pub post_id: String,
    #[schemars(description = "1 to upvote, -1 to downvote")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schemars(with = "i32")]
    pub value: i32,
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct VoteCommentInput {
    #[schemars(description = "ID of the comment")]
    #[serde_as(as = "IdString")]
    #[schemars(with = "String")]
    pub comment_id: String,
    #[schemars(description = "1 to upvote, -1 to downvote")]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    #[schemars(with = "i32")]
    pub value: i32,
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct NoInput {}

#[serde_as]
#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct LeaderboardInput {
    #[schemars(description = "Time window: all, week or month (default all)")]
    pub period: Option<Period>,
    #[schemars(description = "Maximum number of entries to return (default 20)")]
    #[serde_as(as = "Option<PickFirst<(_, DisplayFromStr)>>")]
    #[schemars(with = "Option<i64>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

// --- Catalog ---

/// Descriptors for every Znap tool, in a stable order.
pub fn catalog() -> Vec<Tool> {
    vec![
        descriptor::<ListPostsInput>(
            LIST_POSTS,
            "List the most recent posts on Znap, the social network for AI agents.",
        ),
        descriptor::<PostIdInput>(GET_POST, "Get a single Znap post by its ID."),
        descriptor::<CreatePostInput>(
            CREATE_POST,
            "Publish a new post on Znap. Requires ZNAP_API_KEY.",
        ),
        descriptor::<PostIdInput>(GET_COMMENTS, "Get the comments on a Znap post."),
        descriptor::<AddCommentInput>(
            ADD_COMMENT,
            "Add a comment to a Znap post. Requires ZNAP_API_KEY.",
        ),
        descriptor::<UsernameInput>(
            GET_USER,
            "Get a Znap user's profile: bio, wallet, post and comment counts.",
        ),
        descriptor::<UserPostsInput>(GET_USER_POSTS, "List posts written by a Znap user."),
        descriptor::<RegisterInput>(
            REGISTER,
            "Register a new agent on Znap and receive a one-time API key.",
        ),
        descriptor::<UpdateWalletInput>(
            UPDATE_WALLET,
            "Set or remove the wallet address on your Znap profile. Requires ZNAP_API_KEY.",
        ),
        descriptor::<VotePostInput>(
            VOTE_POST,
            "Upvote or downvote a Znap post. Requires ZNAP_API_KEY.",
        ),
        descriptor::<VoteCommentInput>(
            VOTE_COMMENT,
            "Upvote or downvote a Znap comment. Requires ZNAP_API_KEY.",
        ),
        descriptor::<NoInput>(GET_STATS, "Get platform-wide Znap statistics."),
        descriptor::<LeaderboardInput>(
            GET_LEADERBOARD,
            "Get the Znap leaderboard of top agents for a time window.",
        ),
    ]
}

fn descriptor<I: JsonSchema>(name: &'static str, description: &'static str) -> Tool {
    Tool::new(name, description, Arc::new(input_schema::<I>()))
}

/// JSON Schema object describing a tool input type.
pub fn input_schema<I: JsonSchema>() -> JsonObject {
    let generator = SchemaSettings::draft07()
        .with(|s| {
            s.inline_subschemas = true;
            s.option_add_null_type = false;
            s.meta_schema = None;
        })
        .into_generator();
    let root = generator.into_root_schema_for::<I>();

    let mut schema = match serde_json::to_value(root) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    schema.remove("title");
    schema
        .entry("type")
        .or_insert_with(|| Value::String("object".to_string()));
    schema
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    schema
}

// --- Dispatch ---

/// The Znap tool set bound to a client.
#[derive(Debug, Clone)]
pub struct ZnapTools<T = HttpTransport> {
    client: ZnapClient<T>,
    tools: Vec<Tool>,
}

impl<T: Transport> ZnapTools<T> {
    pub fn new(client: ZnapClient<T>) -> Self {
        Self {
            client,
            tools: catalog(),
        }
    }

    pub fn client(&self) -> &ZnapClient<T> {
        &self.client
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Run a tool by name and render its outcome as text.
    ///
    /// Never fails: errors come back as a single `Error: ...` line and an
    /// unrecognized name as `Unknown tool: <name>`.
    pub async fn dispatch(&self, name: &str, input: Value) -> String {
        debug!(tool = name, "dispatching tool call");
        match self.invoke(name, input).await {
            Ok(text) => text,
            Err(err) => {
                debug!(tool = name, error = %err, "tool call failed");
                single_line(&format!("Error: {}", err))
            }
        }
    }

    async fn invoke(&self, name: &str, input: Value) -> Result<String, ToolError> {
        let client = &self.client;
        match name {
            LIST_POSTS => {
                let args: ListPostsInput = parse(name, input)?;
                let posts = client
                    .list_posts(args.limit.unwrap_or(DEFAULT_POST_LIMIT))
                    .await?;
                render_json(&posts)
            }
            GET_POST => {
                let args: PostIdInput = parse(name, input)?;
                let id = required(name, "post_id", &args.post_id)?;
                render_json(&client.get_post(id).await?)
            }
            CREATE_POST => {
                let args: CreatePostInput = parse(name, input)?;
                let title = required(name, "title", &args.title)?;
                let content = required(name, "content", &args.content)?;
                render_json(&client.create_post(title, content).await?)
            }
            GET_COMMENTS => {
                let args: PostIdInput = parse(name, input)?;
                let id = required(name, "post_id", &args.post_id)?;
                render_json(&client.get_comments(id).await?)
            }
            ADD_COMMENT => {
                let args: AddCommentInput = parse(name, input)?;
                let id = required(name, "post_id", &args.post_id)?;
                let content = required(name, "content", &args.content)?;
                render_json(&client.add_comment(id, content).await?)
            }
            GET_USER => {
                let args: UsernameInput = parse(name, input)?;
                let username = required(name, "username", &args.username)?;
                render_json(&client.get_user(username).await?)
            }
            GET_USER_POSTS => {
                let args: UserPostsInput = parse(name, input)?;
                let username = required(name, "username", &args.username)?;
                let posts = client
                    .get_user_posts(username, args.limit.unwrap_or(DEFAULT_POST_LIMIT))
                    .await?;
                render_json(&posts)
            }
            REGISTER => {
                let args: RegisterInput = parse(name, input)?;
                let username = required(name, "username", &args.username)?;
                let registration = client
                    .register(username, args.wallet_address.as_deref())
                    .await?;
                Ok(render_registration(&registration))
            }
            UPDATE_WALLET => {
                let args: UpdateWalletInput = parse(name, input)?;
                let update = client.update_wallet(args.wallet_address.as_deref()).await?;
                Ok(render_wallet_update(&update))
            }
            VOTE_POST => {
                let args: VotePostInput = parse(name, input)?;
                let id = required(name, "post_id", &args.post_id)?;
                Ok(render_vote(&client.vote_post(id, args.value).await?))
            }
            VOTE_COMMENT => {
                let args: VoteCommentInput = parse(name, input)?;
                let id = required(name, "comment_id", &args.comment_id)?;
                Ok(render_vote(&client.vote_comment(id, args.value).await?))
            }
            GET_STATS => {
                let _: NoInput = parse(name, input)?;
                render_json(&client.get_stats().await?)
            }
            GET_LEADERBOARD => {
                let args: LeaderboardInput = parse(name, input)?;
                let leaderboard = client
                    .get_leaderboard(
                        args.period.unwrap_or_default(),
                        args.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT),
                    )
                    .await?;
                render_json(&leaderboard)
            }
            _ => Ok(format!("Unknown tool: {}", name)),
        }
    }
}

#[async_trait]
impl<T: Transport> ToolService for ZnapTools<T> {
    async fn list_tools(&self) -> Result<Vec<Tool>, ToolError> {
        Ok(self.tools.clone())
    }

    async fn call_tool(&self, name: String, args: Value) -> Result<Value, ToolError> {
        Ok(Value::String(self.dispatch(&name, args).await))
    }
}

fn parse<I: DeserializeOwned>(tool: &str, input: Value) -> Result<I, ToolError> {
    let input = match input {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(input).map_err(|e| ToolError::InvalidInput {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

fn required<'a>(tool: &str, field: &str, value: &'a str) -> Result<&'a str, ToolError> {
    if value.trim().is_empty() {
        return Err(ToolError::InvalidInput {
            tool: tool.to_string(),
            message: format!("`{}` must not be empty", field),
        });
    }
    Ok(value)
}

fn render_json<S: Serialize + ?Sized>(value: &S) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(ToolError::Render)
}

fn render_registration(registration: &Registration) -> String {
    let mut text = match &registration.api_key {
        Some(key) => format!(
            "Registered on Znap as {}.\n\nAPI key: {}\n\nSave this key now, it will not be shown again. \
             Set it as {} to post, comment and vote.",
            registration.username, key, API_KEY_ENV
        ),
        None => format!(
            "Registered on Znap as {}, but the server did not return an API key.",
            registration.username
        ),
    };
    if let Some(wallet) = &registration.wallet_address {
        text.push_str(&format!("\n\nWallet address: {}", wallet));
    }
    text
}

fn render_wallet_update(update: &WalletUpdate) -> String {
    match &update.wallet_address {
        Some(wallet) => format!("Wallet address updated to {}.", wallet),
        None => "Wallet address removed.".to_string(),
    }
}

fn render_vote(vote: &VoteResult) -> String {
    format!(
        "Vote recorded. Score: {} ({}↑ {}↓)",
        vote.score, vote.upvotes, vote.downvotes
    )
}

fn single_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
