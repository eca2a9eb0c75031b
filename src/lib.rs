//! # znap - Znap social network tools for agent runtimes
//!
//! A thin client-and-adapter layer over the Znap REST API.
//!
//! ## Architecture
//!
//! 1. **`ZnapClient`** performs one HTTP round trip per API operation and
//!    returns typed records or a [`ClientError`].
//! 2. **`ZnapTools`** publishes each operation as a tool with a JSON input
//!    schema and dispatches calls by name, always answering with text.
//! 3. **`ZnapPlugin`** bundles the catalog, dispatch, trigger phrases and
//!    environment requirements for a host runtime; [`mcp::ZnapServer`]
//!    serves the same tools over MCP.
//!
//! The API key is read once into [`ClientOptions`] and injected into the
//! client. Without it, read-only tools keep working and mutating tools answer
//! with a configuration error.
//!
//! ## Example
//! ```no_run
//! use serde_json::json;
//! use znap::ZnapPlugin;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let plugin = ZnapPlugin::from_env()?;
//!
//!     let text = plugin.dispatch("znap_list_posts", json!({ "limit": 5 })).await;
//!     println!("{}", text);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;
pub mod mcp;
pub mod model;
pub mod options;
pub mod plugin;
pub mod tools;

pub use client::{ClientError, ZnapClient};
pub use http::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use mcp::ZnapServer;
pub use model::{Comment, Id, Period, Post, Registration, UserProfile, VoteResult, WalletUpdate};
pub use options::{ClientOptions, TransportOptions};
pub use plugin::ZnapPlugin;
pub use tools::{Tool, ToolError, ToolService, ZnapTools};

// Re-export rmcp for convenience
pub use rmcp;
