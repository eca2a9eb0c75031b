//! MCP server exposing a [`ToolService`] over rmcp.

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{ErrorData as McpError, ServerHandler};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::info;

use crate::plugin::{PLUGIN_DESCRIPTION, PLUGIN_NAME};
use crate::tools::ToolService;

/// MCP handler answering `tools/list` and `tools/call` from a [`ToolService`].
///
/// Tool results are always text. Failures inside a tool are already rendered
/// as text by the service, so `call_tool` only errors when the service itself does.
pub struct ZnapServer<S> {
    service: Arc<S>,
}

impl<S> Clone for ZnapServer<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<S: ToolService> ZnapServer<S> {
    pub fn new(service: S) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }
}

impl<S: ToolService + 'static> ServerHandler for ZnapServer<S> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: PLUGIN_NAME.into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(PLUGIN_DESCRIPTION.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self
            .service
            .list_tools()
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(ListToolsResult::with_all_items(tools))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let name = request.name.to_string();
        info!(tool = %name, "tools/call");

        let args = Value::Object(request.arguments.unwrap_or_else(Map::new));
        let output = self
            .service
            .call_tool(name, args)
            .await
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let text = match output {
            Value::String(text) => text,
            other => other.to_string(),
        };
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}
