//! Znap MCP server over stdio.

use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;
use znap::{ZnapPlugin, ZnapServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("znap=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let plugin = ZnapPlugin::from_env()?;
    if plugin.tool_service().client().options().has_api_key() {
        tracing::info!("znap-mcp starting (stdio transport)");
    } else {
        tracing::warn!("ZNAP_API_KEY not set; write tools will report a configuration error");
    }

    let server = ZnapServer::new(plugin.into_tool_service());
    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
