//! MCP server over stdin/stdout.
//!
//! The protocol layer is `rmcp`; this module plugs the calendar tools into
//! its [`ServerHandler`]. Stdout is reserved for protocol frames; all
//! diagnostics go to stderr through `tracing`.

use crate::commands::{dispatch, get_all_tools, ToolOutput};
use crate::components::OutlookCalendarHandle;
use crate::error::{CalendarResult, Error};
use rmcp::model::{
    CallToolRequestParams, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParams, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::{serve_server, ErrorData as McpError, RoleServer, ServerHandler};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Name reported to clients in `serverInfo`
pub const SERVER_NAME: &str = "mcp-server-outlook";

const SERVER_INSTRUCTIONS: &str = "Outlook calendar tools. Dates are ISO 8601 \
     (YYYY-MM-DDTHH:mm:ss) in the mailbox's local time.";

/// Serves calendar tools to one MCP client
#[derive(Clone)]
pub struct McpServer {
    handle: OutlookCalendarHandle,
    shutdown: CancellationToken,
}

impl McpServer {
    pub fn new(handle: OutlookCalendarHandle, shutdown: CancellationToken) -> Self {
        Self { handle, shutdown }
    }

    /// Serve on the process's stdin and stdout
    pub async fn run_stdio(self) -> CalendarResult<()> {
        let (stdin, stdout) = stdio();
        self.serve(stdin, stdout).await
    }

    /// Serve until the client disconnects or shutdown is requested.
    ///
    /// Stopping the session cancels every in-flight tool call, which kills
    /// the script processes they started.
    pub async fn serve<R, W>(self, reader: R, writer: W) -> CalendarResult<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let shutdown = self.shutdown.clone();

        let running = tokio::select! {
            running = serve_server(self, (reader, writer)) => running
                .map_err(|e| Error::Mcp(format!("MCP handshake failed: {}", e)))?,
            _ = shutdown.cancelled() => {
                info!("Shutdown requested before a client connected");
                return Ok(());
            }
        };
        info!("MCP client connected");

        // Dropping the running service on shutdown cancels the session
        tokio::select! {
            quit = running.waiting() => {
                let reason = quit
                    .map_err(|e| Error::Mcp(format!("MCP session task failed: {}", e)))?;
                info!(reason = ?reason, "MCP session ended");
            }
            _ = shutdown.cancelled() => info!("Shutdown requested; stopping MCP server"),
        }

        Ok(())
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = SERVER_NAME.to_string();
        server_info.version = env!("CARGO_PKG_VERSION").to_string();

        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::default())
            .with_server_info(server_info)
            .with_instructions(SERVER_INSTRUCTIONS.to_string())
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(get_all_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        info!(tool = %request.name, request_id = ?context.id, "tool call started");
        let arguments = request.arguments.map(Value::Object);

        let output = tokio::select! {
            output = dispatch(&self.handle, &request.name, arguments) => output,
            _ = context.ct.cancelled() => {
                info!(tool = %request.name, request_id = ?context.id, "tool call cancelled");
                return Err(McpError::internal_error("request cancelled", None));
            }
            _ = self.shutdown.cancelled() => {
                return Err(McpError::internal_error("server is shutting down", None));
            }
        };

        debug!(tool = %request.name, is_error = output.is_error, "tool call finished");
        Ok(tool_result(output))
    }
}

/// Render a dispatch outcome as a single text block
fn tool_result(output: ToolOutput) -> CallToolResult {
    let content = vec![Content::text(output.text)];
    if output.is_error {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::RawContent;

    fn text_of(result: &CallToolResult) -> &str {
        match &*result.content[0] {
            RawContent::Text(text) => &text.text,
            other => panic!("unexpected content: {:?}", other),
        }
    }

    #[test]
    fn test_tool_result_flags_only_errors() {
        let ok = tool_result(ToolOutput {
            text: "[]".to_string(),
            is_error: false,
        });
        assert_ne!(ok.is_error, Some(true));
        assert_eq!(text_of(&ok), "[]");

        let failed = tool_result(ToolOutput {
            text: "Error: timed out".to_string(),
            is_error: true,
        });
        assert_eq!(failed.is_error, Some(true));
        assert_eq!(text_of(&failed), "Error: timed out");
    }
}
