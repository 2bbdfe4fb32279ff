//! MCP surface over the dispatch pipeline.

use std::sync::Arc;

use perfex_core::resource::{
    CUSTOMER_SEARCH_DESCRIPTION, CUSTOMER_SEARCH_NAME, CUSTOMER_SEARCH_TEMPLATE, JSON_MIME_TYPE,
};
use perfex_core::schema::JsonObject;
use perfex_core::{Dispatcher, ToolOutput};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListResourceTemplatesResult,
    ListToolsResult, PaginatedRequestParam, ReadResourceRequestParam, ReadResourceResult,
    ResourceContents, ResourceTemplate, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData, RoleServer, ServerHandler, ServiceExt};
use serde_json::{json, Value};
use tracing::info;

use crate::{to_error_data, SERVER_NAME};

const INSTRUCTIONS: &str = "Perfex CRM tools: search, read and maintain customers, leads, \
     proposals, estimates, invoices, tasks, contacts, projects, expenses and calendar events. \
     Customer searches are also available as perfex://customers/search/{keysearch} resources.";

#[derive(Clone, Debug)]
pub struct PerfexMcpServer {
    dispatcher: Arc<Dispatcher>,
}

impl PerfexMcpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher: Arc::new(dispatcher) }
    }

    /// Serves MCP over stdin/stdout until the client disconnects.
    pub async fn run_stdio(self) -> anyhow::Result<()> {
        use tokio::io::{stdin, stdout};

        info!(
            event_name = "system.mcp.starting",
            tools = self.dispatcher.catalog().len(),
            "starting MCP server on stdio"
        );
        let service = self.serve((stdin(), stdout())).await?;
        let reason = service.waiting().await?;
        info!(event_name = "system.mcp.stopped", reason = ?reason, "MCP server stopped");
        Ok(())
    }

    /// One MCP tool per catalog entry.
    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher
            .catalog()
            .iter()
            .map(|tool| Tool::new(tool.name, tool.description, Arc::new(tool.input_schema())))
            .collect()
    }

    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, ErrorData> {
        let arguments = arguments.map(Value::Object).unwrap_or(Value::Null);
        let ToolOutput { text, is_error } =
            self.dispatcher.invoke(name, &arguments).await.map_err(to_error_data)?;

        let content = vec![Content::text(text)];
        Ok(if is_error { CallToolResult::error(content) } else { CallToolResult::success(content) })
    }

    pub fn resource_templates(&self) -> Result<Vec<ResourceTemplate>, ErrorData> {
        let template = serde_json::from_value::<ResourceTemplate>(json!({
            "uriTemplate": CUSTOMER_SEARCH_TEMPLATE,
            "name": CUSTOMER_SEARCH_NAME,
            "description": CUSTOMER_SEARCH_DESCRIPTION,
            "mimeType": JSON_MIME_TYPE,
        }))
        .map_err(|error| ErrorData::internal_error(error.to_string(), None))?;
        Ok(vec![template])
    }

    pub async fn read(&self, uri: &str) -> Result<ReadResourceResult, ErrorData> {
        let output = self.dispatcher.read_resource(uri).await.map_err(to_error_data)?;

        let mut contents = ResourceContents::text(output.text, output.uri);
        if let ResourceContents::TextResourceContents { mime_type, .. } = &mut contents {
            *mime_type = Some(output.mime_type.to_string());
        }
        Ok(ReadResourceResult { contents: vec![contents] })
    }
}

impl ServerHandler for PerfexMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().enable_resources().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        self.call(&request.name, request.arguments).await
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult::with_all_items(self.resource_templates()?))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        self.read(&request.uri).await
    }
}
