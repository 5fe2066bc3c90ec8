use async_trait::async_trait;
use rust_mcp_sdk::schema::{
    CallToolRequest, CallToolResult, ListToolsRequest, ListToolsResult, RpcError,
    schema_utils::CallToolError,
};
use rust_mcp_sdk::{McpServer, mcp_server::ServerHandler};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Level, info};

use super::context_tools::{CppConfigurationMcpTool, CppProjectContextMcpTool};
use super::hover_tools::{GenerateHoverDescriptionMcpTool, HoverMcpTool};
use super::utils::McpToolHandler;
use crate::config::BridgeConfig;
use crate::context::{CompilerArgumentFilters, CppConfigurationTool, ProjectContextProvider};
use crate::host::SessionHost;
use crate::hover::AssistantHoverProvider;
use crate::logging::OutputChannel;
use crate::lsp::LanguageClient;
use crate::register_tools;
use crate::telemetry::TelemetrySink;
use crate::{log_mcp_message, log_timing};

pub struct BridgeServerHandler {
    configuration_tool: CppConfigurationTool,
    project_context: ProjectContextProvider,
    hover: AssistantHoverProvider,
    host: SessionHost,
    config: BridgeConfig,
    root: PathBuf,
}

impl BridgeServerHandler {
    pub fn new(
        client: Arc<dyn LanguageClient>,
        config: BridgeConfig,
        root: PathBuf,
        telemetry: Arc<dyn TelemetrySink>,
        output: Arc<dyn OutputChannel>,
    ) -> Self {
        let configuration_tool = CppConfigurationTool::new(
            Arc::clone(&client),
            config.known_values.clone(),
            Arc::clone(&telemetry),
            Arc::clone(&output),
        );
        let hover = AssistantHoverProvider::new(Arc::clone(&client), config.hover.clone());
        let project_context = ProjectContextProvider::new(
            client,
            config.known_values.clone(),
            CompilerArgumentFilters::from_patterns(&config.default_compiler_argument_filters),
            telemetry,
            output,
        );
        Self {
            configuration_tool,
            project_context,
            hover,
            host: SessionHost::new(),
            config,
            root,
        }
    }
}

impl McpToolHandler<CppConfigurationMcpTool> for BridgeServerHandler {
    const TOOL_NAME: &'static str = "cpp_configuration";

    async fn call_tool(
        &self,
        tool: CppConfigurationMcpTool,
    ) -> Result<CallToolResult, CallToolError> {
        tool.call_tool(&self.configuration_tool, &self.host, &self.root)
            .await
    }
}

impl McpToolHandler<CppProjectContextMcpTool> for BridgeServerHandler {
    const TOOL_NAME: &'static str = "cpp_project_context";

    async fn call_tool(
        &self,
        tool: CppProjectContextMcpTool,
    ) -> Result<CallToolResult, CallToolError> {
        tool.call_tool(&self.project_context, &self.config.flags, &self.root)
            .await
    }
}

impl McpToolHandler<HoverMcpTool> for BridgeServerHandler {
    const TOOL_NAME: &'static str = "hover";

    async fn call_tool(&self, tool: HoverMcpTool) -> Result<CallToolResult, CallToolError> {
        tool.call_tool(&self.hover, &self.host, &self.root).await
    }
}

impl McpToolHandler<GenerateHoverDescriptionMcpTool> for BridgeServerHandler {
    const TOOL_NAME: &'static str = "generate_hover_description";

    async fn call_tool(
        &self,
        tool: GenerateHoverDescriptionMcpTool,
    ) -> Result<CallToolResult, CallToolError> {
        tool.call_tool(&self.hover, &self.host).await
    }
}

register_tools! {
    BridgeServerHandler {
        CppConfigurationMcpTool,
        CppProjectContextMcpTool,
        HoverMcpTool,
        GenerateHoverDescriptionMcpTool,
    }
}

#[async_trait]
impl ServerHandler for BridgeServerHandler {
    async fn handle_list_tools_request(
        &self,
        request: ListToolsRequest,
        _runtime: &dyn McpServer,
    ) -> std::result::Result<ListToolsResult, RpcError> {
        let start = Instant::now();

        log_mcp_message!(Level::INFO, "incoming", "list_tools", &request);

        let result = ListToolsResult {
            meta: None,
            next_cursor: None,
            tools: Self::registered_tools(),
        };

        log_mcp_message!(Level::INFO, "outgoing", "list_tools", &result);
        log_timing!(Level::DEBUG, "list_tools", start.elapsed());

        Ok(result)
    }

    async fn handle_call_tool_request(
        &self,
        request: CallToolRequest,
        _runtime: &dyn McpServer,
    ) -> std::result::Result<CallToolResult, CallToolError> {
        let start = Instant::now();
        let tool_name = request.params.name.clone();

        log_mcp_message!(Level::INFO, "incoming", "call_tool", &request);
        info!("Executing tool: {}", tool_name);

        let result = self
            .dispatch_tool(&tool_name, request.params.arguments)
            .await?;

        log_mcp_message!(Level::INFO, "outgoing", "call_tool", &result);
        log_timing!(
            Level::DEBUG,
            &format!("call_tool_{tool_name}"),
            start.elapsed()
        );

        Ok(result)
    }
}
