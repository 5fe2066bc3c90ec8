//! MCP tools driving the assistant hover

use rust_mcp_sdk::macros::{JsonSchema, mcp_tool};
use rust_mcp_sdk::schema::{CallToolResult, TextContent, schema_utils::CallToolError};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::context_tools::resolve_file;
use super::utils::serialize_result;
use crate::host::{SessionHost, TextDocument};
use crate::hover::{AssistantHoverProvider, GenerationOutcome, HoverLocation, trigger_generation};

#[mcp_tool(
    name = "hover",
    description = "Show the assistant hover for a position in a C/C++ file. The first hover at a \
                   position offers a link to generate a description; call \
                   generate_hover_description to run it. Hovering the same position again \
                   returns the description once it is ready.

                   Returns JSON with markdown, isTrusted and supportThemeIcons. Line and \
                   character are zero-based."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct HoverMcpTool {
    /// Source or header file. Relative paths are resolved against the
    /// workspace root.
    pub file: String,
    /// Zero-based line
    pub line: u32,
    /// Zero-based character within the line
    pub character: u32,
}

impl HoverMcpTool {
    #[instrument(name = "hover", skip(self, provider, host, root))]
    pub async fn call_tool(
        &self,
        provider: &AssistantHoverProvider,
        host: &SessionHost,
        root: &Path,
    ) -> Result<CallToolResult, CallToolError> {
        let document = TextDocument::from_path(&resolve_file(root, &self.file));
        let location = HoverLocation::new(document.uri.clone(), self.line, self.character);
        host.set_active_document(Some(document));

        let text = match provider.request_hover(location) {
            Some(content) => serialize_result(&content.rendered()),
            None => format!("The assistant hover is disabled for {}.", self.file),
        };
        Ok(CallToolResult::text_content(vec![TextContent::from(text)]))
    }
}

#[mcp_tool(
    name = "generate_hover_description",
    description = "Generate the assistant description for the most recent hover and return it as \
                   markdown. Results for a hover that has since moved are discarded."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct GenerateHoverDescriptionMcpTool {}

impl GenerateHoverDescriptionMcpTool {
    #[instrument(name = "generate_hover_description", skip(self, provider, host))]
    pub async fn call_tool(
        &self,
        provider: &AssistantHoverProvider,
        host: &SessionHost,
    ) -> Result<CallToolResult, CallToolError> {
        let outcome = trigger_generation(provider, host, &CancellationToken::new()).await?;

        let text = match outcome {
            GenerationOutcome::NothingToGenerate => {
                "No hover has been requested yet. Call hover first.".to_string()
            }
            // Re-showing the hover yields the delivered description
            GenerationOutcome::Delivered => provider
                .current_location()
                .and_then(|location| provider.request_hover(location))
                .map(|content| content.markdown())
                .unwrap_or_default(),
            GenerationOutcome::Cancelled => "The description request was cancelled.".to_string(),
            GenerationOutcome::Superseded => {
                "The hover moved before the description arrived.".to_string()
            }
        };
        Ok(CallToolResult::text_content(vec![TextContent::from(text)]))
    }
}
