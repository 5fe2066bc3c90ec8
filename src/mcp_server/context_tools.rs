//! MCP tools exposing the C/C++ context of a file

use rust_mcp_sdk::macros::{JsonSchema, mcp_tool};
use rust_mcp_sdk::schema::{CallToolResult, TextContent, schema_utils::CallToolError};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::utils::serialize_result;
use crate::config::ExperimentFlags;
use crate::context::{CppConfigurationTool, ProjectContextProvider};
use crate::host::{SessionHost, TextDocument};

/// Resolve a tool `file` argument against the workspace root
pub(super) fn resolve_file(root: &Path, file: &str) -> PathBuf {
    let path = Path::new(file);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[mcp_tool(
    name = "cpp_configuration",
    description = "Describe how a C, C++, or CUDA source file is compiled: language, language \
                   standard version, compiler, target platform and target architecture, as \
                   reported by the language server's active configuration.

                   Returns one short English paragraph suitable for inclusion in a prompt. \
                   Values the bridge does not recognize are omitted rather than guessed."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct CppConfigurationMcpTool {
    /// Source or header file to describe. Relative paths are resolved
    /// against the workspace root. Defaults to the most recently hovered file.
    pub file: Option<String>,
}

impl CppConfigurationMcpTool {
    #[instrument(name = "cpp_configuration", skip(self, tool, host, root))]
    pub async fn call_tool(
        &self,
        tool: &CppConfigurationTool,
        host: &SessionHost,
        root: &Path,
    ) -> Result<CallToolResult, CallToolError> {
        let cancel = CancellationToken::new();
        let text = match &self.file {
            Some(file) => {
                let document = TextDocument::from_path(&resolve_file(root, file));
                tool.get_context(Some(&document), &cancel).await
            }
            None => tool.invoke(host, &cancel).await,
        };
        Ok(CallToolResult::text_content(vec![TextContent::from(text)]))
    }
}

#[mcp_tool(
    name = "cpp_project_context",
    description = "Get the normalized project context of a C/C++ file as JSON: language, \
                   standardVersion, compiler, targetPlatform, targetArchitecture and \
                   compilerArguments.

                   compilerArguments only lists arguments admitted by the configured \
                   per-compiler allow-list and is empty when no filter is configured."
)]
#[derive(Debug, ::serde::Deserialize, ::serde::Serialize, JsonSchema)]
pub struct CppProjectContextMcpTool {
    /// Source or header file to inspect. Relative paths are resolved
    /// against the workspace root.
    pub file: String,
}

impl CppProjectContextMcpTool {
    #[instrument(name = "cpp_project_context", skip(self, provider, flags, root))]
    pub async fn call_tool(
        &self,
        provider: &ProjectContextProvider,
        flags: &ExperimentFlags,
        root: &Path,
    ) -> Result<CallToolResult, CallToolError> {
        let document = TextDocument::from_path(&resolve_file(root, &self.file));
        let text = match provider
            .get_project_context(&document.uri, flags, &CancellationToken::new())
            .await
        {
            Some(context) => serialize_result(&context),
            None => format!("No project context is available for {}.", self.file),
        };
        Ok(CallToolResult::text_content(vec![TextContent::from(text)]))
    }
}
