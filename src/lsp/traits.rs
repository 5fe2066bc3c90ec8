//! Language server capability used by the hover coordinator and context tools
//!
//! Callers depend on this trait rather than on [`CppToolsClient`] so they can
//! be driven by [`MockLanguageClient`] in tests.
//!
//! [`CppToolsClient`]: crate::lsp::CppToolsClient
//! [`MockLanguageClient`]: crate::lsp::testing::MockLanguageClient

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::context::{ChatContextResult, ProjectContextResult};
use crate::lsp::error::LspError;
use crate::lsp::requests::{GetCopilotHoverInfoParams, GetCopilotHoverInfoResult};

#[async_trait]
pub trait LanguageClient: Send + Sync {
    /// `cpptools/getCopilotHoverInfo`
    async fn copilot_hover_info(
        &self,
        params: GetCopilotHoverInfoParams,
        cancel: &CancellationToken,
    ) -> Result<GetCopilotHoverInfoResult, LspError>;

    /// `cpptools/getChatContext`; `None` when the server has no configuration
    /// for the document
    async fn chat_context(
        &self,
        uri: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ChatContextResult>, LspError>;

    /// `cpptools/getProjectContext`
    async fn project_context(
        &self,
        uri: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ProjectContextResult>, LspError>;
}
