//! Client for the C/C++ language server process
//!
//! Spawns the server, wires its stdio into a [`JsonRpcClient`], and runs the
//! `initialize`/`shutdown` lifecycle around the custom `cpptools/*` requests.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::context::{ChatContextResult, ProjectContextResult};
use crate::lsp::error::LspError;
use crate::lsp::protocol::JsonRpcClient;
use crate::lsp::requests::{
    DocumentUriParams, GetChatContextRequest, GetCopilotHoverInfoParams,
    GetCopilotHoverInfoRequest, GetCopilotHoverInfoResult, GetProjectContextRequest,
};
use crate::lsp::traits::LanguageClient;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection to a spawned language server
pub struct CppToolsClient {
    rpc: JsonRpcClient,
    process: Child,
    stderr_task: Option<JoinHandle<()>>,
    request_timeout: Duration,
    initialized: bool,
}

impl CppToolsClient {
    /// Spawn `server_path` with `args`, talking LSP over its stdio
    pub fn spawn(
        server_path: &str,
        args: &[String],
        working_dir: Option<&Path>,
        request_timeout: Duration,
    ) -> Result<Self, LspError> {
        info!("Starting language server: {} {:?}", server_path, args);

        let mut command = Command::new(server_path);
        command
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let mut process = command.spawn().map_err(|e| {
            LspError::Process(format!("Failed to start {server_path}: {e}"))
        })?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| LspError::Process("Failed to get stdin".to_string()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| LspError::Process("Failed to get stdout".to_string()))?;
        let stderr = process
            .stderr
            .take()
            .ok_or_else(|| LspError::Process("Failed to get stderr".to_string()))?;

        // Always drain stderr so the server never blocks on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => trace!(target: "language_server", "{}", line),
                    Ok(None) => break,
                    Err(e) => {
                        warn!("Error reading language server stderr: {}", e);
                        break;
                    }
                }
            }
            debug!("Language server stderr closed");
        });

        Ok(Self {
            rpc: JsonRpcClient::new(stdout, stdin),
            process,
            stderr_task: Some(stderr_task),
            request_timeout,
            initialized: false,
        })
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the `initialize` handshake rooted at `root`
    pub async fn initialize(
        &mut self,
        root: Option<&Path>,
    ) -> Result<lsp_types::InitializeResult, LspError> {
        let workspace_folders = root.and_then(|root| {
            let uri = lsp_types::Uri::from_str(&format!("file://{}", root.display())).ok()?;
            let name = root
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "workspace".to_string());
            Some(vec![lsp_types::WorkspaceFolder { uri, name }])
        });

        let params = lsp_types::InitializeParams {
            process_id: Some(std::process::id()),
            capabilities: lsp_types::ClientCapabilities::default(),
            workspace_folders,
            client_info: Some(lsp_types::ClientInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
            ..Default::default()
        };

        let result = self
            .rpc
            .request::<lsp_types::request::Initialize>(
                params,
                self.request_timeout,
                &CancellationToken::new(),
            )
            .await?;
        self.rpc
            .notify::<lsp_types::notification::Initialized>(lsp_types::InitializedParams {})?;
        self.initialized = true;

        info!(
            "Language server initialized: {}",
            result
                .server_info
                .as_ref()
                .map(|info| info.name.as_str())
                .unwrap_or("unknown")
        );
        Ok(result)
    }

    /// Send `shutdown`/`exit` and reap the process
    pub async fn shutdown(&mut self) -> Result<(), LspError> {
        info!("Shutting down language server");

        if self.initialized && self.rpc.is_connected() {
            match self
                .rpc
                .request::<lsp_types::request::Shutdown>((), SHUTDOWN_TIMEOUT, &CancellationToken::new())
                .await
            {
                Ok(()) => self.rpc.notify::<lsp_types::notification::Exit>(())?,
                Err(e) => warn!("LSP shutdown request failed: {}", e),
            }
        }
        self.initialized = false;

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.process.wait()).await {
            Ok(Ok(status)) => debug!("Language server exited with {}", status),
            Ok(Err(e)) => warn!("Error waiting for language server: {}", e),
            Err(_) => {
                warn!("Language server did not exit in time, killing it");
                self.process.kill().await?;
            }
        }

        if let Some(stderr_task) = self.stderr_task.take() {
            stderr_task.abort();
        }
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<(), LspError> {
        if self.initialized {
            Ok(())
        } else {
            Err(LspError::NotInitialized)
        }
    }
}

impl Drop for CppToolsClient {
    fn drop(&mut self) {
        if let Some(stderr_task) = self.stderr_task.take() {
            stderr_task.abort();
        }
    }
}

#[async_trait]
impl LanguageClient for CppToolsClient {
    async fn copilot_hover_info(
        &self,
        params: GetCopilotHoverInfoParams,
        cancel: &CancellationToken,
    ) -> Result<GetCopilotHoverInfoResult, LspError> {
        self.ensure_initialized()?;
        self.rpc
            .request::<GetCopilotHoverInfoRequest>(params, self.request_timeout, cancel)
            .await
    }

    async fn chat_context(
        &self,
        uri: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ChatContextResult>, LspError> {
        self.ensure_initialized()?;
        let params = DocumentUriParams { uri: uri.to_string() };
        self.rpc
            .request::<GetChatContextRequest>(params, self.request_timeout, cancel)
            .await
    }

    async fn project_context(
        &self,
        uri: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<ProjectContextResult>, LspError> {
        self.ensure_initialized()?;
        let params = DocumentUriParams { uri: uri.to_string() };
        self.rpc
            .request::<GetProjectContextRequest>(params, self.request_timeout, cancel)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_spawn_missing_binary_is_process_error() {
        let result = CppToolsClient::spawn(
            "/nonexistent/cpptools-server",
            &[],
            None,
            Duration::from_secs(1),
        );
        assert!(matches!(result, Err(LspError::Process(_))));
    }

    #[tokio::test]
    async fn test_requests_before_initialize_are_rejected() {
        // The test binary itself always exists; it lists its tests and exits
        let test_binary = std::env::current_exe().unwrap();
        let client = CppToolsClient::spawn(
            &test_binary.to_string_lossy(),
            &["--list".to_string()],
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(!client.is_initialized());

        let result = client
            .chat_context("file:///a.cpp", &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(LspError::NotInitialized)));
    }
}
