//! Testing utilities and mock implementations
//!
//! [`MockLanguageClient`] answers the `cpptools/*` requests from canned
//! results and records every call, so the hover coordinator and context
//! tools can be tested without a language server process.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::context::{ChatContextResult, ProjectContextResult};
use crate::lsp::error::LspError;
use crate::lsp::requests::{GetCopilotHoverInfoParams, GetCopilotHoverInfoResult};
use crate::lsp::traits::LanguageClient;

/// Canned outcome for one kind of request
pub type MockReply<T> = Box<dyn Fn() -> Result<T, LspError> + Send + Sync>;

/// Mock language client for testing
pub struct MockLanguageClient {
    hover_reply: MockReply<GetCopilotHoverInfoResult>,
    chat_reply: MockReply<Option<ChatContextResult>>,
    project_reply: MockReply<Option<ProjectContextResult>>,
    /// When set, hover requests wait for this before answering
    hover_gate: Option<Arc<Notify>>,
    hover_calls: Mutex<Vec<GetCopilotHoverInfoParams>>,
    context_calls: Mutex<Vec<String>>,
}

impl MockLanguageClient {
    /// A client whose server knows nothing: empty hover text, no contexts
    pub fn new() -> Self {
        Self {
            hover_reply: Box::new(|| Ok(GetCopilotHoverInfoResult::default())),
            chat_reply: Box::new(|| Ok(None)),
            project_reply: Box::new(|| Ok(None)),
            hover_gate: None,
            hover_calls: Mutex::new(Vec::new()),
            context_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_hover_content(mut self, content: &str) -> Self {
        let content = content.to_string();
        self.hover_reply = Box::new(move || {
            Ok(GetCopilotHoverInfoResult {
                content: content.clone(),
            })
        });
        self
    }

    pub fn with_hover_error(mut self, make_error: impl Fn() -> LspError + Send + Sync + 'static) -> Self {
        self.hover_reply = Box::new(move || Err(make_error()));
        self
    }

    /// Hold every hover request until `gate` is notified
    pub fn with_hover_gate(mut self, gate: Arc<Notify>) -> Self {
        self.hover_gate = Some(gate);
        self
    }

    pub fn with_chat_context(mut self, context: Option<ChatContextResult>) -> Self {
        self.chat_reply = Box::new(move || Ok(context.clone()));
        self
    }

    pub fn with_chat_error(mut self, make_error: impl Fn() -> LspError + Send + Sync + 'static) -> Self {
        self.chat_reply = Box::new(move || Err(make_error()));
        self
    }

    pub fn with_project_context(mut self, context: Option<ProjectContextResult>) -> Self {
        self.project_reply = Box::new(move || Ok(context.clone()));
        self
    }

    pub fn with_project_error(mut self, make_error: impl Fn() -> LspError + Send + Sync + 'static) -> Self {
        self.project_reply = Box::new(move || Err(make_error()));
        self
    }

    /// Parameters of every hover request, in order
    pub fn hover_calls(&self) -> Vec<GetCopilotHoverInfoParams> {
        self.hover_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// URIs of every chat/project context request, in order
    pub fn context_calls(&self) -> Vec<String> {
        self.context_calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    fn record_context_call(&self, uri: &str) {
        if let Ok(mut calls) = self.context_calls.lock() {
            calls.push(uri.to_string());
        }
    }
}

impl Default for MockLanguageClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockLanguageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockLanguageClient")
            .field("hover_calls", &self.hover_calls())
            .field("context_calls", &self.context_calls())
            .finish()
    }
}

#[async_trait]
impl LanguageClient for MockLanguageClient {
    async fn copilot_hover_info(
        &self,
        params: GetCopilotHoverInfoParams,
        cancel: &CancellationToken,
    ) -> Result<GetCopilotHoverInfoResult, LspError> {
        if let Ok(mut calls) = self.hover_calls.lock() {
            calls.push(params);
        }

        if let Some(gate) = &self.hover_gate {
            tokio::select! {
                _ = gate.notified() => {}
                _ = cancel.cancelled() => {
                    return Err(LspError::Cancelled {
                        method: "cpptools/getCopilotHoverInfo".to_string(),
                    });
                }
            }
        }
        (self.hover_reply)()
    }

    async fn chat_context(
        &self,
        uri: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<ChatContextResult>, LspError> {
        self.record_context_call(uri);
        (self.chat_reply)()
    }

    async fn project_context(
        &self,
        uri: &str,
        _cancel: &CancellationToken,
    ) -> Result<Option<ProjectContextResult>, LspError> {
        self.record_context_call(uri);
        (self.project_reply)()
    }
}
