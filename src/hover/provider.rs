use rust_mcp_sdk::schema::schema_utils::CallToolError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::content::HoverContent;
use super::state::{HoverLocation, HoverState};
use crate::config::HoverSettings;
use crate::host::HostError;
use crate::lsp::LanguageClient;
use crate::lsp::error::LspError;
use crate::lsp::requests::GetCopilotHoverInfoParams;

#[derive(Debug, thiserror::Error)]
pub enum HoverError {
    /// The request was cancelled by either side. Not a failure.
    #[error("Hover generation cancelled")]
    Cancelled,

    #[error(transparent)]
    Lsp(LspError),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl From<LspError> for HoverError {
    fn from(error: LspError) -> Self {
        if error.is_cancellation() {
            HoverError::Cancelled
        } else {
            HoverError::Lsp(error)
        }
    }
}

impl From<HoverError> for CallToolError {
    fn from(error: HoverError) -> Self {
        match error {
            HoverError::Lsp(e) => CallToolError::from(e),
            other => CallToolError::new(std::io::Error::other(other.to_string())),
        }
    }
}

/// Hover provider offering an assistant-generated description on demand.
///
/// One instance per editor session. It never fetches on its own: the hover
/// offers a prompt, and the generate command drives the fetch.
pub struct AssistantHoverProvider {
    client: Arc<dyn LanguageClient>,
    settings: HoverSettings,
    state: Mutex<HoverState>,
}

impl AssistantHoverProvider {
    pub fn new(client: Arc<dyn LanguageClient>, settings: HoverSettings) -> Self {
        Self {
            client,
            settings,
            state: Mutex::new(HoverState::new()),
        }
    }

    // Every transition leaves the state consistent, so a poisoned lock is
    // still safe to use.
    fn state(&self) -> MutexGuard<'_, HoverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Content to show for a hover at `location`, or `None` when the hover is
    /// disabled for the document's workspace folder
    pub fn request_hover(&self, location: HoverLocation) -> Option<HoverContent> {
        if !self.settings.is_enabled_for(&location.uri) {
            trace!("Assistant hover disabled for {}", location.uri);
            return None;
        }
        Some(self.state().request(location))
    }

    pub fn mark_waiting(&self) {
        self.state().mark_waiting();
    }

    pub fn deliver_content(&self, content: String) {
        self.state().deliver(content);
    }

    /// Location the generate command should fetch for
    pub fn current_location(&self) -> Option<HoverLocation> {
        self.state().target().cloned()
    }

    /// Ask the language server for the description at `location`
    pub async fn fetch_description(
        &self,
        location: &HoverLocation,
        cancel: &CancellationToken,
    ) -> Result<String, HoverError> {
        let params = GetCopilotHoverInfoParams {
            uri: location.uri.clone(),
            position: location.position,
        };
        match self.client.copilot_hover_info(params, cancel).await {
            Ok(result) => Ok(result.content),
            Err(e) => {
                let error = HoverError::from(e);
                if matches!(error, HoverError::Cancelled) {
                    debug!("Hover info request cancelled for {}", location.uri);
                }
                Err(error)
            }
        }
    }

    /// True once if the generation for exactly `location` was superseded
    pub fn is_cancelled(&self, location: &HoverLocation) -> bool {
        self.state().acknowledge_cancellation(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HoverSetting;
    use crate::lsp::testing::MockLanguageClient;
    use crate::lsp::protocol::{REQUEST_CANCELLED, SERVER_CANCELLED};

    const URI: &str = "file:///work/src/parser.cpp";

    fn provider(client: MockLanguageClient) -> AssistantHoverProvider {
        AssistantHoverProvider::new(Arc::new(client), HoverSettings::default())
    }

    #[test]
    fn test_disabled_folder_returns_none() {
        let mut settings = HoverSettings::default();
        settings
            .folders
            .insert("file:///work".to_string(), HoverSetting::Disabled);
        let provider = AssistantHoverProvider::new(Arc::new(MockLanguageClient::new()), settings);

        assert!(provider.request_hover(HoverLocation::new(URI, 1, 1)).is_none());
        assert_eq!(
            provider.request_hover(HoverLocation::new("file:///elsewhere/a.cpp", 1, 1)),
            Some(HoverContent::GeneratePrompt)
        );
    }

    #[test]
    fn test_repeated_hover_after_delivery() {
        let provider = provider(MockLanguageClient::new());
        provider.request_hover(HoverLocation::new(URI, 7, 12));
        provider.mark_waiting();
        assert_eq!(
            provider.request_hover(HoverLocation::new(URI, 7, 13)),
            Some(HoverContent::Loading)
        );

        provider.deliver_content("Parses one token.".to_string());
        assert_eq!(
            provider.request_hover(HoverLocation::new(URI, 7, 12)),
            Some(HoverContent::Description("Parses one token.".to_string()))
        );
        assert_eq!(
            provider.current_location(),
            Some(HoverLocation::new(URI, 7, 12))
        );
    }

    #[test]
    fn test_two_columns_away_is_a_new_hover() {
        let provider = provider(MockLanguageClient::new());
        provider.request_hover(HoverLocation::new(URI, 7, 12));
        provider.deliver_content("Parses one token.".to_string());

        assert_eq!(
            provider.request_hover(HoverLocation::new(URI, 7, 14)),
            Some(HoverContent::GeneratePrompt)
        );
        assert_eq!(
            provider.current_location(),
            Some(HoverLocation::new(URI, 7, 14))
        );
    }

    #[test]
    fn test_is_cancelled_single_use() {
        let provider = provider(MockLanguageClient::new());
        let first = HoverLocation::new(URI, 7, 12);
        provider.request_hover(first.clone());
        provider.mark_waiting();
        provider.request_hover(HoverLocation::new(URI, 40, 1));

        assert!(provider.is_cancelled(&first));
        assert!(!provider.is_cancelled(&first));
    }

    #[tokio::test]
    async fn test_fetch_description_sends_location() {
        let client = Arc::new(MockLanguageClient::new().with_hover_content("Builds the AST."));
        let provider = AssistantHoverProvider::new(client.clone(), HoverSettings::default());
        let location = HoverLocation::new(URI, 2, 4);

        let text = provider
            .fetch_description(&location, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(text, "Builds the AST.");
        let calls = client.hover_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].uri, URI);
        assert_eq!(calls[0].position, lsp_types::Position::new(2, 4));
    }

    #[tokio::test]
    async fn test_fetch_description_maps_cancellation_codes() {
        for code in [REQUEST_CANCELLED, SERVER_CANCELLED] {
            let client = MockLanguageClient::new().with_hover_error(move || LspError::Server {
                method: "cpptools/getCopilotHoverInfo".to_string(),
                code,
                message: "cancelled".to_string(),
            });
            let result = provider(client)
                .fetch_description(&HoverLocation::new(URI, 0, 0), &CancellationToken::new())
                .await;
            assert!(matches!(result, Err(HoverError::Cancelled)));
        }
    }

    #[tokio::test]
    async fn test_fetch_description_propagates_other_errors() {
        let client = MockLanguageClient::new().with_hover_error(|| LspError::ConnectionClosed);
        let result = provider(client)
            .fetch_description(&HoverLocation::new(URI, 0, 0), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(HoverError::Lsp(LspError::ConnectionClosed))));
    }
}
