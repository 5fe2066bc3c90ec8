//! The `#cpp` chat tool: a one-paragraph summary of the active document's
//! compiler configuration

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::describe;
use super::known_values::KnownValues;
use crate::host::{EditorHost, TextDocument};
use crate::logging::{OutputChannel, append_line_best_effort};
use crate::lsp::{LanguageClient, LspError};
use crate::telemetry::{CHAT_TOOL_EVENT, TelemetryProperties, TelemetrySink};

pub const NOT_CPP_DOCUMENT: &str = "The active document is not a C, C++, or CUDA file.";

pub const NO_CONFIGURATION: &str = "No configuration information is available for the active document.";

const ERROR_OUTPUT_LINE: &str = "Error while retrieving the #cpp context.";

pub struct CppConfigurationTool {
    client: Arc<dyn LanguageClient>,
    known_values: KnownValues,
    telemetry: Arc<dyn TelemetrySink>,
    output: Arc<dyn OutputChannel>,
}

impl CppConfigurationTool {
    pub fn new(
        client: Arc<dyn LanguageClient>,
        known_values: KnownValues,
        telemetry: Arc<dyn TelemetrySink>,
        output: Arc<dyn OutputChannel>,
    ) -> Self {
        Self {
            client,
            known_values,
            telemetry,
            output,
        }
    }

    /// Run the tool against the host's active document
    pub async fn invoke(&self, host: &dyn EditorHost, cancel: &CancellationToken) -> String {
        let document = host.active_document();
        self.get_context(document.as_ref(), cancel).await
    }

    /// Describe the configuration of `document`.
    ///
    /// Never fails: errors produce an empty string and a line on the output
    /// channel. Exactly one telemetry event is logged per call.
    pub async fn get_context(
        &self,
        document: Option<&TextDocument>,
        cancel: &CancellationToken,
    ) -> String {
        let mut properties = TelemetryProperties::new();

        let result = match self.describe_document(document, cancel, &mut properties).await {
            Ok(text) => text,
            Err(e) if e.is_cancellation() => {
                debug!("#cpp context request cancelled");
                String::new()
            }
            Err(e) => {
                warn!("Failed to retrieve #cpp context: {}", e);
                append_line_best_effort(self.output.as_ref(), ERROR_OUTPUT_LINE);
                properties.insert("error".to_string(), "true".to_string());
                String::new()
            }
        };

        self.telemetry.log_event(CHAT_TOOL_EVENT, &properties);
        result
    }

    async fn describe_document(
        &self,
        document: Option<&TextDocument>,
        cancel: &CancellationToken,
        properties: &mut TelemetryProperties,
    ) -> Result<String, LspError> {
        let Some(document) = document.filter(|doc| doc.is_cpp() || doc.is_header_file()) else {
            return Ok(NOT_CPP_DOCUMENT.to_string());
        };

        let Some(chat_context) = self.client.chat_context(&document.uri, cancel).await? else {
            return Ok(NO_CONFIGURATION.to_string());
        };

        let fields = self.known_values.normalize(chat_context);
        fields.record_into(properties);
        Ok(describe(&fields))
    }
}
