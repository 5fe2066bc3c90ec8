//! Project context for completions

use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, warn};

use super::filter::CompilerArgumentFilters;
use super::known_values::KnownValues;
use super::types::ProjectContext;
use crate::config::ExperimentFlags;
use crate::log_timing;
use crate::logging::{OutputChannel, append_line_best_effort};
use crate::lsp::{LanguageClient, LspError};
use crate::telemetry::{PROJECT_CONTEXT_EVENT, TelemetryProperties, TelemetrySink};

pub struct ProjectContextProvider {
    client: Arc<dyn LanguageClient>,
    known_values: KnownValues,
    filters: CompilerArgumentFilters,
    telemetry: Arc<dyn TelemetrySink>,
    output: Arc<dyn OutputChannel>,
}

impl ProjectContextProvider {
    pub fn new(
        client: Arc<dyn LanguageClient>,
        known_values: KnownValues,
        filters: CompilerArgumentFilters,
        telemetry: Arc<dyn TelemetrySink>,
        output: Arc<dyn OutputChannel>,
    ) -> Self {
        Self {
            client,
            known_values,
            filters,
            telemetry,
            output,
        }
    }

    /// Normalized context for the document at `uri`.
    ///
    /// `compiler_arguments` only carries arguments admitted by the filters.
    /// Returns `None` when the server has no context, on cancellation, and
    /// on failure. Exactly one telemetry event is logged per call.
    pub async fn get_project_context(
        &self,
        uri: &str,
        flags: &ExperimentFlags,
        cancel: &CancellationToken,
    ) -> Option<ProjectContext> {
        let mut properties = TelemetryProperties::new();

        let result = match self.fetch(uri, flags, cancel, &mut properties).await {
            Ok(context) => context,
            Err(e) if e.is_cancellation() => {
                debug!("Project context request cancelled for {}", uri);
                None
            }
            Err(e) => {
                warn!("Failed to retrieve project context for {}: {}", uri, e);
                append_line_best_effort(
                    self.output.as_ref(),
                    &format!("Error while retrieving the project context. Reason: {e}"),
                );
                properties.insert("error".to_string(), "true".to_string());
                None
            }
        };

        self.telemetry.log_event(PROJECT_CONTEXT_EVENT, &properties);
        result
    }

    async fn fetch(
        &self,
        uri: &str,
        flags: &ExperimentFlags,
        cancel: &CancellationToken,
        properties: &mut TelemetryProperties,
    ) -> Result<Option<ProjectContext>, LspError> {
        let started = Instant::now();
        let response = self.client.project_context(uri, cancel).await?;
        let elapsed = started.elapsed();
        log_timing!(Level::DEBUG, "project_context", elapsed);
        properties.insert(
            "time".to_string(),
            format!("{:.1}", elapsed.as_secs_f64() * 1000.0),
        );

        let Some(response) = response else {
            return Ok(None);
        };

        // Filters are keyed by the server's compiler token, not by the
        // configurable display label
        let raw_compiler = response.fields.compiler.clone();
        let fields = self.known_values.normalize(response.fields);
        fields.record_into(properties);

        let arguments = response.file_context.compiler_arguments;
        properties.insert("compilerArgumentCount".to_string(), arguments.len().to_string());

        let mut context = ProjectContext::from(fields);
        if !arguments.is_empty() && !context.compiler.is_empty() {
            let filtered = self.filters.filter(&raw_compiler, &arguments, flags);
            if !filtered.is_empty() {
                properties.insert("filteredCompilerArguments".to_string(), filtered.join(", "));
                context.compiler_arguments = filtered;
            }
        }
        Ok(Some(context))
    }
}
