//! The generate command bound to the hover prompt

use tokio_util::sync::CancellationToken;
use tracing::{Level, debug};

use super::provider::{AssistantHoverProvider, HoverError};
use crate::host::{EditorHost, SHOW_HOVER_COMMAND};
use crate::log_timing;

/// How a generate command run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// No hover has been requested yet
    NothingToGenerate,
    Delivered,
    /// The request was cancelled
    Cancelled,
    /// The user moved to another hover before the description arrived
    Superseded,
}

/// Fetch the description for the current hover and show it.
///
/// The hover is re-shown twice: once to display the loading indicator and
/// once with the description. A result for a hover the user has since left
/// is dropped.
pub async fn trigger_generation(
    provider: &AssistantHoverProvider,
    host: &dyn EditorHost,
    cancel: &CancellationToken,
) -> Result<GenerationOutcome, HoverError> {
    let Some(location) = provider.current_location() else {
        return Ok(GenerationOutcome::NothingToGenerate);
    };

    provider.mark_waiting();
    host.execute_command(SHOW_HOVER_COMMAND).await?;

    let started = std::time::Instant::now();
    let content = match provider.fetch_description(&location, cancel).await {
        Ok(content) => content,
        Err(HoverError::Cancelled) => return Ok(GenerationOutcome::Cancelled),
        Err(e) => return Err(e),
    };
    log_timing!(Level::DEBUG, "hover_generation", started.elapsed());

    // The pending-ack check covers a hover that moved while we waited; the
    // target check covers one that moved after a later generation began.
    if provider.is_cancelled(&location) || provider.current_location().as_ref() != Some(&location) {
        debug!("Dropping description for superseded hover at {}", location.uri);
        return Ok(GenerationOutcome::Superseded);
    }

    provider.deliver_content(content);
    host.execute_command(SHOW_HOVER_COMMAND).await?;
    Ok(GenerationOutcome::Delivered)
}
