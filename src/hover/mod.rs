//! Assistant hover lifecycle
//!
//! A hover first offers a "Generate Copilot Description" link. Running the
//! linked command fetches the description from the language server while the
//! hover shows a spinner, then re-shows the hover with the result. Moving to
//! another hover while waiting marks the old request cancelled so its late
//! result is discarded.

pub mod command;
pub mod content;
pub mod provider;
pub mod state;

pub use command::{GenerationOutcome, trigger_generation};
pub use content::{HoverContent, RenderedHover, SHOW_COPILOT_HOVER_COMMAND};
pub use provider::{AssistantHoverProvider, HoverError};
pub use state::{HoverLocation, HoverPhase, HoverState};
