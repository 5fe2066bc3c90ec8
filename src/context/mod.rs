//! Compiler and project context for chat tools
//!
//! Raw metadata reported by the language server is normalized against
//! [`KnownValues`] so that only reviewed display labels reach telemetry or
//! prompts; anything unrecognized becomes an empty string. Compiler arguments
//! go through an allow-list ([`CompilerArgumentFilters`]) before they are
//! reported.

pub mod chat_tool;
pub mod filter;
pub mod known_values;
pub mod project;
pub mod types;

pub use chat_tool::CppConfigurationTool;
pub use filter::{Compiler, CompilerArgumentFilters};
pub use known_values::{KnownField, KnownValues};
pub use project::ProjectContextProvider;
pub use types::{ChatContextResult, ContextFields, FileContext, ProjectContext, ProjectContextResult};

/// Build the sentence handed to the chat model from normalized fields.
///
/// Fields are emitted in a fixed order and empty fields are skipped without
/// any placeholder.
pub fn describe(fields: &ContextFields) -> String {
    let mut description = String::new();
    if !fields.language.is_empty() {
        description += &format!("The user is working on a {} project. ", fields.language);
    }
    if !fields.standard_version.is_empty() {
        description += &format!(
            "The project uses language version {}. ",
            fields.standard_version
        );
    }
    if !fields.compiler.is_empty() {
        description += &format!(
            "The project compiles using the {} compiler. ",
            fields.compiler
        );
    }
    if !fields.target_platform.is_empty() {
        description += &format!(
            "The project targets the {} platform. ",
            fields.target_platform
        );
    }
    if !fields.target_architecture.is_empty() {
        description += &format!(
            "The project targets the {} architecture. ",
            fields.target_architecture
        );
    }
    description
}
