//! Editor host capabilities
//!
//! The bridge never renders UI itself. It asks the host for the active
//! document and invokes named host commands (for example re-showing a hover).

use async_trait::async_trait;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

/// Language ids treated as C/C++ documents
const CPP_LANGUAGE_IDS: [&str; 3] = ["c", "cpp", "cuda-cpp"];

/// Header extensions recognized by the C/C++ extension. Extensionless files
/// (standard library headers such as `<vector>`) also count as headers.
const HEADER_EXTENSIONS: [&str; 12] = [
    "h", "hh", "hp", "hpp", "hxx", "h++", "inl", "ipp", "tcc", "tlh", "tli", "cuh",
];

/// Command that asks the host to show the hover at the cursor again
pub const SHOW_HOVER_COMMAND: &str = "editor.action.showHover";

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Host command failed: {command}: {message}")]
    Command { command: String, message: String },

    #[error("Host is not available")]
    Unavailable,
}

/// A document open in the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub uri: String,
    pub language_id: String,
}

impl TextDocument {
    pub fn new(uri: impl Into<String>, language_id: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            language_id: language_id.into(),
        }
    }

    /// Build a document from a file path, guessing the language id from the
    /// extension the way the editor would
    pub fn from_path(path: &Path) -> Self {
        let language_id = match path.extension().and_then(|ext| ext.to_str()) {
            Some("c") => "c",
            Some("cu") | Some("cuh") => "cuda-cpp",
            Some("cpp" | "cc" | "cxx" | "c++" | "hpp" | "hh" | "hxx" | "h++" | "ipp" | "inl" | "tcc") => "cpp",
            // Plain .h is ambiguous; the editor defaults it to C++
            Some("h") => "cpp",
            _ => "plaintext",
        };
        Self::new(format!("file://{}", path.display()), language_id)
    }

    /// Language id is one of `c`, `cpp`, `cuda-cpp`
    pub fn is_cpp(&self) -> bool {
        CPP_LANGUAGE_IDS.contains(&self.language_id.as_str())
    }

    /// Judged by the extension of the last path segment of the URI
    pub fn is_header_file(&self) -> bool {
        let file_name = self.uri.rsplit('/').next().unwrap_or_default();
        if file_name.is_empty() {
            return false;
        }
        // A leading dot starts a name, not an extension (`.clang-format`)
        match file_name.rsplit_once('.') {
            None | Some(("", _)) => true,
            Some((_, ext)) => HEADER_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        }
    }
}

/// Capabilities the editor host offers to the bridge
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Document that currently has focus, if any
    fn active_document(&self) -> Option<TextDocument>;

    /// Run a host command by name
    async fn execute_command(&self, command: &str) -> Result<(), HostError>;
}

/// Host for a tool-calling session without editor UI.
///
/// The active document is the one most recently hovered. Commands have
/// nothing to act on and are only logged.
#[derive(Debug, Default)]
pub struct SessionHost {
    active_document: Mutex<Option<TextDocument>>,
}

impl SessionHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active_document(&self, document: Option<TextDocument>) {
        *self
            .active_document
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = document;
    }
}

#[async_trait]
impl EditorHost for SessionHost {
    fn active_document(&self) -> Option<TextDocument> {
        self.active_document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn execute_command(&self, command: &str) -> Result<(), HostError> {
        debug!("Host command {} has no UI to act on in this session", command);
        Ok(())
    }
}

/// Host stand-in that records executed commands
#[derive(Debug, Default)]
pub struct RecordingHost {
    active_document: Mutex<Option<TextDocument>>,
    commands: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_active_document(self, document: TextDocument) -> Self {
        self.set_active_document(Some(document));
        self
    }

    pub fn set_active_document(&self, document: Option<TextDocument>) {
        if let Ok(mut active) = self.active_document.lock() {
            *active = document;
        }
    }

    /// Commands executed so far, in order
    pub fn commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .map(|commands| commands.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EditorHost for RecordingHost {
    fn active_document(&self) -> Option<TextDocument> {
        self.active_document
            .lock()
            .ok()
            .and_then(|active| active.clone())
    }

    async fn execute_command(&self, command: &str) -> Result<(), HostError> {
        self.commands
            .lock()
            .map_err(|_| HostError::Unavailable)?
            .push(command.to_string());
        Ok(())
    }
}
