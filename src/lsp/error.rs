use rust_mcp_sdk::schema::schema_utils::CallToolError;
use thiserror::Error;

use super::framing::LspFramingError;
use super::protocol::{JsonRpcErrorObject, REQUEST_CANCELLED, SERVER_CANCELLED};

#[derive(Error, Debug)]
pub enum LspError {
    #[error("Request cancelled: {method}")]
    Cancelled { method: String },

    #[error("Language server error ({code}) for {method}: {message}")]
    Server {
        method: String,
        code: i32,
        message: String,
    },

    #[error("Request timeout: {method} - check that the language server is responsive")]
    Timeout { method: String },

    #[error("Language server connection closed")]
    ConnectionClosed,

    #[error("Language server not initialized")]
    NotInitialized,

    #[error("Language server process error: {0}")]
    Process(String),

    #[error("Framing error: {0}")]
    Framing(#[from] LspFramingError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LspError {
    /// Map an error response, turning the two cancellation codes into
    /// [`LspError::Cancelled`].
    pub fn from_response(method: &str, error: JsonRpcErrorObject) -> Self {
        match error.code {
            REQUEST_CANCELLED | SERVER_CANCELLED => LspError::Cancelled {
                method: method.to_string(),
            },
            code => LspError::Server {
                method: method.to_string(),
                code,
                message: error.message,
            },
        }
    }

    /// True when either side cancelled the request
    pub fn is_cancellation(&self) -> bool {
        match self {
            LspError::Cancelled { .. } => true,
            LspError::Server { code, .. } => matches!(*code, REQUEST_CANCELLED | SERVER_CANCELLED),
            _ => false,
        }
    }
}

impl From<LspError> for CallToolError {
    fn from(error: LspError) -> Self {
        match error {
            LspError::NotInitialized | LspError::ConnectionClosed => {
                CallToolError::new(std::io::Error::new(
                    std::io::ErrorKind::NotConnected,
                    format!("{error}. Restart the bridge with a valid --server-path."),
                ))
            }
            _ => CallToolError::new(std::io::Error::other(error.to_string())),
        }
    }
}
