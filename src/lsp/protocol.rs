//! JSON-RPC 2.0 protocol layer
//!
//! Request/response correlation over a framed byte stream. One background
//! task owns both halves of the connection; callers talk to it through a
//! channel and wait on a oneshot for their response.

use futures::{SinkExt, StreamExt};
use lsp_types::notification::Notification;
use lsp_types::request::Request;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, error, trace};

use super::error::LspError;
use super::framing::LspCodec;
use crate::log_lsp_message;

// ============================================================================
// JSON-RPC Types
// ============================================================================

/// Method not found (JSON-RPC)
pub const METHOD_NOT_FOUND: i32 = -32601;

/// The client cancelled the request (LSP `RequestCancelled`)
pub const REQUEST_CANCELLED: i32 = -32800;

/// The server cancelled the request (LSP `ServerCancelled`)
pub const SERVER_CANCELLED: i32 = -32802;

/// JSON-RPC 2.0 request message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorObject>,
}

/// JSON-RPC 2.0 notification message (no response expected)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Unit params (`shutdown`, `exit`) are omitted from the message entirely
fn params_value<P: Serialize>(params: P) -> Result<Option<Value>, serde_json::Error> {
    let value = serde_json::to_value(params)?;
    Ok((!value.is_null()).then_some(value))
}

/// `$/cancelRequest` id for a request id; ids past `i32::MAX` go as strings
fn cancel_id(id: u64) -> lsp_types::NumberOrString {
    match i32::try_from(id) {
        Ok(id) => lsp_types::NumberOrString::Number(id),
        Err(_) => lsp_types::NumberOrString::String(id.to_string()),
    }
}

type PendingRequests = Arc<Mutex<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>;

// ============================================================================
// JSON-RPC Client
// ============================================================================

/// JSON-RPC client with request/response correlation
pub struct JsonRpcClient {
    outbound_sender: mpsc::UnboundedSender<String>,
    request_id: AtomicU64,
    pending_requests: PendingRequests,
    io_task: JoinHandle<()>,
}

impl JsonRpcClient {
    /// Start the connection task over the given reader/writer pair
    pub fn new<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();
        let pending_requests: PendingRequests = Arc::new(Mutex::new(HashMap::new()));

        let io_task = tokio::spawn(Self::run_connection(
            FramedRead::new(reader, LspCodec::default()),
            FramedWrite::new(writer, LspCodec::default()),
            outbound_receiver,
            Arc::clone(&pending_requests),
        ));

        Self {
            outbound_sender,
            request_id: AtomicU64::new(1),
            pending_requests,
            io_task,
        }
    }

    async fn run_connection<R, W>(
        mut inbound: FramedRead<R, LspCodec>,
        mut outbound: FramedWrite<W, LspCodec>,
        mut outbound_receiver: mpsc::UnboundedReceiver<String>,
        pending_requests: PendingRequests,
    ) where
        R: AsyncRead + Send + Unpin,
        W: AsyncWrite + Send + Unpin,
    {
        loop {
            tokio::select! {
                message = outbound_receiver.recv() => {
                    let Some(message) = message else {
                        trace!("JsonRpcClient: outbound channel closed");
                        break;
                    };
                    if let Err(e) = outbound.send(message).await {
                        error!("Failed to send message: {}", e);
                        break;
                    }
                }
                message = inbound.next() => {
                    match message {
                        Some(Ok(message)) => {
                            if let Some(reply) = Self::process_inbound_message(&message, &pending_requests).await {
                                if let Err(e) = outbound.send(reply).await {
                                    error!("Failed to reply to server request: {}", e);
                                    break;
                                }
                            }
                        }
                        Some(Err(e)) => {
                            error!("Failed to receive message: {}", e);
                            break;
                        }
                        None => {
                            debug!("Language server closed the connection");
                            break;
                        }
                    }
                }
            }
        }

        // Dropping the senders wakes every waiter with ConnectionClosed
        pending_requests.lock().await.clear();
        trace!("JsonRpcClient: connection task finished");
    }

    /// Route one inbound message. Returns a reply for server-to-client
    /// requests, which this client does not implement.
    async fn process_inbound_message(
        message: &str,
        pending_requests: &PendingRequests,
    ) -> Option<String> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                debug!("Received unparseable message ({}): {}", e, message);
                return None;
            }
        };

        match (value.get("id"), value.get("method").and_then(Value::as_str)) {
            (Some(id), Some(method)) => {
                debug!("Declining server request {}", method);
                let reply = JsonRpcResponse {
                    jsonrpc: "2.0".to_string(),
                    id: id.clone(),
                    result: None,
                    error: Some(JsonRpcErrorObject {
                        code: METHOD_NOT_FOUND,
                        message: format!("Unhandled method {method}"),
                        data: None,
                    }),
                };
                serde_json::to_string(&reply).ok()
            }
            (Some(_), None) => {
                let response: JsonRpcResponse = match serde_json::from_value(value) {
                    Ok(response) => response,
                    Err(e) => {
                        debug!("Received malformed response: {}", e);
                        return None;
                    }
                };
                let Some(id) = response.id.as_u64() else {
                    debug!("Received response with non-numeric id {}", response.id);
                    return None;
                };
                match pending_requests.lock().await.remove(&id) {
                    Some(sender) => {
                        if sender.send(response).is_err() {
                            debug!("Response receiver dropped for request {}", id);
                        }
                    }
                    None => debug!("Received response for unknown request {}", id),
                }
                None
            }
            (None, Some(method)) => {
                trace!("Ignoring notification {}", method);
                None
            }
            (None, None) => {
                debug!("Received message that is neither request nor response");
                None
            }
        }
    }

    /// Send a typed request and wait for its result.
    ///
    /// When `cancel` fires first, `$/cancelRequest` is sent and the call
    /// returns [`LspError::Cancelled`] without waiting for the server.
    pub async fn request<R: Request>(
        &self,
        params: R::Params,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<R::Result, LspError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let (response_sender, response_receiver) = oneshot::channel();
        self.pending_requests.lock().await.insert(id, response_sender);

        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: Value::from(id),
            method: R::METHOD.to_string(),
            params: params_value(params)?,
        };
        log_lsp_message!(Level::DEBUG, "outgoing", R::METHOD, &request);

        if let Err(e) = self.send_message(&request) {
            self.forget(id).await;
            return Err(e);
        }

        let response = tokio::select! {
            response = response_receiver => response.map_err(|_| LspError::ConnectionClosed)?,
            _ = cancel.cancelled() => {
                self.forget(id).await;
                let params = lsp_types::CancelParams { id: cancel_id(id) };
                if let Err(e) = self.notify::<lsp_types::notification::Cancel>(params) {
                    debug!("Failed to send $/cancelRequest for {}: {}", id, e);
                }
                return Err(LspError::Cancelled { method: R::METHOD.to_string() });
            }
            _ = tokio::time::sleep(timeout) => {
                self.forget(id).await;
                return Err(LspError::Timeout { method: R::METHOD.to_string() });
            }
        };
        log_lsp_message!(Level::DEBUG, "incoming", R::METHOD, &response);

        if let Some(error) = response.error {
            return Err(LspError::from_response(R::METHOD, error));
        }
        Ok(serde_json::from_value(response.result.unwrap_or(Value::Null))?)
    }

    /// Send a typed notification
    pub fn notify<N: Notification>(&self, params: N::Params) -> Result<(), LspError> {
        let notification = JsonRpcNotification {
            jsonrpc: "2.0".to_string(),
            method: N::METHOD.to_string(),
            params: params_value(params)?,
        };
        log_lsp_message!(Level::DEBUG, "outgoing", N::METHOD, &notification);
        self.send_message(&notification)
    }

    fn send_message<T: Serialize>(&self, message: &T) -> Result<(), LspError> {
        let json = serde_json::to_string(message)?;
        self.outbound_sender
            .send(json)
            .map_err(|_| LspError::ConnectionClosed)
    }

    async fn forget(&self, id: u64) {
        self.pending_requests.lock().await.remove(&id);
    }

    /// Check if the connection task is still running
    pub fn is_connected(&self) -> bool {
        !self.outbound_sender.is_closed() && !self.io_task.is_finished()
    }
}

impl Drop for JsonRpcClient {
    fn drop(&mut self) {
        self.io_task.abort();
    }
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("next_id", &self.request_id.load(Ordering::SeqCst))
            .field("connected", &self.is_connected())
            .finish()
    }
}
