//! LSP message framing
//!
//! `Content-Length: <length>\r\n\r\n<content>` framing as a
//! `tokio_util::codec` pair, so the connection can be driven through
//! `FramedRead`/`FramedWrite`.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

/// Maximum message size to prevent memory exhaustion
const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16MB

const HEADER_SEPARATOR: &[u8] = b"\r\n\r\n";

/// Error types for LSP framing
#[derive(Debug, thiserror::Error)]
pub enum LspFramingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing Content-Length header")]
    MissingContentLength,

    #[error("Invalid content length: {0}")]
    InvalidContentLength(String),

    #[error("Invalid LSP header: {0}")]
    InvalidHeader(String),

    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Message is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Codec turning a byte stream into LSP message bodies and back
#[derive(Debug, Clone)]
pub struct LspCodec {
    max_message_size: usize,
}

impl Default for LspCodec {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
        }
    }
}

impl LspCodec {
    pub fn with_max_message_size(max_message_size: usize) -> Self {
        Self { max_message_size }
    }

    fn parse_content_length(header: &[u8]) -> Result<usize, LspFramingError> {
        let header = std::str::from_utf8(header)
            .map_err(|e| LspFramingError::InvalidHeader(e.to_string()))?;

        for line in header.split("\r\n") {
            let Some((name, value)) = line.split_once(':') else {
                return Err(LspFramingError::InvalidHeader(line.to_string()));
            };
            if name.trim().eq_ignore_ascii_case("content-length") {
                return value
                    .trim()
                    .parse()
                    .map_err(|_| LspFramingError::InvalidContentLength(value.trim().to_string()));
            }
        }

        Err(LspFramingError::MissingContentLength)
    }
}

impl Decoder for LspCodec {
    type Item = String;
    type Error = LspFramingError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>, Self::Error> {
        let Some(header_end) = src
            .windows(HEADER_SEPARATOR.len())
            .position(|window| window == HEADER_SEPARATOR)
        else {
            return Ok(None);
        };

        let content_length = Self::parse_content_length(&src[..header_end])?;
        if content_length > self.max_message_size {
            return Err(LspFramingError::MessageTooLarge {
                size: content_length,
                max: self.max_message_size,
            });
        }

        let content_start = header_end + HEADER_SEPARATOR.len();
        let total = content_start + content_length;
        if src.len() < total {
            trace!(
                "LspCodec: Incomplete message - need {} more bytes",
                total - src.len()
            );
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(content_start);
        let body = src.split_to(content_length);
        trace!("LspCodec: Parsed complete message ({} bytes)", content_length);
        Ok(Some(String::from_utf8(body.to_vec())?))
    }
}

impl Encoder<String> for LspCodec {
    type Error = LspFramingError;

    fn encode(&mut self, message: String, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let header = format!("Content-Length: {}\r\n\r\n", message.len());
        dst.reserve(header.len() + message.len());
        dst.put_slice(header.as_bytes());
        dst.put_slice(message.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(body: &str) -> BytesMut {
        let mut buf = BytesMut::new();
        LspCodec::default()
            .encode(body.to_string(), &mut buf)
            .unwrap();
        buf
    }

    #[test]
    fn test_encode_adds_content_length() {
        let buf = frame(r#"{"jsonrpc":"2.0"}"#);
        assert_eq!(&buf[..], b"Content-Length: 17\r\n\r\n{\"jsonrpc\":\"2.0\"}");
    }

    #[test]
    fn test_decode_waits_for_complete_body() {
        let mut codec = LspCodec::default();
        let full = frame(r#"{"id":1}"#);

        let mut partial = BytesMut::from(&full[..full.len() - 3]);
        assert!(codec.decode(&mut partial).unwrap().is_none());

        partial.extend_from_slice(&full[full.len() - 3..]);
        assert_eq!(codec.decode(&mut partial).unwrap().as_deref(), Some(r#"{"id":1}"#));
        assert!(partial.is_empty());
    }

    #[test]
    fn test_decode_two_messages_in_one_buffer() {
        let mut codec = LspCodec::default();
        let mut buf = frame("first");
        buf.extend_from_slice(&frame("second"));

        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("first"));
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("second"));
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn test_decode_accepts_content_type_and_case() {
        let mut codec = LspCodec::default();
        let mut buf = BytesMut::from(
            &b"content-length: 2\r\nContent-Type: application/vscode-jsonrpc; charset=utf-8\r\n\r\n{}"[..],
        );
        assert_eq!(codec.decode(&mut buf).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_decode_rejects_missing_length() {
        let mut codec = LspCodec::default();
        let mut buf = BytesMut::from(&b"Content-Type: text\r\n\r\n{}"[..]);
        assert!(matches!(
            codec.decode(&mut buf),
            Err(LspFramingError::MissingContentLength)
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_message() {
        let mut codec = LspCodec::with_max_message_size(4);
        let mut buf = frame("too long");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(LspFramingError::MessageTooLarge { size: 8, max: 4 })
        ));
    }
}
