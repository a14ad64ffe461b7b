//! Errors raised by the server's own tool handling.
//!
//! Cache and network failures come through as `wayfarer_core::Error`; these
//! cover what only the MCP surface can get wrong.

use rmcp::model::{ErrorCode, ErrorData as McpError};

#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Invalid input parameters (e.g., a purge with nothing to purge).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// The message listener has stopped; nothing more can be posted.
    #[error("CHANNEL_CLOSED: worker message listener is not running")]
    ChannelClosed,
}

impl From<WorkerError> for McpError {
    fn from(err: WorkerError) -> Self {
        let (code, message) = match &err {
            WorkerError::InvalidInput(msg) => (-32602, msg.clone()),
            WorkerError::ChannelClosed => (-32000, err.to_string()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let invalid: McpError = WorkerError::InvalidInput("bad".into()).into();
        assert_eq!(invalid.code.0, -32602);
        assert_eq!(invalid.message, "bad");

        let closed: McpError = WorkerError::ChannelClosed.into();
        assert_eq!(closed.code.0, -32000);
        assert!(closed.message.contains("CHANNEL_CLOSED"));
    }
}
