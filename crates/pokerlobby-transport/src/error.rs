use std::time::Duration;

/// Errors from [`StreamConnection::connect`](crate::StreamConnection::connect).
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The connection is already live. Disconnect it first.
    #[error("already connected to {0}")]
    AlreadyConnected(String),

    /// The TCP handshake didn't finish within the connect timeout.
    #[error("connecting to {target} timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    /// Name resolution or the TCP connect itself failed (refused,
    /// unreachable, unknown host).
    #[error("connecting to {target} failed: {source}")]
    Io {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from [`StreamConnection::send`](crate::StreamConnection::send).
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    /// There is no live socket to write to.
    #[error("not connected")]
    NotConnected,

    /// Writing or flushing failed (broken pipe, reset, or the socket
    /// stopped accepting bytes before the whole frame was written).
    #[error("send failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from [`StreamConnection::receive`](crate::StreamConnection::receive).
#[derive(Debug, thiserror::Error)]
pub enum ReceiveError {
    /// There is no live socket to read from.
    #[error("not connected")]
    NotConnected,

    /// The peer closed the stream cleanly between frames.
    #[error("connection closed by peer")]
    Closed,

    /// The peer closed the stream in the middle of a frame.
    #[error("connection closed mid-frame: expected {expected} bytes, got {received}")]
    Truncated { expected: usize, received: usize },

    /// The length prefix is smaller than the prefix itself.
    #[error("invalid frame length {0}")]
    InvalidLength(u16),

    /// Reading from the socket failed.
    #[error("receive failed: {0}")]
    Io(#[from] std::io::Error),
}
