//! Unified error type for the lobby client.

use std::time::Duration;

use pokerlobby_protocol::{MessageType, Operation, ProtocolError};
use pokerlobby_transport::{ConnectError, ReceiveError, SendError};

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on the wrapping variants auto-generates `From`
/// impls, so `?` converts protocol and transport errors automatically. The
/// remaining variants are decisions the client itself makes about a reply.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Building or reading a frame failed (encode, decode, length checks).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Opening the TCP connection failed.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Writing a request failed. The connection has been torn down.
    #[error(transparent)]
    Send(#[from] SendError),

    /// Reading a reply failed. The connection has been torn down.
    #[error(transparent)]
    Receive(#[from] ReceiveError),

    /// No live connection. Call `connect` first (again, after a failure).
    #[error("not connected to the lobby server")]
    NotConnected,

    /// A bare `send` is still waiting for its `receive`. The connection is
    /// left as it was.
    #[error("a reply to an earlier send has not been received yet")]
    ReplyPending,

    /// The server didn't answer within the configured response timeout.
    /// The connection has been torn down, since a late reply would be
    /// mistaken for the answer to the next request.
    #[error("no response within {0:?}")]
    ResponseTimeout(Duration),

    /// The server answered with the operation's failure code (`base + 2`).
    #[error("{operation} rejected by server (message type {message_type})")]
    Rejected {
        operation: Operation,
        message_type: MessageType,
    },

    /// The reply's message type is neither `base + 1` nor `base + 2`.
    #[error("unexpected reply to {operation}: message type {message_type}")]
    UnexpectedResponse {
        operation: Operation,
        message_type: MessageType,
    },

    /// A success reply that should have carried a payload didn't.
    #[error("{0} reply carried no payload")]
    MissingPayload(Operation),

    /// The payload decoded but its contents don't hang together.
    #[error("invalid {operation} reply: {reason}")]
    InvalidResponse {
        operation: Operation,
        reason: String,
    },

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
